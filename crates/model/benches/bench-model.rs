// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use logkeys_model::{KeywordReader, KeywordTable, Preset, Profile};
use std::hint::black_box;
use std::path::Path;

use logkeys_generate::gen_lines_with;

fn snapshot(seed: u64, templates: usize) -> String {
    gen_lines_with(seed, templates)
        .take(2048)
        .map(|line| line + "\n")
        .collect()
}

fn table(data: &str, profile: &Profile) -> KeywordTable {
    KeywordReader::new(
        std::io::Cursor::new(data),
        Path::new("bench.log"),
        profile,
        profile.column,
    )
    .map(|keyword| keyword.unwrap().0)
    .collect()
}

pub fn model_process(c: &mut Criterion) {
    let profile = Profile {
        column: 4,
        rules: Preset::Instrument.rules(),
        ..Profile::default()
    };
    let count = logkeys_generate::templates_count();
    let baseline = snapshot(1, count - 2);
    let target = snapshot(2, count);

    c.bench_function("keyword_table_from_reader", |b| {
        b.iter(|| table(black_box(&target), &profile))
    });

    c.bench_function("reconcile_tables", |b| {
        b.iter(|| {
            let partition = table(&baseline, &profile).reconcile(table(&target, &profile));
            black_box(partition)
        })
    });
}

criterion_group!(benches, model_process);
criterion_main!(benches);
