// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use logkeys_generate::gen_lines;
use logkeys_normalizer::{normalize, FileType, Preset};

pub fn normalizer_process(c: &mut Criterion) {
    let lines = gen_lines().take(202).collect::<Vec<String>>();
    for preset in [Preset::Default, Preset::Instrument] {
        let rules = preset.rules();
        c.bench_function(&format!("normalize::{:?}", preset), |b| {
            b.iter(|| {
                for line in &lines {
                    black_box(normalize(black_box(line), &FileType::Csv, 4, &rules).unwrap());
                }
            })
        });
    }
}

criterion_group!(benches, normalizer_process);
criterion_main!(benches);
