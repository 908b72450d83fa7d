// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

use goldenfile::Mint;
use logkeys_normalizer::{normalize, FileType, Preset};
use std::io::Write;

#[test]
fn it_normalizes_instrument_logs() {
    let rules = Preset::Instrument.rules();
    let mut mint = Mint::new("tests/");
    let mut expected = mint.new_goldenfile("instrument-keywords.txt").unwrap();
    include_str!("./instrument-lines.txt")
        .split_inclusive('\n')
        .map(|line| normalize(line, &FileType::Csv, 4, &rules).unwrap())
        .for_each(|keyword| {
            write!(expected, "{}", keyword.as_str()).unwrap();
        })
}
