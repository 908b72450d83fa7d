// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module provides a transparent decompression reader.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Result};
use std::path::Path;

// allow large enum for gzdecoder, which are the most used
#[allow(clippy::large_enum_variant)]
pub enum DecompressReader {
    Flat(File),
    Gz(GzDecoder<File>),
}
use DecompressReader::*;

pub fn from_path(path: &Path) -> Result<DecompressReader> {
    tracing::debug!(path = %path.display(), "Reading file");
    let fp = File::open(path)?;
    Ok(match path.extension().and_then(std::ffi::OsStr::to_str) {
        Some("gz") => Gz(GzDecoder::new(fp)),
        _ => Flat(fp),
    })
}

impl Read for DecompressReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Flat(r) => r.read(buf),
            Gz(r) => r.read(buf),
        }
    }
}

#[test]
fn test_gz_reader() {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let flat = dir.path().join("sysMSG.log");
    let gz = dir.path().join("sysMSG.log.gz");
    std::fs::write(&flat, "a,b,c\n").unwrap();
    let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(b"a,b,c\n").unwrap();
    encoder.finish().unwrap();

    for path in [flat, gz] {
        let mut content = String::new();
        from_path(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "a,b,c\n");
    }
    assert!(from_path(&dir.path().join("missing.log")).is_err());
}
