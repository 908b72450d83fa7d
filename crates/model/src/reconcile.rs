// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module contains the logic to compare the keywords of two files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::config::Profile;
use crate::env::Env;
use crate::keywords::KeywordReader;
use crate::table::KeywordTable;
use crate::{Error, Job, Summary, TableStats};
use logkeys_normalizer::Keyword;

/// Write the keywords found in both files to the matched output, the others to the mismatch
/// output, then verify the result.
///
/// Any error aborts the run, the outputs may then be partially written.
#[tracing::instrument(level = "debug", skip_all, fields(file1 = %job.file1.display(), file2 = %job.file2.display()))]
pub fn reconcile(env: &Env, job: &Job) -> Result<Summary, Error> {
    job.validate()?;
    let start_time = Instant::now();
    let profile = &job.profile;

    let (table1, file1) = load_table(env, &job.file1, profile)?;
    let (table2, file2) = load_table(env, &job.file2, profile)?;

    let write_time = Instant::now();
    env.debug_or_progress(&format!("Writing {}", profile.matched.display()));
    let partition = table1.reconcile(table2);
    let matched = write_keywords(&profile.matched, &partition.matched)?;
    let mismatch = write_keywords(&profile.mismatch, &partition.mismatch)?;
    env.clear_progress();
    tracing::info!(
        matched,
        mismatch,
        elapsed_ms = write_time.elapsed().as_millis() as u64,
        "Wrote {} and {}",
        profile.matched.display(),
        profile.mismatch.display()
    );

    let verify = crate::verify::verify(env, job)?;

    Ok(Summary {
        file1,
        file2,
        matched,
        mismatch,
        verify,
        elapsed: start_time.elapsed(),
    })
}

/// Build the table of a single file.
fn load_table(env: &Env, path: &Path, profile: &Profile) -> Result<(KeywordTable, TableStats), Error> {
    env.debug_or_progress(&format!("Reading {}", path.display()));
    let start_time = Instant::now();
    let mut reader = KeywordReader::open(path, profile, profile.column)?;
    let mut table = KeywordTable::new();
    for keyword in reader.by_ref() {
        let (keyword, _) = keyword?;
        table.insert(keyword);
    }
    let stats = TableStats {
        lines: reader.line_count(),
        bytes: reader.byte_count,
        keywords: table.len(),
    };
    env.clear_progress();
    tracing::info!(
        lines = stats.lines,
        keywords = stats.keywords,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Read {}",
        path.display()
    );
    Ok((table, stats))
}

/// Truncate the file and write one keyword per line.
fn write_keywords(path: &Path, keywords: &[Keyword]) -> Result<usize, Error> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for keyword in keywords {
        writer
            .write_all(keyword.as_str().as_bytes())
            .map_err(|e| Error::io(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(keywords.len())
}
