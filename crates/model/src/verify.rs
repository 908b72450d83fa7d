// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module contains the self check of the matched output.
//!
//! The check re-reads every file with the same normalizer, so it catches a lost or duplicated
//! write, not a bad rule.

use itertools::Itertools;
use std::collections::HashSet;
use std::path::Path;

use crate::config::Profile;
use crate::env::Env;
use crate::keywords::KeywordReader;
use crate::{Error, Job};

/// The sizes of the identity sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub file1: usize,
    pub file2: usize,
    /// The identities found in both files
    pub common: usize,
    /// The identities found in a single file
    pub exclusive: usize,
    /// The identities of the matched output
    pub matched: usize,
}

/// Check that the matched output has no duplicate, and that it contains exactly the keywords
/// common to both files. The mismatch output is not read.
#[tracing::instrument(level = "debug", skip_all, fields(matched = %job.profile.matched.display()))]
pub fn verify(env: &Env, job: &Job) -> Result<VerifyReport, Error> {
    job.validate()?;
    let profile = &job.profile;
    env.debug_or_progress(&format!("Verifying {}", profile.matched.display()));

    let matched = matched_set(&profile.matched, profile)?;
    let set1 = identity_set(&job.file1, profile)?;
    let set2 = identity_set(&job.file2, profile)?;

    let common: HashSet<&str> = set1.intersection(&set2).map(|s| s.as_str()).collect();
    let report = VerifyReport {
        file1: set1.len(),
        file2: set2.len(),
        common: common.len(),
        exclusive: set1.symmetric_difference(&set2).count(),
        matched: matched.len(),
    };
    env.clear_progress();
    tracing::info!(
        file1 = report.file1,
        file2 = report.file2,
        common = report.common,
        exclusive = report.exclusive,
        matched = report.matched,
        "Keyword sets"
    );

    let missing = common
        .iter()
        .filter(|identity| !matched.contains(**identity))
        .sorted()
        .collect::<Vec<_>>();
    let extra = matched
        .iter()
        .filter(|identity| !common.contains(identity.as_str()))
        .sorted()
        .collect::<Vec<_>>();
    if missing.is_empty() && extra.is_empty() {
        Ok(report)
    } else {
        tracing::debug!(?missing, ?extra, "Set mismatch");
        Err(Error::Verification(format!(
            "{} common keywords are missing from {}, {} keywords are not common",
            missing.len(),
            profile.matched.display(),
            extra.len()
        )))
    }
}

/// The matched output has one keyword per line, any duplicate fails the check.
fn matched_set(path: &Path, profile: &Profile) -> Result<HashSet<String>, Error> {
    let mut set = HashSet::new();
    for keyword in KeywordReader::open(path, profile, 1)? {
        let (keyword, pos) = keyword?;
        if !set.insert(keyword.identity()) {
            return Err(Error::Verification(format!(
                "{}:{}: duplicated keyword {:?}",
                path.display(),
                pos,
                keyword.to_string()
            )));
        }
    }
    Ok(set)
}

fn identity_set(path: &Path, profile: &Profile) -> Result<HashSet<String>, Error> {
    let mut set = HashSet::new();
    for keyword in KeywordReader::open(path, profile, profile.column)? {
        set.insert(keyword?.0.identity());
    }
    Ok(set)
}
