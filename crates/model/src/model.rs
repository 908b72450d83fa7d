// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This library provides the core logic of the logkeys project.
//!
//! A [Job] compares the keywords of two log files:
//!
//! - [reconcile] builds a [KeywordTable] for each file, writes the keywords found in both files
//!   to the matched output, and the others to the mismatch output.
//! - [verify] checks that the matched output is exactly the intersection of the two files.
//!
//! ```no_run
//! # use logkeys_model::{config::Profile, env::Env, reconcile, Job};
//! let job = Job::new("old/XRImDet.0.log", "new/XRImDet.0.log", Profile::default());
//! let summary = reconcile(&Env::default(), &job).unwrap();
//! println!("{} keywords matched", summary.matched);
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use logkeys_normalizer::{FileType, Keyword, Preset, Rule, RuleSet};

pub mod config;
pub mod env;
pub mod keywords;
pub mod reader;
mod reconcile;
pub mod table;
mod verify;

pub use crate::config::Profile;
pub use crate::keywords::KeywordReader;
pub use crate::reconcile::reconcile;
pub use crate::table::KeywordTable;
pub use crate::verify::{verify, VerifyReport};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: invalid utf-8", .path.display())]
    Decode { path: PathBuf, line: usize },

    #[error(transparent)]
    Normalizer(#[from] logkeys_normalizer::Error),

    #[error("bad configuration: {0}")]
    Config(#[from] config::Error),

    #[error("verification failed: {0}")]
    Verification(String),
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The comparison of two log files.
#[derive(Debug, Clone)]
pub struct Job {
    pub file1: PathBuf,
    pub file2: PathBuf,
    pub profile: Profile,
}

impl Job {
    pub fn new(file1: impl Into<PathBuf>, file2: impl Into<PathBuf>, profile: Profile) -> Job {
        Job {
            file1: file1.into(),
            file2: file2.into(),
            profile,
        }
    }

    /// Check the parameters before touching any file.
    pub fn validate(&self) -> Result<(), Error> {
        self.profile.file_type.separator()?;
        if self.profile.column == 0 {
            return Err(config::Error::InvalidColumn(0).into());
        }
        Ok(())
    }
}

/// What was read from one input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub lines: usize,
    pub bytes: usize,
    pub keywords: usize,
}

/// The result of a successful [reconcile].
#[derive(Debug, Clone)]
pub struct Summary {
    pub file1: TableStats,
    pub file2: TableStats,
    /// The number of keywords written to the matched output.
    pub matched: usize,
    /// The number of keywords written to the mismatch output.
    pub mismatch: usize,
    pub verify: VerifyReport,
    pub elapsed: std::time::Duration,
}

#[test]
fn test_job_validate() {
    let job = Job::new("a", "b", Profile::default());
    assert!(job.validate().is_ok());

    let mut bad_type = job.clone();
    bad_type.profile.file_type = FileType::Unsupported("SSV".into());
    assert!(matches!(
        bad_type.validate(),
        Err(Error::Normalizer(
            logkeys_normalizer::Error::UnsupportedFormat(_)
        ))
    ));

    let mut bad_column = job;
    bad_column.profile.column = 0;
    assert!(matches!(
        bad_column.validate(),
        Err(Error::Config(config::Error::InvalidColumn(0)))
    ));
}
