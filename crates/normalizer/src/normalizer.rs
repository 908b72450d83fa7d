// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! This library provides the keyword normalizer of the logkeys project.
//!
//! The goal is to extract one column of a delimited log line and to replace varying values
//! with fixed tokens (e.g. `3.14` is converted to `x`), so that two lines reporting the same
//! message template produce the same [Keyword].
//!
//! The main function is [normalize]:
//!
//! ```rust
//! # use logkeys_normalizer::{normalize, FileType, RuleSet};
//! let rules = RuleSet::default();
//! let keyword = normalize("2023-06-01,INFO,temperature 42 reached\n", &FileType::Csv, 3, &rules);
//! assert_eq!(keyword.unwrap().as_str(), "temperaturex reached\n");
//! ```
//!
//! Keywords are compared by their [identity], which ignores whitespace:
//!
//! ```rust
//! # use logkeys_normalizer::*;
//! keywords_eq!("temperature 42 reached", "temperature 1984 reached");
//! keywords_eq!("offset 7\n", "offset  1984");
//! ```

use thiserror::Error;

pub mod rules;

pub use rules::{Preset, Rule, RuleSet};

/// The normalizer errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Only the CSV layout can be split into columns.
    #[error("unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    /// A rule pattern is not a valid regex.
    #[error("bad rule pattern {pattern:?}: {source}")]
    BadPattern {
        /// The rejected pattern.
        pattern: String,
        /// The regex compiler error.
        #[source]
        source: regex::Error,
    },

    /// A command line rule is not written as `PATTERN=>REPLACEMENT`.
    #[error("bad rule {0:?}, expected PATTERN=>REPLACEMENT")]
    BadRuleSyntax(String),

    /// The preset name is not known.
    #[error("unknown preset: {0:?}")]
    UnknownPreset(String),
}

/// The layout of the log file lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    /// Comma separated values, without quoting support.
    Csv,
    /// Any other layout name. It is accepted by the parser so that the failure happens when the
    /// file is actually analyzed.
    Unsupported(String),
}

impl std::str::FromStr for FileType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<&str> for FileType {
    fn from(s: &str) -> Self {
        match s {
            "CSV" => FileType::Csv,
            _ => FileType::Unsupported(s.to_string()),
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Csv => write!(f, "CSV"),
            FileType::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

impl FileType {
    /// Return the column separator, or the [Error::UnsupportedFormat] error.
    pub fn separator(&self) -> Result<char, Error> {
        match self {
            FileType::Csv => Ok(','),
            FileType::Unsupported(name) => Err(Error::UnsupportedFormat(name.clone())),
        }
    }
}

/// A normalized column value, always terminated by a single new line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyword(String);

impl Keyword {
    /// The keyword of lines that do not have enough columns.
    pub fn empty() -> Keyword {
        Keyword("\n".to_string())
    }

    fn from_field(mut field: String) -> Keyword {
        if !field.ends_with('\n') {
            field.push('\n')
        }
        Keyword(field)
    }

    /// Access the keyword text, including the final new line.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the keyword of lines that do not have enough columns.
    pub fn is_empty(&self) -> bool {
        self.0 == "\n"
    }

    /// The value used to compare keywords, see [identity].
    pub fn identity(&self) -> String {
        identity(&self.0)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.trim_end_matches('\n'))
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> String {
        keyword.0
    }
}

/// Remove every whitespace, including the new line.
pub fn identity(keyword: &str) -> String {
    keyword.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The normalizer entry point.
///
/// The `column` is 1-based. Lines with fewer columns produce the [Keyword::empty] keyword.
pub fn normalize(
    line: &str,
    file_type: &FileType,
    column: usize,
    rules: &RuleSet,
) -> Result<Keyword, Error> {
    let separator = file_type.separator()?;
    let field = match column.checked_sub(1) {
        Some(pos) => line.split(separator).nth(pos),
        None => None,
    };
    Ok(match field {
        Some(field) => Keyword::from_field(rules.apply(field)),
        None => Keyword::empty(),
    })
}

/// Helper macro to write short tests. `keywords_eq!("a", "b")` checks that both lines have the
/// same identity, using the first column and the default rules.
#[macro_export]
macro_rules! keywords_eq {
    ($a:expr,$b:expr) => {
        assert_eq!(
            $crate::normalize($a, &$crate::FileType::Csv, 1, &$crate::RuleSet::default())
                .unwrap()
                .identity(),
            $crate::normalize($b, &$crate::FileType::Csv, 1, &$crate::RuleSet::default())
                .unwrap()
                .identity()
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(line: &str, column: usize) -> String {
        normalize(line, &FileType::Csv, column, &RuleSet::default())
            .unwrap()
            .as_str()
            .to_string()
    }

    #[test]
    fn test_short_line() {
        assert_eq!(csv("a,b\n", 3), "\n");
        assert_eq!(csv("", 1), "\n");
        assert_eq!(csv("a,b,c\n", 0), "\n");
        assert!(normalize("a", &FileType::Csv, 2, &RuleSet::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_single_new_line() {
        assert_eq!(csv("a,b,last\n", 3), "last\n");
        assert_eq!(csv("a,b,last", 3), "last\n");
        assert_eq!(csv("a,middle,c\n", 2), "middle\n");
        assert_eq!(csv("a,b,\n", 3), "\n");
        assert_eq!(csv("a,b,", 3), "\n");
    }

    #[test]
    fn test_no_quoting() {
        assert_eq!(csv("a,\"b,c\",d\n", 2), "\"b\n");
    }

    #[test]
    fn test_default_rules() {
        assert_eq!(csv("a,b,1.5\n", 3), "x\n");
        assert_eq!(csv("a,b,2.0\n", 3), "x\n");
        assert_eq!(csv("2023,Frame 42 took 3.5 ms", 2), "Framex tookx.5 ms\n");
        // A leading number is not preceded by whitespace.
        assert_eq!(csv("42 frames", 1), "42 frames\n");
    }

    #[test]
    fn test_unsupported() {
        for name in ["SSV", "csv", ""] {
            let file_type: FileType = name.parse().unwrap();
            assert!(matches!(
                normalize("a b c", &file_type, 1, &RuleSet::default()),
                Err(Error::UnsupportedFormat(n)) if n == name
            ));
        }
    }

    #[test]
    fn test_identity() {
        assert_eq!(identity("a b\tc\n"), "abc");
        assert_eq!(Keyword::empty().identity(), "");
        keywords_eq!("link up", "link  up ");
        keywords_eq!("a,b", "a,c");
    }

    #[test]
    fn test_idempotent() {
        for rules in [
            RuleSet::default(),
            Preset::Instrument.rules(),
            RuleSet::empty(),
        ] {
            for field in [
                "Frame 42 took 3.5 ms",
                "Gain 1.5e-03 for PA1234-5 in slot[3]7",
                "Link up on 00:1A:2b:3:4c:5d",
                "Heartbeat",
            ] {
                let once = normalize(field, &FileType::Csv, 1, &rules).unwrap();
                let twice = normalize(once.as_str(), &FileType::Csv, 1, &rules).unwrap();
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Keyword::from_field("a b".into()).to_string(), "a b");
        assert_eq!(FileType::Csv.to_string(), "CSV");
        assert_eq!(FileType::Unsupported("SSV".into()).to_string(), "SSV");
    }
}
