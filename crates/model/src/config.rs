// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module provides the analysis profiles configuration.
//!
//! A configuration file is either a single profile:
//!
//! ```yaml
//! column: 9
//! preset: default
//! rules:
//!   - pattern: 'SN\d+'
//!     replace: SN
//! matched: XRImDet.key
//! mismatch: XRImDet.err
//! ```
//!
//! Or a list of profiles, selected with the name of the first file:
//!
//! ```yaml
//! - match_file: XRImDet
//!   config:
//!     column: 9
//! - match_file: sysMSG
//!   config:
//!     column: 7
//! ```

use logkeys_normalizer::{FileType, Preset, Rule, RuleSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The loaded user config
pub enum Config {
    /// A single global profile
    Static(Profile),
    /// A list of profiles to be matched with the file name
    Matchers(Vec<(MatcherConfig, Profile)>),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("bad regex: {0}")]
    BadRegex(#[from] regex::Error),

    #[error("{0}")]
    BadRule(#[from] logkeys_normalizer::Error),

    #[error("invalid file: {0}")]
    BadFile(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    BadJSON(#[from] serde_json::Error),

    #[error("invalid yaml: {0}")]
    BadYAML(#[from] serde_yaml::Error),

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error("no profile matches {0}")]
    NoProfile(String),

    #[error("invalid column {0}, columns start at 1")]
    InvalidColumn(usize),
}

impl Config {
    pub fn from_path(path: PathBuf) -> Result<Self, Error> {
        let file = std::fs::File::open(&path)?;
        Config::from_reader(path, file)
    }

    fn from_reader<R: std::io::Read>(path: PathBuf, file: R) -> Result<Self, Error> {
        let reader = std::io::BufReader::new(file);
        let cf = match path.as_path().extension().and_then(std::ffi::OsStr::to_str) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_reader(reader)?),
            Some("json") => Ok(serde_json::from_reader(reader)?),
            m_ext => Err(Error::UnknownFormat(
                m_ext.map(|s| s.to_string()).unwrap_or("".to_string()),
            )),
        }?;
        Config::from_config_file(&cf)
    }

    /// Convert the raw ConfigFile into a loaded Config
    fn from_config_file(cf: &ConfigFile) -> Result<Self, Error> {
        match cf {
            ConfigFile::Empty => Ok(Config::default()),
            ConfigFile::Static(pf) => Profile::from_config_file(pf).map(Config::Static),
            ConfigFile::Matchers(xs) if xs.is_empty() => {
                Err(Error::UnknownFormat("Profile list is empty".into()))
            }
            ConfigFile::Matchers(xs) => xs
                .iter()
                .map(|pmf| {
                    Ok((
                        MatcherConfig::from_config_file(pmf)?,
                        Profile::from_config_file(&pmf.config)?,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Config::Matchers),
        }
    }

    /// Get the profile for the given log file
    pub fn get_profile(&self, file: &Path) -> Result<&Profile, Error> {
        match self {
            Config::Static(profile) => Ok(profile),
            Config::Matchers(matchers) => matchers
                .iter()
                .find(|mc| mc.0.matches(file))
                .map(|mc| &mc.1)
                .ok_or_else(|| Error::NoProfile(file.display().to_string())),
        }
    }
}

/// How to extract the keywords of a log file, and where to write the results.
#[derive(Debug, Clone)]
pub struct Profile {
    pub file_type: FileType,
    /// The 1-based keyword column
    pub column: usize,
    pub rules: RuleSet,
    /// The keywords found in both files
    pub matched: PathBuf,
    /// The keywords found in only one file
    pub mismatch: PathBuf,
}

impl Profile {
    fn from_config_file(cf: &ProfileFile) -> Result<Self, Error> {
        if cf.column == 0 {
            return Err(Error::InvalidColumn(cf.column));
        }
        let preset: Preset = cf.preset.parse()?;
        let mut rules = preset.rules();
        rules.extend(
            cf.rules
                .iter()
                .map(|rule| Rule::new(&rule.pattern, &rule.replace))
                .collect::<Result<Vec<_>, _>>()?,
        );
        Ok(Profile {
            file_type: cf.file_type.as_str().into(),
            column: cf.column,
            rules,
            matched: cf.matched.clone(),
            mismatch: cf.mismatch.clone(),
        })
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::from_config_file(&ProfileFile::default()).unwrap()
    }
}

pub struct MatcherConfig {
    file_re: Regex,
}

impl MatcherConfig {
    fn from_config_file(cf: &ProfileMatcherFile) -> Result<Self, Error> {
        let file_re = Regex::new(&cf.match_file)?;
        Ok(MatcherConfig { file_re })
    }

    fn matches(&self, file: &Path) -> bool {
        file.file_name()
            .and_then(std::ffi::OsStr::to_str)
            .map(|name| self.file_re.is_match(name))
            .unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::Static(Profile::default())
    }
}

// Matchers comes first: every ProfileFile field has a default, so a sequence would be
// accepted as a Static profile.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Matchers(Vec<ProfileMatcherFile>),
    Static(ProfileFile),
    Empty,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileMatcherFile {
    match_file: String,
    config: ProfileFile,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    #[serde(default = "default_file_type")]
    file_type: String,
    #[serde(default = "default_column")]
    column: usize,
    #[serde(default = "default_preset")]
    preset: String,
    #[serde(default)]
    rules: Vec<RuleFile>,
    #[serde(default = "default_matched")]
    matched: PathBuf,
    #[serde(default = "default_mismatch")]
    mismatch: PathBuf,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    pattern: String,
    #[serde(default)]
    replace: String,
}

fn default_file_type() -> String {
    "CSV".into()
}

fn default_column() -> usize {
    1
}

fn default_preset() -> String {
    "default".into()
}

fn default_matched() -> PathBuf {
    "keywords.txt".into()
}

fn default_mismatch() -> PathBuf {
    "err.key".into()
}

impl Default for ProfileFile {
    fn default() -> Self {
        ProfileFile {
            file_type: default_file_type(),
            column: default_column(),
            preset: default_preset(),
            rules: Vec::new(),
            matched: default_matched(),
            mismatch: default_mismatch(),
        }
    }
}

#[cfg(test)]
pub fn config_from_yaml(yaml: &str) -> Config {
    Config::from_reader("config.yaml".into(), std::io::Cursor::new(yaml)).unwrap()
}

#[test]
fn test_config_default() {
    for config in [Config::default(), config_from_yaml("")] {
        let profile = config.get_profile(Path::new("any.log")).unwrap();
        assert_eq!(profile.file_type, FileType::Csv);
        assert_eq!(profile.column, 1);
        assert_eq!(profile.rules.len(), 1);
        assert_eq!(profile.matched, PathBuf::from("keywords.txt"));
        assert_eq!(profile.mismatch, PathBuf::from("err.key"));
    }
}

#[test]
fn test_config_static() {
    let config = config_from_yaml(
        r"
column: 9
preset: instrument
rules:
  - pattern: 'SN\[n\]'
    replace: SN
  - pattern: 'debug '
matched: XRImDet.key
mismatch: XRImDet.err
",
    );
    let profile = config.get_profile(Path::new("XRImDet.0.log")).unwrap();
    assert_eq!(profile.column, 9);
    assert_eq!(profile.rules.len(), 9);
    assert_eq!(profile.rules.apply("debug SN42 ready"), "SN ready");
    assert_eq!(profile.matched, PathBuf::from("XRImDet.key"));
}

#[test]
fn test_config_json() {
    let config = Config::from_reader(
        "config.json".into(),
        std::io::Cursor::new(r#"{"file_type": "SSV", "preset": "none"}"#),
    )
    .unwrap();
    let profile = config.get_profile(Path::new("a.log")).unwrap();
    assert_eq!(profile.file_type, FileType::Unsupported("SSV".into()));
    assert!(profile.rules.is_empty());
}

#[test]
fn test_config_match() {
    let config = config_from_yaml(
        "
- match_file: ^XRImDet
  config:
    column: 9
- match_file: sysMSG
  config:
    column: 7
    preset: none
",
    );
    let column = |path: &str| config.get_profile(Path::new(path)).map(|p| p.column);
    assert_eq!(column("snapshots/hp/XRImDet.0.log").unwrap(), 9);
    assert_eq!(column("sysMSG.log").unwrap(), 7);
    assert!(matches!(column("other.log"), Err(Error::NoProfile(_))));
    // Only the file name is matched.
    assert!(column("XRImDet/other.log").is_err());
}

#[test]
fn test_config_empty_list() {
    for (path, content) in [("config.yaml", "[]"), ("config.json", "[]")] {
        let result = Config::from_reader(path.into(), std::io::Cursor::new(content));
        assert!(matches!(result, Err(Error::UnknownFormat(_))));
    }
    // A list with a single matcher is not read as a static profile.
    let config = config_from_yaml("- match_file: log\n  config: {column: 2}");
    assert!(matches!(config, Config::Matchers(ref xs) if xs.len() == 1));
}

#[test]
fn test_config_bad() {
    let bad = |path: &str, content: &str| {
        Config::from_reader(path.into(), std::io::Cursor::new(content.to_string())).is_err()
    };
    assert!(bad("config.yaml", "unknown: true"));
    assert!(bad("config.json", "{\"unknown\": true}"));
    assert!(bad("config.toml", ""));
    assert!(bad("config.yaml", "column: 0"));
    assert!(bad("config.yaml", "preset: fancy"));
    assert!(bad("config.yaml", "rules: [{pattern: '('}]"));
    assert!(bad("config.yaml", "[]"));
    assert!(bad("config.yaml", "- match_file: '('\n  config: {}"));
}
