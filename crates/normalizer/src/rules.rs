// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module contains the substitution rules applied to the keyword column.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

use crate::Error;

/// A pattern and its replacement. Every non-overlapping match is replaced.
///
/// The replacement supports the [regex::Regex::replace_all] syntax, e.g. `$1`.
#[derive(Debug, Clone)]
pub struct Rule {
    re: Regex,
    replace: String,
}

impl Rule {
    /// Compile a new rule.
    pub fn new(pattern: &str, replace: &str) -> Result<Rule, Error> {
        let re = Regex::new(pattern).map_err(|source| Error::BadPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Rule {
            re,
            replace: replace.to_string(),
        })
    }

    /// The rule pattern.
    pub fn pattern(&self) -> &str {
        self.re.as_str()
    }

    /// The rule replacement.
    pub fn replacement(&self) -> &str {
        &self.replace
    }

    fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.re.replace_all(value, self.replace.as_str())
    }
}

/// Parse the command line syntax `PATTERN=>REPLACEMENT`.
impl std::str::FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("=>") {
            Some((pattern, replace)) if !pattern.is_empty() => Rule::new(pattern, replace),
            _ => Err(Error::BadRuleSyntax(s.to_string())),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=>{}", self.pattern(), self.replace)
    }
}

/// An ordered list of rules. Each rule sees the output of the previous one.
#[derive(Debug, Clone)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    /// A rule set that keeps the column as it is.
    pub fn empty() -> RuleSet {
        RuleSet(Vec::new())
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.0.push(rule)
    }

    /// Iterate the rules in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no rules are defined.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply every rule in order.
    pub fn apply(&self, field: &str) -> String {
        let mut value = field.to_string();
        for rule in &self.0 {
            let replaced = match rule.apply(&value) {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            if let Some(replaced) = replaced {
                value = replaced;
            }
        }
        value
    }
}

/// The [Preset::Default] rules.
impl Default for RuleSet {
    fn default() -> Self {
        Preset::Default.rules()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet(iter.into_iter().collect())
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The built-in rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// No rules.
    None,
    /// Collapse decimal numbers and whitespace-prefixed integers to `x`.
    Default,
    /// The detector log rules: numbers, MAC addresses, part numbers and counters.
    Instrument,
}

fn compile(rules: &[(&str, &str)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|(pattern, replace)| Rule::new(pattern, replace).unwrap())
        .collect()
}

lazy_static! {
    static ref DEFAULT_RULES: Vec<Rule> = compile(&[(r"\d+\.\d+|\s\d+", "x")]);
    static ref INSTRUMENT_RULES: Vec<Rule> = compile(&[
        // decimals, with an optional exponent
        (r"\d+\.\d+(e[+-]\d+)?", "x"),
        (
            r"([A-Fa-f0-9]{2}:){3}[A-Fa-f0-9]:([A-Fa-f0-9]{2}:)([A-Fa-f0-9]{2})",
            "[MAC_XX]",
        ),
        (r"\]\d+", "]x"),
        (r":\d+", ":x"),
        (r"\s\d+", " x"),
        // part numbers
        (r"PA\d+-\d", "PAxxxx"),
        (r"\d+", "[n]"),
    ]);
}

impl Preset {
    /// Build a new rule set. The compiled patterns are shared between calls.
    pub fn rules(&self) -> RuleSet {
        match self {
            Preset::None => RuleSet::empty(),
            Preset::Default => DEFAULT_RULES.iter().cloned().collect(),
            Preset::Instrument => INSTRUMENT_RULES.iter().cloned().collect(),
        }
    }

    /// The preset names, as accepted by [std::str::FromStr].
    pub fn names() -> &'static [&'static str] {
        &["none", "default", "instrument"]
    }
}

impl std::str::FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Preset::None),
            "default" => Ok(Preset::Default),
            "instrument" => Ok(Preset::Instrument),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

#[test]
fn test_rule_order() {
    let rules: RuleSet = [Rule::new("a", "b").unwrap(), Rule::new("b", "c").unwrap()]
        .into_iter()
        .collect();
    assert_eq!(rules.apply("ab"), "cc");
    assert_eq!(
        rules.iter().map(|rule| rule.pattern()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );

    let rules: RuleSet = [Rule::new("b", "c").unwrap(), Rule::new("a", "b").unwrap()]
        .into_iter()
        .collect();
    assert_eq!(rules.apply("ab"), "bc");
}

#[test]
fn test_rule_extend() {
    let mut rules = Preset::Default.rules();
    rules.extend(["debug=>".parse::<Rule>().unwrap(), "x=>N".parse().unwrap()]);
    let mut displayed = Vec::new();
    for rule in &rules {
        displayed.push(rule.to_string());
    }
    assert_eq!(displayed, vec![r"\d+\.\d+|\s\d+=>x", "debug=>", "x=>N"]);
    assert_eq!(rules.apply("debug offset 7"), " offsetN");
}

#[test]
fn test_rule_parse() {
    let rule: Rule = r"(\w+)@host=>$1@HOST".parse().unwrap();
    assert_eq!(rule.pattern(), r"(\w+)@host");
    assert_eq!(rule.replacement(), "$1@HOST");
    assert_eq!(rule.apply("root@host"), "root@HOST");
    assert_eq!(rule.to_string(), r"(\w+)@host=>$1@HOST");

    let rule: Rule = "debug=>".parse().unwrap();
    assert_eq!(rule.apply("a debug line"), "a  line");

    assert!(matches!("nope".parse::<Rule>(), Err(Error::BadRuleSyntax(_))));
    assert!(matches!("=>x".parse::<Rule>(), Err(Error::BadRuleSyntax(_))));
    assert!(matches!(
        "(=>x".parse::<Rule>(),
        Err(Error::BadPattern { .. })
    ));
}

#[test]
fn test_presets() {
    assert_eq!(Preset::None.rules().len(), 0);
    assert_eq!(Preset::Default.rules().len(), 1);
    assert_eq!(RuleSet::default().apply("offset 7"), "offsetx");
    for name in Preset::names() {
        assert!(name.parse::<Preset>().is_ok());
    }
    assert!(matches!(
        "fancy".parse::<Preset>(),
        Err(Error::UnknownPreset(_))
    ));
}

#[cfg(test)]
mod instrument_tests {
    use super::*;

    fn instrument(field: &str) -> String {
        Preset::Instrument.rules().apply(field)
    }

    #[test]
    fn test_numbers() {
        assert_eq!(instrument("Frame 42 took 3.5 ms"), "Frame x took x ms");
        assert_eq!(instrument("timeout:250 after 12 retries"), "timeout:x after x retries");
    }

    #[test]
    fn test_mac() {
        assert_eq!(instrument("Link up on 00:1A:2b:3:4c:5d"), "Link up on [MAC_XX]");
    }

    #[test]
    fn test_part_number() {
        assert_eq!(
            instrument("Gain 1.5e-03 for PA1234-5 in slot[3]7"),
            "Gain x for PAxxxx in slot[[n]]x"
        );
    }
}
