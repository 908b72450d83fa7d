// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module provides the keyword tables and their reconciliation.

use indexmap::map::Entry;
use indexmap::IndexMap;
use logkeys_normalizer::Keyword;

/// The first keyword seen for each identity, in reading order.
#[derive(Debug, Default)]
pub struct KeywordTable(IndexMap<String, Keyword>);

impl KeywordTable {
    pub fn new() -> KeywordTable {
        KeywordTable(IndexMap::new())
    }

    /// Returns false when the keyword identity was already known, the table is unchanged.
    pub fn insert(&mut self, keyword: Keyword) -> bool {
        match self.0.entry(keyword.identity()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(keyword);
                true
            }
        }
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.0.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.0.values()
    }

    /// Split the keywords of both tables.
    ///
    /// The matched keywords are in the order of `self`. The mismatched keywords are the ones of
    /// `self` that are missing from `other`, followed by the ones of `other` that are missing
    /// from `self`.
    pub fn reconcile(self, other: KeywordTable) -> Partition {
        // Each key of other is consumed at most once, because the keys of self are unique.
        let mut consumed = vec![false; other.len()];
        let mut matched = Vec::new();
        let mut mismatch = Vec::new();
        for (identity, keyword) in self.0 {
            match other.0.get_index_of(&identity) {
                Some(idx) => {
                    consumed[idx] = true;
                    matched.push(keyword)
                }
                None => mismatch.push(keyword),
            }
        }
        mismatch.extend(
            other
                .0
                .into_values()
                .zip(consumed)
                .filter(|(_, consumed)| !consumed)
                .map(|(keyword, _)| keyword),
        );
        Partition { matched, mismatch }
    }
}

impl FromIterator<Keyword> for KeywordTable {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        let mut table = KeywordTable::new();
        for keyword in iter {
            table.insert(keyword);
        }
        table
    }
}

#[derive(Debug)]
pub struct Partition {
    /// The keywords found in both tables
    pub matched: Vec<Keyword>,
    /// The keywords found in a single table
    pub mismatch: Vec<Keyword>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use logkeys_normalizer::{normalize, FileType, RuleSet};

    fn table(fields: &[&str]) -> KeywordTable {
        let rules = RuleSet::default();
        fields
            .iter()
            .map(|field| normalize(field, &FileType::Csv, 1, &rules).unwrap())
            .collect()
    }

    fn strs(keywords: &[Keyword]) -> Vec<&str> {
        keywords.iter().map(|k| k.as_str()).collect()
    }

    #[test]
    fn test_first_wins() {
        let mut table = table(&["link up", "link  up", "1.5", "2.0"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.keywords().map(|k| k.as_str()).collect::<Vec<_>>(),
            vec!["link up\n", "x\n"]
        );
        assert!(!table.insert(normalize("linkup", &FileType::Csv, 1, &RuleSet::empty()).unwrap()));
        assert!(table.contains("linkup"));
        assert!(!table.contains("link up"));
    }

    #[test]
    fn test_reconcile() {
        let table1 = table(&["1.5", "foo", "common", "2.0"]);
        let table2 = table(&["bar", "9.9", "com mon", "baz"]);
        let partition = table1.reconcile(table2);
        assert_eq!(strs(&partition.matched), vec!["x\n", "common\n"]);
        assert_eq!(strs(&partition.mismatch), vec!["foo\n", "bar\n", "baz\n"]);
    }

    #[test]
    fn test_reconcile_empty() {
        let partition = table(&[]).reconcile(table(&["a", "b"]));
        assert!(partition.matched.is_empty());
        assert_eq!(strs(&partition.mismatch), vec!["a\n", "b\n"]);

        let partition = table(&["a"]).reconcile(KeywordTable::new());
        assert_eq!(strs(&partition.mismatch), vec!["a\n"]);
        assert!(KeywordTable::new().is_empty());
    }
}
