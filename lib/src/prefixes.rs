//! Prefix table used to compact IRIs into `prefix:suffix` keys and expand them back.

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

lazy_static! {
    // suffixes that survive a round trip through `prefix:suffix` unchanged
    static ref LOCAL_NAME: Regex = Regex::new(r"^(?:[A-Za-z0-9_](?:[A-Za-z0-9_.\-]*[A-Za-z0-9_\-])?)?$")
        .expect("local name pattern is valid");
    // prefix names must not start with a key marker such as `_`, `>` or `"`, nor end in `.`
    static ref PREFIX_NAME: Regex =
        Regex::new(r"^(?:[A-Za-z](?:[A-Za-z0-9_.\-]*[A-Za-z0-9_\-])?)?$")
            .expect("prefix name pattern is valid");
}

/// Mapping from prefix names to namespace IRIs.
///
/// Serializes as a plain JSON object: `{"ex": "http://example.org/"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixMap {
    entries: BTreeMap<String, String>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `prefix` for `namespace`, returning the namespace it replaced.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Option<String> {
        self.entries.insert(prefix.into(), namespace.into())
    }

    pub fn with(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.insert(prefix, namespace);
        self
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose prefix name is usable in keys and `@prefix` declarations.
    pub fn declarable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(prefix, _)| PREFIX_NAME.is_match(prefix))
    }

    /// Splits `iri` into the prefix name and local suffix that reproduce it.
    ///
    /// The longest matching namespace wins; among prefixes bound to the same
    /// namespace the lexicographically smallest name is used. Returns `None`
    /// when no namespace matches or the remainder is not a safe local name.
    pub fn compact<'a>(&self, iri: &'a str) -> Option<(&str, &'a str)> {
        let mut best: Option<(&str, usize)> = None;
        for (prefix, namespace) in &self.entries {
            if !iri.starts_with(namespace.as_str()) || !PREFIX_NAME.is_match(prefix) {
                continue;
            }
            if !LOCAL_NAME.is_match(&iri[namespace.len()..]) {
                continue;
            }
            // BTreeMap iterates prefixes in order, so only a strictly longer namespace replaces
            if best.map_or(true, |(_, len)| namespace.len() > len) {
                best = Some((prefix.as_str(), namespace.len()));
            }
        }
        best.map(|(prefix, len)| (prefix, &iri[len..]))
    }

    /// Reverses [`PrefixMap::compact`].
    pub fn expand(&self, prefix: &str, suffix: &str) -> Option<String> {
        self.get(prefix).map(|namespace| format!("{namespace}{suffix}"))
    }

    /// Reads a prefix table from a JSON object file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let prefixes: PrefixMap = serde_json::from_reader(reader)?;
        Ok(prefixes)
    }
}

impl<K, V> FromIterator<(K, V)> for PrefixMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut prefixes = PrefixMap::new();
        for (prefix, namespace) in iter {
            prefixes.insert(prefix, namespace);
        }
        prefixes
    }
}
