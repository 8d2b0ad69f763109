//! Plugin registries given on the command line.
//!
//! `--rp` and `--rt` take repeated `name:spec` tokens. Clap collects them as
//! raw strings; this module turns them into a typed `PluginMap`. The same
//! routine serves both registries since they share one shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while building a plugin map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginMapError {
    /// Entry has no `:` separating name and spec.
    #[error("malformed plugin entry '{0}': expected NAME:SPEC")]
    Malformed(String),

    /// Entry has an empty name.
    #[error("plugin entry '{0}' has an empty name")]
    EmptyName(String),

    /// Entry has an empty spec.
    #[error("plugin '{0}' has an empty spec")]
    EmptySpec(String),

    /// Same name given twice.
    #[error("plugin '{0}' is registered more than once")]
    Duplicate(String),
}

/// Mapping from plugin name to plugin spec. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PluginMap(BTreeMap<String, String>);

impl PluginMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of raw `name:spec` tokens.
    pub fn parse_entries<I, S>(entries: I) -> Result<Self, PluginMapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        map.merge_entries(entries)?;
        Ok(map)
    }

    /// Parse raw tokens into this map, rejecting names already present.
    pub fn merge_entries<I, S>(&mut self, entries: I) -> Result<(), PluginMapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            let (name, spec) = parse_entry(entry.as_ref())?;
            self.insert(name, spec)?;
        }
        Ok(())
    }

    /// Insert one plugin. Duplicate names are an error, never overwritten.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<String>) -> Result<(), PluginMapError> {
        let name = name.into();
        if self.0.contains_key(&name) {
            return Err(PluginMapError::Duplicate(name));
        }
        self.0.insert(name, spec.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, spec)| (name.as_str(), spec.as_str()))
    }

    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a PluginMap {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Split a `name:spec` token at the first colon. The spec may contain colons.
pub fn parse_entry(entry: &str) -> Result<(String, String), PluginMapError> {
    let (name, spec) = entry
        .split_once(':')
        .ok_or_else(|| PluginMapError::Malformed(entry.to_string()))?;

    let name = name.trim();
    let spec = spec.trim();

    if name.is_empty() {
        return Err(PluginMapError::EmptyName(entry.to_string()));
    }
    if spec.is_empty() {
        return Err(PluginMapError::EmptySpec(name.to_string()));
    }

    Ok((name.to_string(), spec.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let map = PluginMap::parse_entries(["slurm:/opt/plugins/slurm --partition main", "ssh:/opt/plugins/ssh"]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("slurm"), Some("/opt/plugins/slurm --partition main"));
        assert_eq!(map.get("ssh"), Some("/opt/plugins/ssh"));
        assert_eq!(map.names(), vec!["slurm".to_string(), "ssh".to_string()]);
    }

    #[test]
    fn test_spec_keeps_extra_colons() {
        let (name, spec) = parse_entry("remote:ssh://host:22/plugin").unwrap();
        assert_eq!(name, "remote");
        assert_eq!(spec, "ssh://host:22/plugin");
    }

    #[test]
    fn test_malformed_entries() {
        assert_eq!(parse_entry("nocolon"), Err(PluginMapError::Malformed("nocolon".into())));
        assert_eq!(parse_entry(":/bin/true"), Err(PluginMapError::EmptyName(":/bin/true".into())));
        assert_eq!(parse_entry("name: "), Err(PluginMapError::EmptySpec("name".into())));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = PluginMap::parse_entries(["a:/bin/one", "a:/bin/two"]).unwrap_err();
        assert_eq!(err, PluginMapError::Duplicate("a".into()));

        let mut map = PluginMap::parse_entries(["a:/bin/one"]).unwrap();
        assert!(map.merge_entries(["b:/bin/two"]).is_ok());
        assert_eq!(map.merge_entries(["a:/bin/three"]), Err(PluginMapError::Duplicate("a".into())));
        assert_eq!(map.get("a"), Some("/bin/one"));
    }

    #[test]
    fn test_empty_input() {
        let map = PluginMap::parse_entries(Vec::<String>::new()).unwrap();
        assert!(map.is_empty());
    }
}
