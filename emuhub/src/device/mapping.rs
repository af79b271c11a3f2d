//! Ordered key/value configuration written to each device's `config.ini`.

use indexmap::IndexMap;

/// Ordered configuration mapping.
///
/// Entries keep insertion order. An entry whose value is `None` is kept in the
/// mapping but omitted from [`ConfigurationMapping::to_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationMapping {
    entries: IndexMap<String, Option<String>>,
}

impl ConfigurationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a possibly-undefined value.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.insert(key.into(), value);
    }

    /// Insert a defined value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Some(value.into()));
    }

    /// Defined value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|value| value.as_deref())
    }

    /// Whether the key is present, defined or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this mapping with undefined entries dropped.
    pub fn without_unset(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, value)| value.is_some())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    /// Serialize as `key=value` lines with a trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (key, value) in self.iter() {
            if let Some(value) = value {
                text.push_str(key);
                text.push('=');
                text.push_str(value);
                text.push('\n');
            }
        }
        text
    }

    /// Parse `key=value` text.
    ///
    /// Lines are split at the first `=`. Blank lines and lines without `=`
    /// are skipped.
    pub fn parse(text: &str) -> Self {
        let mut mapping = Self::new();
        for line in text.lines() {
            if let Some((key, value)) = line.split_once('=') {
                mapping.set(key, value);
            }
        }
        mapping
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for ConfigurationMapping {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}
