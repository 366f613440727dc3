// SPDX-License-Identifier: MPL-2.0
//! Translated message catalog.

use serde::Deserialize;
use std::collections::HashMap;

/// Key to translated string mapping.
///
/// Catalog files come in two shapes: a JSON object keyed by message id, or a
/// JSON array of strings where the element index is the key (the compact
/// table produced by the build's message extraction).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCatalog {
    Keyed(HashMap<String, String>),
    Indexed(Vec<String>),
}

impl MessageCatalog {
    /// Parses a catalog file's contents.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let messages = match serde_json::from_slice(bytes)? {
            RawCatalog::Keyed(messages) => messages,
            RawCatalog::Indexed(messages) => messages
                .into_iter()
                .enumerate()
                .map(|(index, message)| (index.to_string(), message))
                .collect(),
        };
        Ok(Self { messages })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.messages
    }
}

impl From<HashMap<String, String>> for MessageCatalog {
    fn from(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }
}

impl<K, V> FromIterator<(K, V)> for MessageCatalog
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keyed_catalog() {
        let catalog = MessageCatalog::from_json_slice(br#"{"hello":"world"}"#).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("hello"), Some("world"));
    }

    #[test]
    fn parses_indexed_catalog() {
        let catalog = MessageCatalog::from_json_slice(br#"["Fichier","Edition"]"#).unwrap();
        assert_eq!(catalog.get("0"), Some("Fichier"));
        assert_eq!(catalog.get("1"), Some("Edition"));
        assert_eq!(catalog.get("2"), None);
    }

    #[test]
    fn empty_object_is_an_empty_catalog() {
        let catalog = MessageCatalog::from_json_slice(b"{}").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(MessageCatalog::from_json_slice(b"{\"hello\":").is_err());
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(MessageCatalog::from_json_slice(br#"{"count":3}"#).is_err());
        assert!(MessageCatalog::from_json_slice(b"42").is_err());
    }

    #[test]
    fn collects_from_pairs() {
        let catalog: MessageCatalog = [("a", "1"), ("b", "2")].into_iter().collect();
        let mut keys: Vec<_> = catalog.iter().map(|(k, _)| k).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
