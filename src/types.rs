//! Core, format-agnostic types for pz-translate.
//! The builder decodes into these; the renderer and merge engine consume them.

use std::collections::HashMap;

use serde::{
    Deserialize, Serialize,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

/// Metadata key bound to the target language id in every translation map.
///
/// Templates reference it from the header line so a table named `Sandbox_EN`
/// renders as `Sandbox_FR` for French. It is never translated and never
/// exported.
pub const LANGUAGE_NAME_KEY: &str = "__language_name__";

/// A target language as supplied by the language registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Directory / table suffix used by the game, e.g. `EN`, `PTBR`.
    pub id: String,
    /// Human readable name, e.g. `Portuguese (Brazil)`.
    pub display_name: String,
    /// Java charset name the game reads the files with, e.g. `Cp1252`.
    pub charset: String,
    /// Language code understood by the machine translation service.
    pub translate_code: String,
}

impl Locale {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        charset: impl Into<String>,
        translate_code: impl Into<String>,
    ) -> Self {
        Locale {
            id: id.into(),
            display_name: display_name.into(),
            charset: charset.into(),
            translate_code: translate_code.into(),
        }
    }
}

/// Key to text mapping that remembers insertion order.
///
/// Overwriting an existing key keeps its original position, so iteration
/// follows the order in which keys were first declared in the source file.
#[derive(Debug, Clone, Default)]
pub struct TranslationMap {
    values: HashMap<String, String>,
    order: Vec<String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding only the language sentinel.
    pub fn for_language(language_id: &str) -> Self {
        let mut map = Self::new();
        map.insert(LANGUAGE_NAME_KEY, language_id);
        map
    }

    /// Inserts or overwrites `key`, returning the previous text.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let key = key.into();
        let text = text.into();
        match self.values.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, text)),
            None => {
                self.order.push(key.clone());
                self.values.insert(key, text);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the text for `key` only when it is present and non-empty.
    pub fn get_filled(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|text| !text.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.values.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.values[key].as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Iterates translatable entries, skipping the language sentinel.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(key, _)| *key != LANGUAGE_NAME_KEY)
    }

    /// Number of translatable entries (the sentinel is not counted).
    pub fn entry_count(&self) -> usize {
        self.len() - usize::from(self.contains_key(LANGUAGE_NAME_KEY))
    }

    /// Copies every entry of `other` over this map; `other` wins on conflicts.
    pub fn overlay(&mut self, other: &TranslationMap) {
        for (key, text) in other.iter() {
            self.insert(key, text);
        }
    }

    /// Copies entries of `other` whose key is absent or empty here.
    ///
    /// Returns the number of entries filled.
    pub fn fill_gaps(&mut self, other: &TranslationMap) -> usize {
        let mut filled = 0;
        for (key, text) in other.iter() {
            if self.get_filled(key).is_none() && !text.is_empty() {
                self.insert(key, text);
                filled += 1;
            }
        }
        filled
    }
}

impl PartialEq for TranslationMap {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for TranslationMap {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TranslationMap::new();
        for (key, text) in iter {
            map.insert(key, text);
        }
        map
    }
}

impl Serialize for TranslationMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, text) in self.iter() {
            map.serialize_entry(key, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TranslationMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = TranslationMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of translation keys to texts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = TranslationMap::new();
                while let Some((key, text)) = access.next_entry::<String, String>()? {
                    map.insert(key, text);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut map = TranslationMap::new();
        map.insert("b", "1");
        map.insert("a", "2");
        assert_eq!(map.insert("b", "3"), Some("1".to_string()));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some("3"));
    }

    #[test]
    fn test_remove_drops_order_entry() {
        let mut map: TranslationMap = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(map.remove("a"), Some("1".to_string()));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(map.remove("missing"), None);
    }

    #[test]
    fn test_entries_skip_sentinel() {
        let mut map = TranslationMap::for_language("FR");
        map.insert("UI_Yes", "Oui");
        assert_eq!(map.len(), 2);
        assert_eq!(map.entry_count(), 1);
        assert_eq!(map.entries().collect::<Vec<_>>(), vec![("UI_Yes", "Oui")]);
    }

    #[test]
    fn test_overlay_and_fill_gaps() {
        let mut base: TranslationMap = [("a", "1"), ("b", "")].into_iter().collect();
        let top: TranslationMap = [("a", "2"), ("c", "3")].into_iter().collect();
        base.overlay(&top);
        assert_eq!(base.get("a"), Some("2"));
        assert_eq!(base.get("c"), Some("3"));

        let recovered: TranslationMap = [("a", "x"), ("b", "y"), ("d", "")].into_iter().collect();
        assert_eq!(base.fill_gaps(&recovered), 1);
        assert_eq!(base.get("a"), Some("2"));
        assert_eq!(base.get("b"), Some("y"));
        assert!(!base.contains_key("d"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: TranslationMap = [("a", "1"), ("b", "2")].into_iter().collect();
        let right: TranslationMap = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let map: TranslationMap = [("z", "last"), ("a", "first")].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":"last","a":"first"}"#);
        let back: TranslationMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
