//! Keyed map with a fixed vocabulary and an unknown-key bag.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Map whose known keys are fixed at construction.
///
/// Keys outside the vocabulary are kept in a separate `extra` bag rather than
/// dropped, so data written by other builds survives a load/save cycle.
/// Lookups and iteration see both bags; nothing is ever removed by a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap<V> {
    known: BTreeMap<String, V>,
    extra: BTreeMap<String, V>,
}

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        Self {
            known: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl<V: Clone> KeyedMap<V> {
    /// Creates a map whose vocabulary is exactly the given keys.
    pub fn seeded<K, I>(defaults: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            known: defaults.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            extra: BTreeMap::new(),
        }
    }

    /// Looks up a key in either bag.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.known.get(key).or_else(|| self.extra.get(key))
    }

    /// Mutable lookup in either bag.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        if self.known.contains_key(key) {
            self.known.get_mut(key)
        } else {
            self.extra.get_mut(key)
        }
    }

    /// Returns true if `key` belongs to the vocabulary.
    pub fn is_known(&self, key: &str) -> bool {
        self.known.contains_key(key)
    }

    /// Returns true if `key` is present in either bag.
    pub fn contains_key(&self, key: &str) -> bool {
        self.known.contains_key(key) || self.extra.contains_key(key)
    }

    /// Inserts a value, routing unknown keys to the extra bag.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(slot) = self.known.get_mut(&key) {
            *slot = value;
        } else {
            self.extra.insert(key, value);
        }
    }

    /// Overwrites a known key. Returns false (and changes nothing) for keys
    /// outside the vocabulary.
    pub fn set_known(&mut self, key: &str, value: V) -> bool {
        match self.known.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrites every given key; keys not mentioned keep their value.
    pub fn merge<K, I>(&mut self, entries: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Iterates known entries, then extra entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.known
            .iter()
            .chain(self.extra.iter())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Entries in the vocabulary.
    pub fn known(&self) -> &BTreeMap<String, V> {
        &self.known
    }

    /// Entries outside the vocabulary.
    pub fn extras(&self) -> &BTreeMap<String, V> {
        &self.extra
    }

    /// Independent copy of both bags flattened into one map.
    pub fn to_flat(&self) -> BTreeMap<String, V> {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.extra.is_empty()
    }
}

impl<V: Serialize> Serialize for KeyedMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.known.iter().chain(self.extra.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> KeyedMap<bool> {
        KeyedMap::seeded([("skin", true), ("bone", false)])
    }

    #[test]
    fn test_unknown_keys_go_to_extra() {
        let mut map = sample();
        map.set("tail", true);
        assert!(map.is_known("skin"));
        assert!(!map.is_known("tail"));
        assert_eq!(map.get("tail"), Some(&true));
        assert_eq!(map.extras().len(), 1);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_set_known_ignores_unknown() {
        let mut map = sample();
        assert!(map.set_known("bone", true));
        assert!(!map.set_known("wings", true));
        assert_eq!(map.get("bone"), Some(&true));
        assert!(!map.contains_key("wings"));
    }

    #[test]
    fn test_merge_never_removes() {
        let mut map = sample();
        map.merge([("bone", true)]);
        assert_eq!(map.get("skin"), Some(&true));
        assert_eq!(map.get("bone"), Some(&true));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_serializes_flat() {
        let mut map = sample();
        map.set("tail", false);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"bone": false, "skin": true, "tail": false})
        );
    }

    #[test]
    fn test_to_flat_is_independent() {
        let map = sample();
        let mut flat = map.to_flat();
        flat.insert("skin".to_string(), false);
        assert_eq!(map.get("skin"), Some(&true));
    }
}
