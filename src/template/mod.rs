//! Template assemblers.
//!
//! `universal` turns every `##` section of a template into a schema-free map;
//! `project` projects the same outline onto the fixed `ProjectDetails` record.

pub mod project;
pub mod universal;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub use project::{parse_project, ProjectDetails};
pub use universal::{parse_universal, SectionValue, UniversalTemplate};

pub const UNTITLED: &str = "Untitled Project";

/// String-keyed map that keeps document order and serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Insert unless a key equal ignoring case is already present. Returns
    /// whether the value was stored.
    pub fn insert_first(&mut self, key: &str, value: V) -> bool {
        if self.get(key).is_some() {
            return false;
        }
        self.entries.push((key.to_string(), value));
        true
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&V> {
        let key = key.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins_case_insensitively() {
        let mut map = OrderedMap::default();
        assert!(map.insert_first("Notes", 1));
        assert!(!map.insert_first("NOTES", 2));
        assert_eq!(map.get("notes"), Some(&1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut map = OrderedMap::default();
        map.insert_first("zeta", 1);
        map.insert_first("alpha", 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":2}"#);
    }
}
