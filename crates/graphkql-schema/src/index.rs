//! Index catalog consulted by the index-hint optimizer rule

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    /// Ordered index usable for equality and range lookups
    Range,
    /// Hash index usable for equality lookups only
    Hash,
    /// Full-text search index
    FullText,
}

/// An index definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Name of the index
    pub name: String,

    /// Type of index
    pub index_type: IndexType,

    /// Label this index applies to
    pub label: String,

    /// Properties included in this index
    pub properties: Vec<String>,

    /// Whether the index is unique
    pub unique: bool,
}

impl Index {
    /// Create a new range index
    pub fn range(name: &str, label: &str, property: &str) -> Self {
        Self {
            name: name.to_string(),
            index_type: IndexType::Range,
            label: label.to_string(),
            properties: vec![property.to_string()],
            unique: false,
        }
    }

    /// Create a unique range index
    pub fn unique(name: &str, label: &str, property: &str) -> Self {
        Self {
            unique: true,
            ..Self::range(name, label, property)
        }
    }

    /// Create a hash index
    pub fn hash(name: &str, label: &str, property: &str) -> Self {
        Self {
            index_type: IndexType::Hash,
            ..Self::range(name, label, property)
        }
    }

    /// Create a full-text index
    pub fn fulltext(name: &str, label: &str, properties: Vec<&str>) -> Self {
        Self {
            name: name.to_string(),
            index_type: IndexType::FullText,
            label: label.to_string(),
            properties: properties.into_iter().map(String::from).collect(),
            unique: false,
        }
    }

    /// Returns true if this index can serve an equality lookup on `property`
    pub fn serves_equality(&self, property: &str) -> bool {
        !matches!(self.index_type, IndexType::FullText)
            && self.properties.first().is_some_and(|p| p == property)
    }

    /// Preference for equality lookups, lower is better
    fn equality_rank(&self) -> u8 {
        match (self.unique, &self.index_type) {
            (true, _) => 0,
            (false, IndexType::Hash) => 1,
            _ => 2,
        }
    }
}

/// Caller-supplied set of indexes, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexCatalog {
    /// Indexes by name
    pub indexes: HashMap<String, Index>,
}

impl IndexCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an index, returning false if the name is already taken
    pub fn add_index(&mut self, index: Index) -> bool {
        if self.indexes.contains_key(&index.name) {
            return false;
        }
        self.indexes.insert(index.name.clone(), index);
        true
    }

    /// Builder: add an index
    pub fn with_index(mut self, index: Index) -> Self {
        self.add_index(index);
        self
    }

    /// Find an index that serves an equality lookup on `property`
    ///
    /// With no labels every index is a candidate, since an unlabeled node
    /// may be of any label. Unique indexes win over hash indexes, hash over
    /// range; remaining ties resolve by index name.
    pub fn find_equality_index(&self, labels: &[String], property: &str) -> Option<&Index> {
        self.indexes
            .values()
            .filter(|idx| labels.is_empty() || labels.contains(&idx.label))
            .filter(|idx| idx.serves_equality(property))
            .min_by(|a, b| {
                a.equality_rank()
                    .cmp(&b.equality_rank())
                    .then_with(|| a.name.cmp(&b.name))
            })
    }

    /// Number of indexes in the catalog
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns true if the catalog holds no indexes
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_index() {
        let index = Index::range("idx_user_name", "User", "name");
        assert_eq!(index.index_type, IndexType::Range);
        assert!(!index.unique);
        assert_eq!(index.properties, vec!["name"]);
    }

    #[test]
    fn test_unique_index() {
        let index = Index::unique("idx_user_upn", "User", "upn");
        assert!(index.unique);
        assert_eq!(index.index_type, IndexType::Range);
    }

    #[test]
    fn test_fulltext_does_not_serve_equality() {
        let index = Index::fulltext("ft_cmd", "Process", vec!["command_line"]);
        assert!(!index.serves_equality("command_line"));
        assert!(Index::hash("h", "Process", "pid").serves_equality("pid"));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let mut catalog = IndexCatalog::new();
        let index = Index::range("idx_name", "User", "name");
        assert!(catalog.add_index(index.clone()));
        assert!(!catalog.add_index(index));
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_find_equality_index() {
        let catalog = IndexCatalog::new()
            .with_index(Index::range("idx_user_name", "User", "name"))
            .with_index(Index::range("idx_device_name", "Device", "name"))
            .with_index(Index::hash("idx_device_ip", "Device", "ip"));

        let found = catalog.find_equality_index(&["Device".to_string()], "name");
        assert_eq!(found.map(|i| i.name.as_str()), Some("idx_device_name"));

        let unlabeled = catalog.find_equality_index(&[], "name");
        assert_eq!(unlabeled.map(|i| i.name.as_str()), Some("idx_device_name"));

        assert!(catalog.find_equality_index(&["User".to_string()], "ip").is_none());
    }

    #[test]
    fn test_equality_lookup_prefers_unique_then_hash() {
        let labels = ["User".to_string()];
        let catalog = IndexCatalog::new()
            .with_index(Index::range("a_range", "User", "upn"))
            .with_index(Index::hash("b_hash", "User", "upn"));
        let found = catalog.find_equality_index(&labels, "upn");
        assert_eq!(found.map(|i| i.name.as_str()), Some("b_hash"));

        let catalog = catalog.with_index(Index::unique("c_unique", "User", "upn"));
        let found = catalog.find_equality_index(&labels, "upn");
        assert_eq!(found.map(|i| i.name.as_str()), Some("c_unique"));
    }
}
