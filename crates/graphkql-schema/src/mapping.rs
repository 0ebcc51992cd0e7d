//! Label-to-table mappings
//!
//! A `SchemaProvider` answers two questions for the translator: which table
//! backs a graph label, and which fields that table exposes. Both are used
//! only to build the make-graph preamble.

use crate::index::IndexCatalog;
use graphkql_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Maps one graph property to one table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Property name as written in the graph query
    pub property: String,

    /// Column name in the backing table
    pub field: String,
}

impl FieldMapping {
    pub fn new(property: &str, field: &str) -> Self {
        Self {
            property: property.to_string(),
            field: field.to_string(),
        }
    }
}

/// Identifier columns of well-known telemetry tables, used when no field
/// follows an identifier naming convention.
const DEFAULT_IDENTIFIER_FIELDS: &[(&str, &str)] = &[
    ("DeviceInfo", "DeviceId"),
    ("DeviceNetworkInfo", "DeviceId"),
    ("IdentityInfo", "AccountObjectId"),
    ("EmailEvents", "NetworkMessageId"),
    ("AlertInfo", "AlertId"),
];

/// Source of label-to-table mappings
pub trait SchemaProvider: Send + Sync {
    /// Table backing a node label or relationship type
    fn lookup_table(&self, label: &str) -> Option<String>;

    /// Field mappings for a label, in declaration order
    fn lookup_fields(&self, label: &str) -> Vec<FieldMapping>;

    /// Column that identifies a node of `label`
    ///
    /// Resolution order: a field following an identifier convention
    /// (`id`, `NodeId`, `<Label>Id`, `<Label>_id`), then the fixed per-table
    /// defaults, then the first declared field.
    fn identifier_field(&self, label: &str) -> Option<String> {
        let table = self.lookup_table(label)?;
        let fields = self.lookup_fields(label);

        let conventions = [
            "id".to_string(),
            "nodeid".to_string(),
            format!("{}id", label.to_lowercase()),
            format!("{}_id", label.to_lowercase()),
        ];
        if let Some(mapping) = fields.iter().find(|m| {
            let field = m.field.to_lowercase();
            conventions.contains(&field) || m.property.eq_ignore_ascii_case("id")
        }) {
            return Some(mapping.field.clone());
        }

        if let Some((_, field)) = DEFAULT_IDENTIFIER_FIELDS.iter().find(|(t, _)| *t == table) {
            debug!(label, table = %table, field, "using default identifier field");
            return Some((*field).to_string());
        }

        fields.first().map(|m| m.field.clone())
    }
}

/// Table and fields backing one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMapping {
    /// Backing table name
    pub table: String,

    /// Field mappings in declaration order
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
}

/// In-memory schema, typically loaded from a JSON document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticSchema {
    /// Mappings by label or relationship type
    #[serde(default)]
    pub labels: HashMap<String, TableMapping>,

    /// Indexes available to the optimizer
    #[serde(default)]
    pub indexes: IndexCatalog,
}

impl StaticSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: StaticSchema = serde_json::from_str(json)?;
        for (label, mapping) in &schema.labels {
            if mapping.table.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "label '{}' maps to an empty table name",
                    label
                )));
            }
        }
        Ok(schema)
    }

    /// Builder: map a label to a table
    pub fn with_table(mut self, label: &str, table: &str, fields: Vec<FieldMapping>) -> Self {
        self.labels.insert(
            label.to_string(),
            TableMapping {
                table: table.to_string(),
                fields,
            },
        );
        self
    }

    /// Builder: attach an index catalog
    pub fn with_indexes(mut self, indexes: IndexCatalog) -> Self {
        self.indexes = indexes;
        self
    }

    /// Index catalog bundled with this schema
    pub fn index_catalog(&self) -> &IndexCatalog {
        &self.indexes
    }
}

impl SchemaProvider for StaticSchema {
    fn lookup_table(&self, label: &str) -> Option<String> {
        self.labels.get(label).map(|m| m.table.clone())
    }

    fn lookup_fields(&self, label: &str) -> Vec<FieldMapping> {
        self.labels
            .get(label)
            .map(|m| m.fields.clone())
            .unwrap_or_default()
    }
}
