//! Schema-bound `make-graph` preamble

use crate::ast::Query;
use crate::config::TranslatorConfig;
use graphkql_core::{Error, Result};
use graphkql_schema::SchemaProvider;
use tracing::debug;

/// Build the preamble binding pattern labels to their tables
///
/// Returns `None` when no label in the pattern maps to a table. The edge
/// table is the one mapped to the first relationship type that has a
/// mapping, falling back to the configured edge table.
pub fn build_preamble(
    query: &Query,
    schema: &dyn SchemaProvider,
    config: &TranslatorConfig,
) -> Result<Option<String>> {
    let mut bindings: Vec<(String, String)> = Vec::new();

    for label in query
        .paths()
        .iter()
        .flat_map(|p| p.nodes())
        .flat_map(|n| n.labels.iter())
    {
        let Some(table) = schema.lookup_table(label) else {
            debug!(label = %label, "label has no table mapping");
            continue;
        };
        if bindings.iter().any(|(t, _)| *t == table) {
            continue;
        }
        let id = schema.identifier_field(label).ok_or_else(|| {
            Error::translation(
                "MATCH",
                format!("no identifier field for label '{}' (table {})", label, table),
            )
        })?;
        bindings.push((table, id));
    }

    if bindings.is_empty() {
        return Ok(None);
    }

    let edge_table = query
        .paths()
        .iter()
        .flat_map(|p| p.relationships())
        .flat_map(|r| r.rel_types.iter())
        .find_map(|t| schema.lookup_table(t))
        .unwrap_or_else(|| config.edge_table.clone());

    let with = bindings
        .iter()
        .map(|(table, id)| format!("{} on {}", table, id))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Some(format!(
        "{}\n| make-graph {} --> {} with {}",
        edge_table, config.source_field, config.target_field, with
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use graphkql_schema::{FieldMapping, StaticSchema};

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .with_table(
                "User",
                "IdentityInfo",
                vec![
                    FieldMapping::new("name", "AccountName"),
                    FieldMapping::new("id", "AccountObjectId"),
                ],
            )
            .with_table("Device", "DeviceInfo", vec![FieldMapping::new("name", "DeviceName")])
            .with_table("LOGGED_ON", "DeviceLogonEvents", vec![])
            .with_table("Ghost", "GhostTable", vec![])
    }

    #[test]
    fn test_preamble_binds_tables() {
        let query = parse("MATCH (u:User)-[:LOGGED_ON]->(d:Device) RETURN u").unwrap();
        let text = build_preamble(&query, &schema(), &TranslatorConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            text,
            concat!(
                "DeviceLogonEvents\n| make-graph SourceId --> TargetId ",
                "with IdentityInfo on AccountObjectId, DeviceInfo on DeviceId"
            )
        );
    }

    #[test]
    fn test_fallback_edge_table() {
        let query = parse("MATCH (u:User)-->(x:User) RETURN u").unwrap();
        let config = TranslatorConfig::default().edge_table("Links").endpoints("From", "To");
        let text = build_preamble(&query, &schema(), &config).unwrap().unwrap();
        assert_eq!(text, "Links\n| make-graph From --> To with IdentityInfo on AccountObjectId");
    }

    #[test]
    fn test_unmapped_labels_give_no_preamble() {
        let query = parse("MATCH (n:Person) RETURN n").unwrap();
        assert!(build_preamble(&query, &schema(), &TranslatorConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_identifier_fails() {
        let query = parse("MATCH (g:Ghost) RETURN g").unwrap();
        let err = build_preamble(&query, &schema(), &TranslatorConfig::default()).unwrap_err();
        assert!(err.is_translation());
    }
}
