//! Suggest catalog indexes for equality lookups

use super::{OptimizationResult, OptimizationRule};
use crate::ast::Query;
use crate::optimizer::analysis::equality_constraint;
use graphkql_core::Result;
use graphkql_schema::{Index, IndexCatalog};

const NAME: &str = "index_hint";

/// Reports indexes that serve equality filters, from WHERE or node property maps
///
/// Advisory only: the query is not rewritten and the plan estimate does
/// not change.
#[derive(Debug, Clone, Default)]
pub struct IndexHintRule {
    catalog: IndexCatalog,
}

/// An index matched to a `var.key` lookup
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHint<'a> {
    pub variable: String,
    pub key: String,
    pub index: &'a Index,
}

impl IndexHintRule {
    pub fn new(catalog: IndexCatalog) -> Self {
        Self { catalog }
    }

    /// Index candidates in pattern order, one per `var.key`
    pub fn hints(&self, query: &Query) -> Vec<IndexHint<'_>> {
        let mut lookups: Vec<(String, String)> = Vec::new();

        for node in query.paths().iter().flat_map(|p| p.nodes()) {
            let (Some(variable), Some(map)) = (&node.variable, &node.properties) else {
                continue;
            };
            for (key, _) in &map.entries {
                lookups.push((variable.clone(), key.clone()));
            }
        }
        if let Some(where_clause) = &query.where_clause {
            for conjunct in where_clause.predicate.conjuncts() {
                if let Some((property, _)) = equality_constraint(conjunct) {
                    lookups.push((property.variable.clone(), property.key.clone()));
                }
            }
        }

        let mut hints: Vec<IndexHint<'_>> = Vec::new();
        for (variable, key) in lookups {
            if hints.iter().any(|h| h.variable == variable && h.key == key) {
                continue;
            }
            let Some(node) = query.node_by_variable(&variable) else {
                continue;
            };
            if let Some(index) = self.catalog.find_equality_index(&node.labels, &key) {
                hints.push(IndexHint {
                    variable,
                    key,
                    index,
                });
            }
        }
        hints
    }
}

impl OptimizationRule for IndexHintRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn applies_to(&self, query: &Query) -> bool {
        !self.catalog.is_empty() && !self.hints(query).is_empty()
    }

    fn apply(&self, query: &Query) -> Result<OptimizationResult> {
        let hints = self.hints(query);
        if hints.is_empty() {
            return Ok(OptimizationResult::unchanged(NAME, "no indexed equality lookups"));
        }

        let advice = hints
            .iter()
            .map(|h| {
                format!(
                    "use index {} on {}({}) for {}.{}",
                    h.index.name, h.index.label, h.key, h.variable, h.key
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        Ok(OptimizationResult::advisory(NAME, advice))
    }
}
