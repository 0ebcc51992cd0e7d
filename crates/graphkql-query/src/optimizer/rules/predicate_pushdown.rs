//! Move `var.key = literal` filters into node property maps

use super::{OptimizationResult, OptimizationRule};
use crate::ast::{Expression, Literal, MatchClause, PathExpression, Query, WhereClause};
use crate::optimizer::analysis::equality_constraint;
use crate::visitor::PropertyCollector;
use graphkql_core::Result;

const NAME: &str = "predicate_pushdown";

/// Lifts top-level equality conjuncts on node properties into the pattern
///
/// Only literal values move; a null comparison never matches, so those stay
/// in WHERE. A constraint is attached to the first pattern occurrence of
/// its variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicatePushdownRule;

impl OptimizationRule for PredicatePushdownRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn applies_to(&self, query: &Query) -> bool {
        query
            .where_clause
            .as_ref()
            .is_some_and(|w| !PropertyCollector::collect(&w.predicate).is_empty())
    }

    fn apply(&self, query: &Query) -> Result<OptimizationResult> {
        let (Some(where_clause), Some(match_clause)) = (&query.where_clause, &query.match_clause)
        else {
            return Ok(OptimizationResult::unchanged(NAME, "nothing to push down"));
        };

        let mut paths = match_clause.paths.clone();
        let mut kept = Vec::new();
        let mut pushed = Vec::new();

        for conjunct in where_clause.predicate.conjuncts() {
            let target = equality_constraint(conjunct)
                .filter(|(_, literal)| !matches!(literal, Literal::Null | Literal::Timespan(_)))
                .and_then(|(property, literal)| {
                    locate(&paths, &property.variable, &property.key)
                        .map(|position| (position, property, literal))
                });

            match target {
                Some(((path_idx, node_idx), property, literal)) => {
                    let node = paths[path_idx].nodes()[node_idx]
                        .clone()
                        .property(&property.key, Expression::Literal(literal.clone()));
                    paths[path_idx] = paths[path_idx].with_node(node_idx, node)?;
                    pushed.push(format!("{}.{}", property.variable, property.key));
                }
                None => kept.push(conjunct.clone()),
            }
        }

        if pushed.is_empty() {
            return Ok(OptimizationResult::unchanged(
                NAME,
                "no equality predicates on node properties",
            ));
        }

        let rewritten = query
            .with_match(MatchClause {
                optional: match_clause.optional,
                paths,
            })
            .with_where(Expression::and_all(kept).map(WhereClause::new));
        Ok(OptimizationResult::rewritten(
            NAME,
            format!("pushed {} into the pattern", pushed.join(", ")),
            rewritten,
        ))
    }
}

/// First node bound to `variable` that does not already constrain `key`
fn locate(paths: &[PathExpression], variable: &str, key: &str) -> Option<(usize, usize)> {
    let (path_idx, node_idx) = paths.iter().enumerate().find_map(|(pi, path)| {
        path.nodes()
            .iter()
            .position(|n| n.variable.as_deref() == Some(variable))
            .map(|ni| (pi, ni))
    })?;

    let node = &paths[path_idx].nodes()[node_idx];
    let taken = node
        .properties
        .as_ref()
        .is_some_and(|m| m.entries.iter().any(|(k, _)| k == key));
    (!taken).then_some((path_idx, node_idx))
}
