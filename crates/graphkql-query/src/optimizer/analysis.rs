//! Query facts the cost model and rewrite rules share

use crate::ast::{ComparisonOp, Expression, Literal, NodePattern, Property, Query};
use crate::visitor::PropertyCollector;
use serde::Serialize;

/// Selectivity applied to a node with at least one label
pub const LABEL_SELECTIVITY: f64 = 0.3;
/// Selectivity applied to a node with property constraints
pub const PROPERTY_SELECTIVITY: f64 = 0.1;
/// Selectivity of an equality comparison
pub const EQUALITY_SELECTIVITY: f64 = 0.1;
/// Selectivity of `<`, `<=`, `>`, `>=`
pub const RANGE_SELECTIVITY: f64 = 0.5;
/// Selectivity of `<>`
pub const INEQUALITY_SELECTIVITY: f64 = 0.9;
/// Selectivity of anything else
pub const DEFAULT_SELECTIVITY: f64 = 0.5;

/// Fraction of all nodes a node pattern is expected to match
pub fn node_selectivity(node: &NodePattern) -> f64 {
    let mut selectivity = 1.0;
    if !node.labels.is_empty() {
        selectivity *= LABEL_SELECTIVITY;
    }
    if node.has_properties() {
        selectivity *= PROPERTY_SELECTIVITY;
    }
    selectivity
}

/// Fraction of rows a filter predicate keeps
pub fn predicate_selectivity(predicate: &Expression) -> f64 {
    match predicate {
        Expression::Comparison { op, .. } => match op {
            ComparisonOp::Equals => EQUALITY_SELECTIVITY,
            ComparisonOp::NotEquals => INEQUALITY_SELECTIVITY,
            op if op.is_range() => RANGE_SELECTIVITY,
            _ => DEFAULT_SELECTIVITY,
        },
        _ => DEFAULT_SELECTIVITY,
    }
}

/// `var.key = literal` in either operand order
pub fn equality_constraint(expression: &Expression) -> Option<(&Property, &Literal)> {
    let Expression::Comparison {
        left,
        op: ComparisonOp::Equals,
        right,
    } = expression
    else {
        return None;
    };
    match (left.as_ref(), right.as_ref()) {
        (Expression::Property(p), Expression::Literal(l))
        | (Expression::Literal(l), Expression::Property(p)) => Some((p, l)),
        _ => None,
    }
}

/// Returns true if `expression` reads a property whose key satisfies `is_time_column`
pub fn references_column(expression: &Expression, is_time_column: impl Fn(&str) -> bool) -> bool {
    PropertyCollector::collect(expression)
        .iter()
        .any(|p| is_time_column(&p.key))
}

/// Variables bound to the first node of each path
pub fn start_variables(query: &Query) -> Vec<&str> {
    query
        .paths()
        .iter()
        .filter_map(|p| p.nodes().first())
        .filter_map(|n| n.variable.as_deref())
        .collect()
}

/// Shape of a query as seen by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnalysis {
    pub paths: usize,
    pub hops: usize,
    pub variable_length: bool,
    /// Top-level WHERE conjuncts
    pub conjuncts: usize,
    /// Conjuncts of the form `var.key = literal`
    pub equality_filters: usize,
    pub aggregation: bool,
}

impl QueryAnalysis {
    pub fn of(query: &Query) -> Self {
        let conjuncts = query
            .where_clause
            .as_ref()
            .map(|w| w.predicate.conjuncts())
            .unwrap_or_default();

        Self {
            paths: query.paths().len(),
            hops: query.hop_count(),
            variable_length: query.paths().iter().any(|p| p.has_variable_length()),
            conjuncts: conjuncts.len(),
            equality_filters: conjuncts
                .iter()
                .filter(|c| equality_constraint(c).is_some())
                .count(),
            aggregation: query
                .return_clause
                .as_ref()
                .is_some_and(|r| r.has_aggregation()),
        }
    }
}
