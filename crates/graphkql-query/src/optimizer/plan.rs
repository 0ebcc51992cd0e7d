//! Cost-annotated logical plans
//!
//! A plan mirrors the query shape: one `GraphMatch` per path (each owning
//! a `Scan` of its start node), `Join`s chaining the paths together, one
//! `Filter` per WHERE conjunct in source order, and `Project` or
//! `Aggregate` on top.

use super::analysis::{node_selectivity, predicate_selectivity};
use super::cost::CostEstimate;
use crate::ast::{Expression, PathExpression, Query};
use graphkql_core::{Error, Result};
use serde::Serialize;

/// Time units per row read or written
const ROW_TIME: f64 = 0.001;
/// Time units per edge traversed
const EDGE_TIME: f64 = 0.002;
/// Bytes held per materialized row
const ROW_BYTES: f64 = 128.0;
/// Fan-out per relationship hop
const HOP_FANOUT: f64 = 2.0;
/// Extra expansion for variable-length relationships
const VARIABLE_LENGTH_FACTOR: f64 = 5.0;
/// Fraction of the cross product a join keeps
const JOIN_SELECTIVITY: f64 = 0.1;
/// Fraction of rows left after grouping
const GROUPING_SELECTIVITY: f64 = 0.1;

/// Logical plan operator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanNode {
    /// Read the nodes matching a start pattern
    Scan {
        variable: Option<String>,
        labels: Vec<String>,
        selectivity: f64,
    },

    /// Expand a path from its scanned start node
    GraphMatch {
        scan: Box<PlanNode>,
        hops: usize,
        variable_length: bool,
        /// Combined selectivity of the non-start nodes
        end_selectivity: f64,
    },

    /// Keep rows satisfying one predicate
    Filter {
        input: Box<PlanNode>,
        predicate: Expression,
        selectivity: f64,
    },

    /// Combine two independent inputs
    Join {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
    },

    /// Compute RETURN items
    Project { input: Box<PlanNode>, items: usize },

    /// Group and aggregate RETURN items
    Aggregate {
        input: Box<PlanNode>,
        keys: usize,
        aggregates: usize,
    },
}

impl PlanNode {
    /// Scan and expansion for one path
    pub fn graph_match(path: &PathExpression) -> Self {
        let nodes = path.nodes();
        let start = &nodes[0];
        let end_selectivity = nodes[1..].iter().map(node_selectivity).product();

        PlanNode::GraphMatch {
            scan: Box::new(PlanNode::Scan {
                variable: start.variable.clone(),
                labels: start.labels.clone(),
                selectivity: node_selectivity(start),
            }),
            hops: path.hop_count(),
            variable_length: path.has_variable_length(),
            end_selectivity,
        }
    }

    /// Child operators, left to right
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::Scan { .. } => vec![],
            PlanNode::GraphMatch { scan, .. } => vec![scan.as_ref()],
            PlanNode::Filter { input, .. }
            | PlanNode::Project { input, .. }
            | PlanNode::Aggregate { input, .. } => vec![input.as_ref()],
            PlanNode::Join { left, right } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Cost of this operator alone
    ///
    /// `input_rows` is the base row count for a scan, the product of both
    /// inputs for a join, and the child's output otherwise.
    pub fn estimate_cost(&self, input_rows: f64) -> CostEstimate {
        match self {
            PlanNode::Scan { selectivity, .. } => {
                let rows = input_rows * selectivity;
                CostEstimate::new(rows, input_rows * ROW_TIME, rows * ROW_BYTES, *selectivity, 0.9)
            }
            PlanNode::GraphMatch {
                hops,
                variable_length,
                end_selectivity,
                ..
            } => {
                let fanout = HOP_FANOUT.powi(*hops as i32);
                let expansion = CostEstimate::new(
                    input_rows * fanout * end_selectivity,
                    input_rows * fanout * EDGE_TIME * *hops as f64,
                    input_rows * fanout * end_selectivity * ROW_BYTES,
                    *end_selectivity,
                    if *variable_length { 0.6 } else { 0.8 },
                );
                if *variable_length {
                    expansion * VARIABLE_LENGTH_FACTOR
                } else {
                    expansion
                }
            }
            PlanNode::Filter { selectivity, .. } => CostEstimate::new(
                input_rows * selectivity,
                input_rows * ROW_TIME,
                0.0,
                *selectivity,
                0.8,
            ),
            PlanNode::Join { .. } => {
                let rows = input_rows * JOIN_SELECTIVITY;
                CostEstimate::new(
                    rows,
                    input_rows * ROW_TIME,
                    rows * ROW_BYTES,
                    JOIN_SELECTIVITY,
                    0.7,
                )
            }
            PlanNode::Project { items, .. } => CostEstimate::new(
                input_rows,
                input_rows * ROW_TIME * (*items).max(1) as f64 * 0.1,
                input_rows * ROW_BYTES,
                1.0,
                1.0,
            ),
            PlanNode::Aggregate { keys, .. } => {
                let rows = if *keys == 0 {
                    1.0
                } else {
                    (input_rows * GROUPING_SELECTIVITY).max(1.0)
                };
                let selectivity = if input_rows > 0.0 { (rows / input_rows).min(1.0) } else { 1.0 };
                CostEstimate::new(rows, input_rows * ROW_TIME, rows * ROW_BYTES, selectivity, 0.9)
            }
        }
    }

    /// Short operator name
    pub fn name(&self) -> &'static str {
        match self {
            PlanNode::Scan { .. } => "Scan",
            PlanNode::GraphMatch { .. } => "GraphMatch",
            PlanNode::Filter { .. } => "Filter",
            PlanNode::Join { .. } => "Join",
            PlanNode::Project { .. } => "Project",
            PlanNode::Aggregate { .. } => "Aggregate",
        }
    }
}

/// A plan tree together with the query it was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub root: PlanNode,
    pub query: Query,
}

impl QueryPlan {
    /// Build the plan for a query
    ///
    /// Fails with a structural error when MATCH is missing. A missing
    /// RETURN leaves the match and filters as the root.
    pub fn build(query: &Query) -> Result<Self> {
        let match_clause = query.require_match()?;

        let mut paths = match_clause.paths.iter().map(PlanNode::graph_match);
        let first = paths
            .next()
            .ok_or_else(|| Error::Structural("MATCH clause has no paths".to_string()))?;
        let mut root = paths.fold(first, |left, right| PlanNode::Join {
            left: Box::new(left),
            right: Box::new(right),
        });

        if let Some(where_clause) = &query.where_clause {
            for conjunct in where_clause.predicate.conjuncts() {
                root = PlanNode::Filter {
                    input: Box::new(root),
                    predicate: conjunct.clone(),
                    selectivity: predicate_selectivity(conjunct),
                };
            }
        }

        if let Some(return_clause) = &query.return_clause {
            root = if return_clause.has_aggregation() {
                let aggregates = return_clause
                    .items
                    .iter()
                    .filter(|i| i.expression.contains_aggregate())
                    .count();
                PlanNode::Aggregate {
                    input: Box::new(root),
                    keys: return_clause.items.len() - aggregates,
                    aggregates,
                }
            } else {
                PlanNode::Project {
                    input: Box::new(root),
                    items: return_clause.items.len(),
                }
            };
        }

        Ok(Self {
            root,
            query: query.clone(),
        })
    }

    /// Cost of the whole tree, computed bottom-up from `base_rows`
    ///
    /// `rows` of the total is the largest intermediate result.
    pub fn total_cost(&self, base_rows: f64) -> CostEstimate {
        subtree_cost(&self.root, base_rows).0
    }

    /// Rows the root is expected to produce
    pub fn output_rows(&self, base_rows: f64) -> f64 {
        subtree_cost(&self.root, base_rows).1
    }

    /// Number of operators in the tree
    pub fn node_count(&self) -> usize {
        fn count(node: &PlanNode) -> usize {
            1 + node.children().into_iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}

/// Total cost of a subtree and the rows it outputs
fn subtree_cost(node: &PlanNode, base_rows: f64) -> (CostEstimate, f64) {
    match node {
        PlanNode::Scan { .. } => {
            let own = node.estimate_cost(base_rows);
            (own, own.rows)
        }
        PlanNode::Join { left, right } => {
            let (left_cost, left_rows) = subtree_cost(left, base_rows);
            let (right_cost, right_rows) = subtree_cost(right, base_rows);
            let own = node.estimate_cost(left_rows * right_rows);
            (left_cost + right_cost + own, own.rows)
        }
        PlanNode::GraphMatch { scan: child, .. }
        | PlanNode::Filter { input: child, .. }
        | PlanNode::Project { input: child, .. }
        | PlanNode::Aggregate { input: child, .. } => {
            let (child_cost, child_rows) = subtree_cost(child, base_rows);
            let own = node.estimate_cost(child_rows);
            (child_cost + own, own.rows)
        }
    }
}
