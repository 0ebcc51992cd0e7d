//! Start each path at its most selective end and order paths by selectivity

use super::{OptimizationResult, OptimizationRule};
use crate::ast::{MatchClause, PathExpression, Query};
use crate::optimizer::analysis::node_selectivity;
use graphkql_core::Result;

const NAME: &str = "join_order";

/// Reverses paths whose end node is more selective than their start, then
/// sorts paths so the most selective start is matched first
///
/// Reversal flips relationship directions, so the matched subgraph is the
/// same.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinOrderRule;

impl OptimizationRule for JoinOrderRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn applies_to(&self, query: &Query) -> bool {
        query.hop_count() > 1
    }

    fn apply(&self, query: &Query) -> Result<OptimizationResult> {
        let match_clause = query.require_match()?;

        let mut reversed = 0;
        let mut paths: Vec<PathExpression> = match_clause
            .paths
            .iter()
            .map(|path| {
                if end_selectivity(path) < start_selectivity(path) {
                    reversed += 1;
                    path.reversed()
                } else {
                    path.clone()
                }
            })
            .collect();

        let before = paths.clone();
        paths.sort_by(|a, b| start_selectivity(a).total_cmp(&start_selectivity(b)));
        let reordered = paths != before;

        if reversed == 0 && !reordered {
            return Ok(OptimizationResult::unchanged(
                NAME,
                "paths already start at their most selective node",
            ));
        }

        let mut description = format!("reversed {} path(s)", reversed);
        if reordered {
            description.push_str(", reordered paths by start selectivity");
        }

        let rewritten = query.with_match(MatchClause {
            optional: match_clause.optional,
            paths,
        });
        Ok(OptimizationResult::rewritten(NAME, description, rewritten))
    }
}

fn start_selectivity(path: &PathExpression) -> f64 {
    path.nodes().first().map(node_selectivity).unwrap_or(1.0)
}

fn end_selectivity(path: &PathExpression) -> f64 {
    path.nodes().last().map(node_selectivity).unwrap_or(1.0)
}
