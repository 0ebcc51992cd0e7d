//! Reorder WHERE conjuncts so cheap, selective filters run first

use super::{OptimizationResult, OptimizationRule};
use crate::ast::{Expression, Query, WhereClause};
use crate::optimizer::analysis::{predicate_selectivity, start_variables};
use crate::visitor::PropertyCollector;
use graphkql_core::Result;

const NAME: &str = "filter_pushdown";

/// Moves predicates on path start nodes, then the most selective ones, to the front
///
/// AND is commutative over the supported predicates, so reordering keeps
/// the result set unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPushdownRule;

impl OptimizationRule for FilterPushdownRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn applies_to(&self, query: &Query) -> bool {
        query.where_clause.is_some()
    }

    fn apply(&self, query: &Query) -> Result<OptimizationResult> {
        let Some(where_clause) = &query.where_clause else {
            return Ok(OptimizationResult::unchanged(NAME, "no WHERE clause"));
        };
        let conjuncts = where_clause.predicate.conjuncts();
        if conjuncts.len() < 2 {
            return Ok(OptimizationResult::unchanged(NAME, "single predicate"));
        }

        let sources = start_variables(query);
        let mut ranked: Vec<(usize, bool, f64)> = conjuncts
            .iter()
            .enumerate()
            .map(|(i, c)| (i, !on_sources(c, &sources), predicate_selectivity(c)))
            .collect();
        ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)));

        let moved = ranked.iter().enumerate().filter(|(pos, r)| *pos != r.0).count();
        if moved == 0 {
            return Ok(OptimizationResult::unchanged(NAME, "predicates already ordered"));
        }

        let reordered = ranked.iter().map(|r| conjuncts[r.0].clone()).collect();
        let rewritten = query.with_where(Expression::and_all(reordered).map(WhereClause::new));
        Ok(OptimizationResult::rewritten(
            NAME,
            format!("reordered {} of {} WHERE predicates", moved, conjuncts.len()),
            rewritten,
        ))
    }
}

/// Returns true if every property the predicate reads belongs to a path start node
fn on_sources(predicate: &Expression, sources: &[&str]) -> bool {
    PropertyCollector::collect(predicate)
        .iter()
        .all(|p| sources.contains(&p.variable.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::printer::CypherPrinter;

    fn rewrite(text: &str) -> OptimizationResult {
        FilterPushdownRule.apply(&parse(text).unwrap()).unwrap()
    }

    fn where_text(result: &OptimizationResult) -> String {
        let query = result.rewritten.as_ref().unwrap();
        CypherPrinter::print_expression(&query.where_clause.as_ref().unwrap().predicate)
    }

    #[test]
    fn test_applies_only_with_where() {
        assert!(FilterPushdownRule.applies_to(&parse("MATCH (n) WHERE n.a = 1 RETURN n").unwrap()));
        assert!(!FilterPushdownRule.applies_to(&parse("MATCH (n) RETURN n").unwrap()));
    }

    #[test]
    fn test_source_predicates_move_first() {
        let result = rewrite("MATCH (a)-->(b) WHERE b.x = 1 AND a.y > 2 RETURN a");
        assert!(result.applied);
        assert_eq!(where_text(&result), "a.y > 2 AND b.x = 1");
    }

    #[test]
    fn test_selective_predicates_move_first() {
        let result = rewrite("MATCH (n) WHERE n.a <> 1 AND n.b > 2 AND n.c = 3 RETURN n");
        assert_eq!(where_text(&result), "n.c = 3 AND n.b > 2 AND n.a <> 1");
        assert_eq!(result.description, "reordered 2 of 3 WHERE predicates");
    }

    #[test]
    fn test_ordered_predicates_are_left_alone() {
        let result = rewrite("MATCH (n) WHERE n.a = 1 AND n.b > 2 RETURN n");
        assert!(!result.applied);
        assert!(result.rewritten.is_none());

        assert!(!rewrite("MATCH (n) WHERE n.a > 1 RETURN n").applied);
    }

    #[test]
    fn test_disjunctions_stay_whole() {
        let result = rewrite("MATCH (n) WHERE (n.a > 1 OR n.b > 2) AND n.c = 3 RETURN n");
        assert_eq!(where_text(&result), "n.c = 3 AND (n.a > 1 OR n.b > 2)");
    }
}
