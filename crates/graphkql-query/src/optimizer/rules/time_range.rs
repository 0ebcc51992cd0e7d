//! Bound unconstrained queries to a recent time window

use super::{OptimizationResult, OptimizationRule};
use crate::ast::{ComparisonOp, Expression, Literal, MatchClause, Query, WhereClause};
use crate::config::OptimizerConfig;
use crate::optimizer::analysis::references_column;
use graphkql_core::{Result, Timespan};
use std::collections::HashSet;

const NAME: &str = "time_range";

/// Adds `var.<time column> > ago(<lookback>)` when WHERE has no time constraint
///
/// Telemetry tables are append-only and very large; an unbounded query over
/// them is almost never what the caller wants.
#[derive(Debug, Clone)]
pub struct TimeRangeRule {
    time_columns: Vec<String>,
    time_column: String,
    lookback: Timespan,
}

impl TimeRangeRule {
    pub fn new(time_columns: Vec<String>, time_column: &str, lookback: Timespan) -> Self {
        Self {
            time_columns,
            time_column: time_column.to_string(),
            lookback,
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(
            config.time_columns.clone(),
            &config.time_column,
            config.default_lookback,
        )
    }

    fn is_time_column(&self, column: &str) -> bool {
        column.eq_ignore_ascii_case(&self.time_column)
            || self
                .time_columns
                .iter()
                .any(|c| c.eq_ignore_ascii_case(column))
    }
}

impl OptimizationRule for TimeRangeRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn applies_to(&self, query: &Query) -> bool {
        match &query.where_clause {
            Some(w) => !references_column(&w.predicate, |c| self.is_time_column(c)),
            None => true,
        }
    }

    fn apply(&self, query: &Query) -> Result<OptimizationResult> {
        if !self.applies_to(query) {
            return Ok(OptimizationResult::unchanged(
                NAME,
                "WHERE already constrains a time column",
            ));
        }

        let named = query
            .paths()
            .iter()
            .flat_map(|p| p.nodes())
            .find_map(|n| n.variable.clone());
        let (variable, query) = match named {
            Some(variable) => (variable, query.clone()),
            None => match bind_first_node(query)? {
                Some(bound) => bound,
                None => return Ok(OptimizationResult::unchanged(NAME, "no node to constrain")),
            },
        };
        let variable = variable.as_str();

        let window = Expression::compare(
            Expression::property(variable, &self.time_column),
            ComparisonOp::GreaterThan,
            Expression::function(
                "ago",
                vec![Expression::Literal(Literal::Timespan(self.lookback))],
            ),
        );

        let mut conjuncts: Vec<Expression> = query
            .where_clause
            .as_ref()
            .map(|w| w.predicate.conjuncts().into_iter().cloned().collect())
            .unwrap_or_default();
        conjuncts.push(window);

        let rewritten = query.with_where(Expression::and_all(conjuncts).map(WhereClause::new));
        Ok(OptimizationResult::rewritten(
            NAME,
            format!(
                "restricted {}.{} to the last {}",
                variable, self.time_column, self.lookback
            ),
            rewritten,
        ))
    }
}

/// Give the first node of an all-anonymous pattern a fresh variable
fn bind_first_node(query: &Query) -> Result<Option<(String, Query)>> {
    let Some(match_clause) = &query.match_clause else {
        return Ok(None);
    };
    let Some(first) = match_clause.paths.first() else {
        return Ok(None);
    };
    let Some(node) = first.nodes().first() else {
        return Ok(None);
    };

    let mut taken: HashSet<&str> = HashSet::new();
    for path in &match_clause.paths {
        taken.extend(path.relationships().iter().filter_map(|r| r.variable.as_deref()));
    }
    if let Some(ret) = &query.return_clause {
        taken.extend(ret.items.iter().filter_map(|i| i.alias.as_deref()));
    }
    let Some(variable) = (0..).map(|i| format!("t{i}")).find(|v| !taken.contains(v.as_str()))
    else {
        return Ok(None);
    };

    let mut node = node.clone();
    node.variable = Some(variable.clone());
    let mut paths = match_clause.paths.clone();
    paths[0] = first.with_node(0, node)?;
    let bound = query.with_match(MatchClause {
        optional: match_clause.optional,
        paths,
    });
    Ok(Some((variable, bound)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::printer::CypherPrinter;

    fn rule() -> TimeRangeRule {
        TimeRangeRule::from_config(&OptimizerConfig::default())
    }

    #[test]
    fn test_applies_unless_time_column_referenced() {
        let rule = rule();
        assert!(rule.applies_to(&parse("MATCH (n) RETURN n").unwrap()));
        assert!(rule.applies_to(&parse("MATCH (n) WHERE n.name = 'x' RETURN n").unwrap()));
        assert!(!rule.applies_to(&parse("MATCH (n) WHERE n.Timestamp > 5 RETURN n").unwrap()));
        assert!(!rule.applies_to(&parse("MATCH (n) WHERE n.timegenerated > 5 RETURN n").unwrap()));
        let nested = parse("MATCH (n) WHERE n.a = 1 OR size(n.EventTime) > 0 RETURN n").unwrap();
        assert!(!rule.applies_to(&nested));
    }

    #[test]
    fn test_injects_window() {
        let query = parse("MATCH (e:Event)-->(d) WHERE e.kind = 'logon' RETURN e").unwrap();
        let result = rule().apply(&query).unwrap();
        assert!(result.applied);
        assert_eq!(result.description, "restricted e.Timestamp to the last 1d");

        let rewritten = result.rewritten.unwrap();
        let text = CypherPrinter::print_expression(&rewritten.where_clause.unwrap().predicate);
        assert_eq!(text, "e.kind = 'logon' AND e.Timestamp > ago(duration('1d'))");
    }

    #[test]
    fn test_adds_where_when_missing() {
        let query = parse("MATCH (n) RETURN n").unwrap();
        let rule = TimeRangeRule::new(vec![], "TimeGenerated", Timespan::from_hours(12));
        let rewritten = rule.apply(&query).unwrap().rewritten.unwrap();
        assert_eq!(
            rewritten.where_clause.unwrap().predicate,
            Expression::compare(
                Expression::property("n", "TimeGenerated"),
                ComparisonOp::GreaterThan,
                Expression::function(
                    "ago",
                    vec![Expression::Literal(Literal::Timespan(Timespan::from_hours(12)))]
                ),
            )
        );
    }

    #[test]
    fn test_anonymous_pattern_gets_bound_variable() {
        let rule = rule();
        let query = parse("MATCH (:User)-[t0]->() RETURN 1").unwrap();
        assert!(rule.applies_to(&query));

        let result = rule.apply(&query).unwrap();
        assert!(result.applied);
        assert_eq!(result.description, "restricted t1.Timestamp to the last 1d");
        assert_eq!(
            CypherPrinter::print(&result.rewritten.unwrap()),
            "MATCH (t1:User)-[t0]->() WHERE t1.Timestamp > ago(duration('1d')) RETURN 1"
        );
    }
}
