//! Query complexity scoring

use std::convert::Infallible;
use std::fmt;
use std::ops::ControlFlow;

use crate::ast::{Expression, Query, RelationshipPattern, WhereClause};
use crate::visitor::{walk_expression, VisitResult, Visitor};
use serde::{Deserialize, Serialize};

/// Coarse complexity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Band for a score: 8 and above is high, 4 and above medium
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 8 => Complexity::High,
            s if s >= 4 => Complexity::Medium,
            _ => Complexity::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural facts about a query and the score derived from them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub hops: usize,
    pub variable_length: bool,
    /// Comparison and null-test nodes in WHERE
    pub conditions: usize,
    pub aggregation: bool,
    pub score: u32,
    pub complexity: Complexity,
}

/// Summarize a query
///
/// score = min(2 * hops, 6) + 3 * variable_length + min(conditions, 4) + 2 * aggregation
pub fn summarize(query: &Query) -> QuerySummary {
    let mut counter = ShapeCounter::default();
    let _ = counter.visit_query(query);

    let aggregation = query
        .return_clause
        .as_ref()
        .is_some_and(|r| r.has_aggregation());

    let score = (2 * counter.hops).min(6) as u32
        + if counter.variable_length { 3 } else { 0 }
        + counter.conditions.min(4) as u32
        + if aggregation { 2 } else { 0 };

    QuerySummary {
        hops: counter.hops,
        variable_length: counter.variable_length,
        conditions: counter.conditions,
        aggregation,
        score,
        complexity: Complexity::from_score(score),
    }
}

#[derive(Default)]
struct ShapeCounter {
    hops: usize,
    variable_length: bool,
    conditions: usize,
    in_where: bool,
}

impl Visitor for ShapeCounter {
    type Break = Infallible;

    fn visit_relationship_pattern(&mut self, rel: &RelationshipPattern) -> VisitResult<Infallible> {
        self.hops += 1;
        self.variable_length |= rel.is_variable_length();
        ControlFlow::Continue(())
    }

    fn visit_where_clause(&mut self, clause: &WhereClause) -> VisitResult<Infallible> {
        self.in_where = true;
        let flow = self.visit_expression(&clause.predicate);
        self.in_where = false;
        flow
    }

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Infallible> {
        if self.in_where
            && matches!(
                expression,
                Expression::Comparison { .. } | Expression::IsNull { .. }
            )
        {
            self.conditions += 1;
        }
        walk_expression(self, expression)
    }
}
