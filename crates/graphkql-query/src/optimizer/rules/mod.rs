//! Rewrite rules
//!
//! Each rule inspects a query and either rewrites it or explains why it
//! did not. Rules never mutate their input; a rewrite is returned as a new
//! `Query` in [`OptimizationResult::rewritten`].

mod filter_pushdown;
mod index_hint;
mod join_order;
mod predicate_pushdown;
mod time_range;

pub use filter_pushdown::FilterPushdownRule;
pub use index_hint::IndexHintRule;
pub use join_order::JoinOrderRule;
pub use predicate_pushdown::PredicatePushdownRule;
pub use time_range::TimeRangeRule;

use crate::ast::Query;
use crate::config::OptimizerConfig;
use graphkql_core::Result;
use graphkql_schema::IndexCatalog;
use serde::{Deserialize, Serialize};

/// A single optimization rule
pub trait OptimizationRule: Send + Sync {
    /// Stable rule name used in reports and errors
    fn name(&self) -> &'static str;

    /// Returns true if the rule has anything to consider in `query`
    fn applies_to(&self, query: &Query) -> bool;

    /// Run the rule
    fn apply(&self, query: &Query) -> Result<OptimizationResult>;
}

/// Outcome of running one rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Rule that produced this result
    pub rule: String,
    pub applied: bool,
    pub description: String,
    /// Fraction of estimated plan time saved, in [0, 1]
    pub cost_reduction: f64,
    /// Rewritten query, absent for advisory rules and no-ops
    pub rewritten: Option<Query>,
}

impl OptimizationResult {
    /// The rule rewrote the query
    pub fn rewritten(rule: &str, description: impl Into<String>, query: Query) -> Self {
        Self {
            rule: rule.to_string(),
            applied: true,
            description: description.into(),
            cost_reduction: 0.0,
            rewritten: Some(query),
        }
    }

    /// The rule produced advice without changing the query
    pub fn advisory(rule: &str, description: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            applied: true,
            description: description.into(),
            cost_reduction: 0.0,
            rewritten: None,
        }
    }

    /// The rule found nothing to do
    pub fn unchanged(rule: &str, description: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            applied: false,
            description: description.into(),
            cost_reduction: 0.0,
            rewritten: None,
        }
    }
}

/// Built-in rules, in default order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    FilterPushdown,
    JoinOrder,
    TimeRange,
    PredicatePushdown,
    IndexHint,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::FilterPushdown,
        RuleKind::JoinOrder,
        RuleKind::TimeRange,
        RuleKind::PredicatePushdown,
        RuleKind::IndexHint,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::FilterPushdown => "filter_pushdown",
            RuleKind::JoinOrder => "join_order",
            RuleKind::TimeRange => "time_range",
            RuleKind::PredicatePushdown => "predicate_pushdown",
            RuleKind::IndexHint => "index_hint",
        }
    }

    /// Instantiate the rule
    pub fn build(
        self,
        config: &OptimizerConfig,
        catalog: &IndexCatalog,
    ) -> Box<dyn OptimizationRule> {
        match self {
            RuleKind::FilterPushdown => Box::new(FilterPushdownRule),
            RuleKind::JoinOrder => Box::new(JoinOrderRule),
            RuleKind::TimeRange => Box::new(TimeRangeRule::from_config(config)),
            RuleKind::PredicatePushdown => Box::new(PredicatePushdownRule),
            RuleKind::IndexHint => Box::new(IndexHintRule::new(catalog.clone())),
        }
    }
}
