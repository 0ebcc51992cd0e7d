//! Cost-based query optimizer
//!
//! The optimizer runs a single pass over an ordered list of rewrite rules.
//! Each rule sees the query produced by the rule before it; the plan is
//! rebuilt after every rewrite so each result carries the estimated time
//! saved by that rule alone.
//!
//! ```text
//! analyze -> plan -> estimate -> rule 1..N -> plan -> estimate -> report
//! ```

pub mod analysis;
pub mod cost;
pub mod plan;
pub mod rules;

pub use analysis::QueryAnalysis;
pub use cost::CostEstimate;
pub use plan::{PlanNode, QueryPlan};
pub use rules::{
    FilterPushdownRule, IndexHintRule, JoinOrderRule, OptimizationResult, OptimizationRule,
    PredicatePushdownRule, RuleKind, TimeRangeRule,
};

use std::fmt;

use crate::ast::Query;
use crate::config::OptimizerConfig;
use crate::printer::CypherPrinter;
use graphkql_core::{Error, Result};
use graphkql_schema::IndexCatalog;
use serde::Serialize;
use tracing::{debug, info};

/// Summary of one optimizer run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub original_cost: CostEstimate,
    pub optimized_cost: CostEstimate,
    /// Estimated time saved, in percent of the original
    pub reduction_percent: f64,
    /// Names of rules that rewrote the query or produced advice
    pub rules_applied: Vec<String>,
    /// One entry per rule that was run, in order
    pub results: Vec<OptimizationResult>,
    pub optimized_query: Query,
    /// The optimized query printed back as Cypher
    pub optimized_cypher: String,
}

impl OptimizationReport {
    /// Returns true if any rule rewrote the query
    pub fn is_rewritten(&self) -> bool {
        self.results.iter().any(|r| r.rewritten.is_some())
    }

    /// Advisory descriptions, such as index hints
    pub fn advice(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.applied && r.rewritten.is_none())
            .map(|r| r.description.as_str())
            .collect()
    }
}

/// Applies rewrite rules and reports the estimated effect
pub struct QueryOptimizer {
    config: OptimizerConfig,
    catalog: IndexCatalog,
    rules: Vec<Box<dyn OptimizationRule>>,
}

impl fmt::Debug for QueryOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("QueryOptimizer")
            .field("config", &self.config)
            .field("indexes", &self.catalog.len())
            .field("rules", &rules)
            .finish()
    }
}

impl Default for QueryOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl QueryOptimizer {
    /// Create an optimizer running `config.rules` with an empty index catalog
    pub fn new(config: OptimizerConfig) -> Self {
        let catalog = IndexCatalog::new();
        let rules = build_rules(&config, &catalog);
        Self {
            config,
            catalog,
            rules,
        }
    }

    /// Builder: supply the index catalog used for index hints
    pub fn with_index_catalog(mut self, catalog: IndexCatalog) -> Self {
        self.rules = build_rules(&self.config, &catalog);
        self.catalog = catalog;
        self
    }

    /// Builder: append a custom rule after the configured ones
    pub fn with_rule(mut self, rule: Box<dyn OptimizationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Rule names in the order they run
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Shape of a query as seen by the rules
    pub fn analyze(&self, query: &Query) -> QueryAnalysis {
        QueryAnalysis::of(query)
    }

    pub fn build_plan(&self, query: &Query) -> Result<QueryPlan> {
        QueryPlan::build(query)
    }

    /// Estimated cost of a query without rewriting it
    pub fn estimate(&self, query: &Query) -> Result<CostEstimate> {
        Ok(self.build_plan(query)?.total_cost(self.config.base_rows))
    }

    /// Run every applicable rule once, in order
    pub fn optimize(&self, query: &Query) -> Result<OptimizationReport> {
        let analysis = self.analyze(query);
        debug!(
            paths = analysis.paths,
            hops = analysis.hops,
            conjuncts = analysis.conjuncts,
            "analyzed query"
        );

        let original_cost = self.estimate(query)?;
        let mut current = query.clone();
        let mut current_cost = original_cost;
        let mut results = Vec::new();
        let mut rules_applied = Vec::new();

        for rule in &self.rules {
            if !rule.applies_to(&current) {
                debug!(rule = rule.name(), "rule does not apply");
                continue;
            }

            let mut result = rule.apply(&current).map_err(|e| Error::Optimization {
                rule: rule.name().to_string(),
                message: e.to_string(),
            })?;

            if let Some(rewritten) = &result.rewritten {
                let cost = self.estimate(rewritten)?;
                result.cost_reduction = current_cost.reduction_to(&cost);
                current = rewritten.clone();
                current_cost = cost;
            }
            if result.applied {
                debug!(rule = rule.name(), "{}", result.description);
                rules_applied.push(result.rule.clone());
            }
            results.push(result);
        }

        let reduction_percent = original_cost.reduction_to(&current_cost) * 100.0;
        info!(
            "Optimized query with {} rule(s): {:.1}% estimated reduction",
            rules_applied.len(),
            reduction_percent
        );

        Ok(OptimizationReport {
            original_cost,
            optimized_cost: current_cost,
            reduction_percent,
            rules_applied,
            results,
            optimized_cypher: CypherPrinter::print(&current),
            optimized_query: current,
        })
    }
}

fn build_rules(config: &OptimizerConfig, catalog: &IndexCatalog) -> Vec<Box<dyn OptimizationRule>> {
    config
        .rules
        .iter()
        .map(|kind| kind.build(config, catalog))
        .collect()
}
