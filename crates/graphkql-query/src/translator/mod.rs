//! Cypher to KQL translation
//!
//! Each clause has its own [`ClauseTranslator`]; [`QueryTranslator`] runs
//! them in fixed order (pattern, filter, projection) and pipe-joins the
//! fragments:
//!
//! ```text
//! graph-match (n)-[r:KNOWS]->(m) | where n.age > 30 | project n, m | take 5
//! ```

pub mod complexity;
pub mod expression;
pub mod graph_match;
pub mod metrics;
pub mod preamble;
pub mod predicate;
pub mod projection;

use std::fmt;
use std::sync::Arc;

use crate::ast::Query;
use crate::config::TranslatorConfig;
use crate::optimizer::{OptimizationReport, QueryOptimizer};
use crate::parser::parse;
use graphkql_core::{Error, Result};
use graphkql_schema::SchemaProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use complexity::{summarize, Complexity, QuerySummary};
pub use graph_match::GraphMatchTranslator;
pub use metrics::{MetricsSnapshot, TranslationMetrics};
pub use predicate::PredicateTranslator;
pub use projection::ProjectionTranslator;

/// Converts one clause subtree into a target fragment
pub trait ClauseTranslator {
    /// Clause subtree handled by this translator
    type Clause;

    /// Clause name reported when translation fails
    const CLAUSE: &'static str;

    fn translate(&self, clause: &Self::Clause) -> Result<String>;
}

/// Run a clause translator, tagging any failure with the clause name
fn run_clause<T: ClauseTranslator>(translator: &T, clause: &T::Clause) -> Result<String> {
    translator
        .translate(clause)
        .map_err(|e| Error::clause_failed(T::CLAUSE, e))
}

/// How a translation was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// The query as written
    Direct,
    /// The query after optimizer rewrites
    Optimized,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Optimized => "optimized",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translated query text and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Target query text
    pub query: String,
    pub strategy: Strategy,
    /// Caller confidence, clamped to [0, 1]
    pub confidence: f64,
    pub complexity: Complexity,
    /// Estimated plan time, only set for optimized translations
    pub estimated_execution_time: Option<f64>,
}

/// Orchestrates clause translators into a full target query
///
/// Stateless apart from configuration, so one instance can be shared
/// across threads.
#[derive(Clone, Default)]
pub struct QueryTranslator {
    config: TranslatorConfig,
    schema: Option<Arc<dyn SchemaProvider>>,
}

impl fmt::Debug for QueryTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTranslator")
            .field("config", &self.config)
            .field("schema", &self.schema.is_some())
            .finish()
    }
}

impl QueryTranslator {
    /// Create a translator with the default configuration and no schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a translator with the given configuration
    pub fn with_config(config: TranslatorConfig) -> Self {
        Self {
            config,
            schema: None,
        }
    }

    /// Builder: attach a schema, enabling the make-graph preamble
    pub fn with_schema(mut self, schema: Arc<dyn SchemaProvider>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Structural summary and complexity band of a query
    pub fn summary(&self, query: &Query) -> QuerySummary {
        summarize(query)
    }

    /// Translate a parsed query
    pub fn translate(&self, query: &Query, confidence: f64) -> Result<TranslationResult> {
        let confidence = normalize_confidence(confidence)?;
        let text = self.render(query)?;
        let summary = summarize(query);

        debug!(
            complexity = %summary.complexity,
            score = summary.score,
            "translated query"
        );

        Ok(TranslationResult {
            query: text,
            strategy: Strategy::Direct,
            confidence,
            complexity: summary.complexity,
            estimated_execution_time: None,
        })
    }

    /// Parse and translate query text
    pub fn translate_str(&self, text: &str, confidence: f64) -> Result<TranslationResult> {
        let query = parse(text)?;
        self.translate(&query, confidence)
    }

    /// Optimize, then translate the rewritten query
    ///
    /// The complexity band is taken from the query as written; the
    /// execution estimate from the optimized plan.
    pub fn translate_optimized(
        &self,
        query: &Query,
        optimizer: &QueryOptimizer,
        confidence: f64,
    ) -> Result<(TranslationResult, OptimizationReport)> {
        let confidence = normalize_confidence(confidence)?;
        let report = optimizer.optimize(query)?;
        let text = self.render(&report.optimized_query)?;

        info!(
            "Optimized translation applied {} rule(s), {:.1}% estimated reduction",
            report.rules_applied.len(),
            report.reduction_percent
        );

        let result = TranslationResult {
            query: text,
            strategy: Strategy::Optimized,
            confidence,
            complexity: summarize(query).complexity,
            estimated_execution_time: Some(report.optimized_cost.time),
        };
        Ok((result, report))
    }

    /// View of this translator that records outcomes into `metrics`
    pub fn metered<'a>(&'a self, metrics: &'a TranslationMetrics) -> MeteredTranslator<'a> {
        MeteredTranslator {
            translator: self,
            metrics,
        }
    }

    /// Pattern, filter and projection fragments, preceded by the preamble
    fn render(&self, query: &Query) -> Result<String> {
        let match_clause = query
            .match_clause
            .as_ref()
            .ok_or_else(|| Error::translation("MATCH", "query has no MATCH clause"))?;
        let return_clause = query
            .return_clause
            .as_ref()
            .ok_or_else(|| Error::translation("RETURN", "query has no RETURN clause"))?;

        let mut fragments = vec![run_clause(&GraphMatchTranslator, match_clause)?];
        if let Some(where_clause) = &query.where_clause {
            fragments.push(run_clause(&PredicateTranslator, where_clause)?);
        }
        fragments.push(run_clause(&ProjectionTranslator, return_clause)?);
        let body = fragments.join(" | ");

        let header = match &self.schema {
            Some(schema) if self.config.emit_preamble => {
                preamble::build_preamble(query, schema.as_ref(), &self.config)?
            }
            _ => None,
        };

        Ok(match header {
            Some(header) => format!("{}\n| {}", header, body),
            None => body,
        })
    }
}

/// Translator view that counts successes and failures
#[derive(Debug, Clone, Copy)]
pub struct MeteredTranslator<'a> {
    translator: &'a QueryTranslator,
    metrics: &'a TranslationMetrics,
}

impl MeteredTranslator<'_> {
    pub fn translate(&self, query: &Query, confidence: f64) -> Result<TranslationResult> {
        self.record(self.translator.translate(query, confidence), false)
    }

    pub fn translate_str(&self, text: &str, confidence: f64) -> Result<TranslationResult> {
        self.record(self.translator.translate_str(text, confidence), false)
    }

    pub fn translate_optimized(
        &self,
        query: &Query,
        optimizer: &QueryOptimizer,
        confidence: f64,
    ) -> Result<(TranslationResult, OptimizationReport)> {
        self.record(
            self.translator.translate_optimized(query, optimizer, confidence),
            true,
        )
    }

    fn record<T>(&self, result: Result<T>, optimized: bool) -> Result<T> {
        match &result {
            Ok(_) => self.metrics.record_success(optimized),
            Err(e) => {
                warn!("Translation failed: {}", e);
                self.metrics.record_failure();
            }
        }
        result
    }
}

fn normalize_confidence(confidence: f64) -> Result<f64> {
    if confidence.is_nan() {
        return Err(Error::translation("query", "confidence must be a number"));
    }
    Ok(confidence.clamp(0.0, 1.0))
}
