//! graphkql - Cypher to KQL graph query translation
//!
//! This is the main library crate that re-exports all graphkql components.

pub use graphkql_core as core;
pub use graphkql_query as query;
pub use graphkql_schema as schema;

// Re-export commonly used types
pub use graphkql_core::{Direction, Error, Result, Timespan};

pub use graphkql_query::{
    parse, CypherPrinter, OptimizationReport, OptimizerConfig, PathLength, Query, QueryOptimizer,
    QueryTranslator, Strategy, TranslationMetrics, TranslationResult, TranslatorConfig,
};
pub use graphkql_schema::{Index, IndexCatalog, SchemaProvider, StaticSchema};

/// Parse and translate Cypher text with the default configuration
pub fn translate(cypher: &str) -> Result<String> {
    QueryTranslator::new()
        .translate_str(cypher, 1.0)
        .map(|result| result.query)
}
