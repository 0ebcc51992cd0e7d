//! graphkql Query Engine
//!
//! Translates Cypher graph queries into KQL `graph-match` pipelines.
//!
//! # Overview
//!
//! The query engine implements:
//! - A Cypher lexer and recursive-descent parser for the MATCH/WHERE/RETURN subset
//! - An immutable AST with a visitor and a Cypher printer
//! - Variable-length path algebra
//! - Per-clause KQL translators with an optional schema-bound preamble
//! - A cost-based optimizer with rewrite rules and plan estimates

pub mod ast;
pub mod config;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod path_length;
pub mod printer;
pub mod translator;
pub mod visitor;

pub use ast::{
    ComparisonOp, Expression, Literal, LogicalOp, MatchClause, NodePattern, PathExpression,
    Property, Query, RelationshipPattern, ReturnClause, ReturnItem, WhereClause,
};
pub use config::{OptimizerConfig, TranslatorConfig};
pub use lexer::{tokenize, SpannedToken, Token};
pub use optimizer::{
    CostEstimate, OptimizationReport, OptimizationResult, OptimizationRule, QueryOptimizer,
    QueryPlan, RuleKind,
};
pub use parser::parse;
pub use path_length::PathLength;
pub use printer::CypherPrinter;
pub use translator::{
    Complexity, MetricsSnapshot, QueryTranslator, Strategy, TranslationMetrics, TranslationResult,
};
pub use visitor::{PropertyCollector, Visitor};

// Type alias for lexer (uses logos::Lexer)
pub type CypherLexer<'a> = logos::Lexer<'a, Token>;

// Convenience function alias
pub use parse as parse_cypher;
