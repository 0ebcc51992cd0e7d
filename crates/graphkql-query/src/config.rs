//! Translator and optimizer configuration

use crate::optimizer::rules::RuleKind;
use graphkql_core::{Error, Result, Timespan};
use serde::{Deserialize, Serialize};

/// Time columns recognized by the time-range rule
pub const DEFAULT_TIME_COLUMNS: &[&str] = &[
    "Timestamp",
    "TimeGenerated",
    "timestamp",
    "time",
    "EventTime",
    "created_at",
];

/// Translator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Confidence reported when the caller has no better value
    pub default_confidence: f64,

    /// Edge table used when no relationship type maps to a table
    pub edge_table: String,

    /// Edge column holding the source node identifier
    pub source_field: String,

    /// Edge column holding the target node identifier
    pub target_field: String,

    /// Emit the make-graph preamble when a schema is attached
    pub emit_preamble: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_confidence: 0.9,
            edge_table: "Edges".to_string(),
            source_field: "SourceId".to_string(),
            target_field: "TargetId".to_string(),
            emit_preamble: true,
        }
    }
}

impl TranslatorConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never emits a preamble, for bare pattern output
    pub fn pattern_only() -> Self {
        Self {
            emit_preamble: false,
            ..Default::default()
        }
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid translator config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(Error::Configuration(format!(
                "default_confidence must be within [0, 1], got {}",
                self.default_confidence
            )));
        }
        for (name, value) in [
            ("edge_table", &self.edge_table),
            ("source_field", &self.source_field),
            ("target_field", &self.target_field),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// Builder: set the fallback edge table
    pub fn edge_table(mut self, table: &str) -> Self {
        self.edge_table = table.to_string();
        self
    }

    /// Builder: set the edge endpoint columns
    pub fn endpoints(mut self, source: &str, target: &str) -> Self {
        self.source_field = source.to_string();
        self.target_field = target.to_string();
        self
    }

    /// Builder: set the default confidence
    pub fn default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = confidence;
        self
    }

    /// Builder: disable the preamble
    pub fn without_preamble(mut self) -> Self {
        self.emit_preamble = false;
        self
    }
}

/// Optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Column names that count as a time constraint when referenced in WHERE
    pub time_columns: Vec<String>,

    /// Column constrained by an injected time range
    pub time_column: String,

    /// Lookback window of an injected time range
    pub default_lookback: Timespan,

    /// Rows assumed for an unconstrained scan
    pub base_rows: f64,

    /// Rules to run, in order
    pub rules: Vec<RuleKind>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            time_columns: DEFAULT_TIME_COLUMNS.iter().map(|c| c.to_string()).collect(),
            time_column: "Timestamp".to_string(),
            default_lookback: Timespan::from_days(1),
            base_rows: 10_000.0,
            rules: RuleKind::ALL.to_vec(),
        }
    }
}

impl OptimizerConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Only rules that keep the result set unchanged
    ///
    /// Time-range injection narrows results to the lookback window, so it
    /// is left out.
    pub fn preserving() -> Self {
        Self {
            rules: vec![
                RuleKind::FilterPushdown,
                RuleKind::JoinOrder,
                RuleKind::PredicatePushdown,
                RuleKind::IndexHint,
            ],
            ..Default::default()
        }
    }

    /// No rules at all: the report only carries the plan estimate
    pub fn estimate_only() -> Self {
        Self {
            rules: Vec::new(),
            ..Default::default()
        }
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid optimizer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if !self.base_rows.is_finite() || self.base_rows <= 0.0 {
            return Err(Error::Configuration(format!(
                "base_rows must be a positive number, got {}",
                self.base_rows
            )));
        }
        if self.time_column.trim().is_empty() {
            return Err(Error::Configuration("time_column must not be empty".to_string()));
        }
        for (i, rule) in self.rules.iter().enumerate() {
            if self.rules[..i].contains(rule) {
                return Err(Error::Configuration(format!(
                    "rule '{}' is listed more than once",
                    rule.name()
                )));
            }
        }
        Ok(())
    }

    /// Returns true if `column` is a recognized time column
    pub fn is_time_column(&self, column: &str) -> bool {
        self.time_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column))
    }

    /// Builder: set the rule order
    pub fn rules(mut self, rules: Vec<RuleKind>) -> Self {
        self.rules = rules;
        self
    }

    /// Builder: set the injected time column
    pub fn time_column(mut self, column: &str) -> Self {
        self.time_column = column.to_string();
        if !self.is_time_column(column) {
            self.time_columns.push(column.to_string());
        }
        self
    }

    /// Builder: set the injected lookback window
    pub fn lookback(mut self, lookback: Timespan) -> Self {
        self.default_lookback = lookback;
        self
    }

    /// Builder: set the base row count
    pub fn base_rows(mut self, rows: f64) -> Self {
        self.base_rows = rows;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_translator_config() {
        let config = TranslatorConfig::default();
        assert_eq!(config.edge_table, "Edges");
        assert_eq!(config.source_field, "SourceId");
        assert_eq!(config.target_field, "TargetId");
        assert!(config.emit_preamble);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_translator_builder() {
        let config = TranslatorConfig::new()
            .edge_table("GraphEdges")
            .endpoints("From", "To")
            .default_confidence(0.5)
            .without_preamble();
        assert_eq!(config.edge_table, "GraphEdges");
        assert_eq!(config.source_field, "From");
        assert!(!config.emit_preamble);
        assert!(!TranslatorConfig::pattern_only().emit_preamble);
    }

    #[test]
    fn test_translator_from_json() {
        let config = TranslatorConfig::from_json(r#"{"edge_table": "Links"}"#).unwrap();
        assert_eq!(config.edge_table, "Links");
        assert_eq!(config.source_field, "SourceId");

        let err = TranslatorConfig::from_json(r#"{"default_confidence": 1.5}"#).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        let err = TranslatorConfig::from_json(r#"{"edge_table": " "}"#).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(TranslatorConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_default_optimizer_config() {
        let config = OptimizerConfig::default();
        assert_eq!(config.rules, RuleKind::ALL.to_vec());
        assert_eq!(config.default_lookback, Timespan::from_days(1));
        assert!(config.is_time_column("TIMESTAMP"));
        assert!(config.is_time_column("timegenerated"));
        assert!(!config.is_time_column("name"));
    }

    #[test]
    fn test_optimizer_presets() {
        assert!(!OptimizerConfig::preserving()
            .rules
            .contains(&RuleKind::TimeRange));
        assert!(OptimizerConfig::estimate_only().rules.is_empty());
    }

    #[test]
    fn test_optimizer_builder() {
        let config = OptimizerConfig::new()
            .time_column("LogTime")
            .lookback(Timespan::from_hours(6))
            .base_rows(500.0)
            .rules(vec![RuleKind::TimeRange]);
        assert!(config.is_time_column("logtime"));
        assert_eq!(config.default_lookback.to_string(), "6h");
        assert_eq!(config.rules, vec![RuleKind::TimeRange]);
    }

    #[test]
    fn test_optimizer_from_json() {
        let config = OptimizerConfig::from_json(
            r#"{"default_lookback": "7d", "rules": ["join_order", "index_hint"]}"#,
        )
        .unwrap();
        assert_eq!(config.default_lookback, Timespan::from_days(7));
        assert_eq!(config.rules, vec![RuleKind::JoinOrder, RuleKind::IndexHint]);

        assert!(OptimizerConfig::from_json(r#"{"base_rows": 0}"#).is_err());
        assert!(OptimizerConfig::from_json(r#"{"rules": ["time_range", "time_range"]}"#).is_err());
        assert!(OptimizerConfig::from_json(r#"{"rules": ["no_such_rule"]}"#).is_err());
        assert!(OptimizerConfig::from_json(r#"{"default_lookback": "soon"}"#).is_err());
    }
}
