//! Error types for graphkql
//!
//! Every failure in the translation pipeline is one of four families:
//! syntax (malformed source text), structural (well-formed tokens, invalid
//! AST shape), translation (a clause cannot be rendered) and contract
//! violations (a value of the wrong kind reached a component). None of them
//! are retried internally.

use thiserror::Error;

/// The main error type for graphkql operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Syntax Errors ==========
    #[error("Syntax error at position {position} near '{token}': {message}")]
    Syntax {
        message: String,
        token: String,
        position: usize,
    },

    // ========== Structural Errors ==========
    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Invalid path length '{spec}': {reason}")]
    InvalidPathLength { spec: String, reason: String },

    // ========== Translation Errors ==========
    #[error("Translation error in {clause} clause: {message}")]
    Translation { clause: String, message: String },

    #[error("Failed to translate {clause} clause: {source}")]
    ClauseFailed {
        clause: String,
        #[source]
        source: Box<Error>,
    },

    // ========== Contract Violations ==========
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    // ========== Optimizer Errors ==========
    #[error("Optimization rule '{rule}' failed: {message}")]
    Optimization { rule: String, message: String },

    // ========== Configuration Errors ==========
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ========== Serialization Errors ==========
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for graphkql operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a syntax error pointing at a token
    pub fn syntax(message: impl Into<String>, token: impl Into<String>, position: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            token: token.into(),
            position,
        }
    }

    /// Build a translation error for a clause
    pub fn translation(clause: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Translation {
            clause: clause.into(),
            message: message.into(),
        }
    }

    /// Wrap an error raised while translating a clause
    pub fn clause_failed(clause: impl Into<String>, source: Error) -> Self {
        Error::ClauseFailed {
            clause: clause.into(),
            source: Box::new(source),
        }
    }

    /// Build a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns true if this error came from malformed source text
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    /// Returns true if this error indicates an invalid AST shape
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::Structural(_) | Error::InvalidPathLength { .. }
        )
    }

    /// Returns true if a clause could not be rendered
    pub fn is_translation(&self) -> bool {
        matches!(self, Error::Translation { .. } | Error::ClauseFailed { .. })
    }

    /// Returns true if a component received a value of the wrong kind
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// The innermost error, following `ClauseFailed` wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::ClauseFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
