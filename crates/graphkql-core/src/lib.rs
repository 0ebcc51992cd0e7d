//! graphkql Core Library
//!
//! This crate provides the error taxonomy and the small set of value types
//! shared by the graphkql translator crates.
//!
//! # Modules
//!
//! - `error` - Error types and result aliases
//! - `types` - Relationship direction and lookback timespans

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Direction, Timespan};
