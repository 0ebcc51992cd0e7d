//! Variable-length relationship bounds
//!
//! Source syntax is the text after `*` in a relationship bracket: `3`,
//! `1..3`, `2..`, `..4`, or nothing at all. Target syntax is the bracketed
//! range `[1..3]`, or the inline quantifier `*1..3` used inside an edge.

use graphkql_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive hop-count bounds of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPathLength")]
pub struct PathLength {
    min: Option<u32>,
    max: Option<u32>,
}

#[derive(Deserialize)]
struct RawPathLength {
    min: Option<u32>,
    max: Option<u32>,
}

impl TryFrom<RawPathLength> for PathLength {
    type Error = Error;

    fn try_from(raw: RawPathLength) -> Result<Self> {
        PathLength::new(raw.min, raw.max)
    }
}

impl PathLength {
    /// Create bounds, rejecting `min > max`
    pub fn new(min: Option<u32>, max: Option<u32>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::InvalidPathLength {
                    spec: format!("{}..{}", lo, hi),
                    reason: "minimum exceeds maximum".to_string(),
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Exactly `hops` hops
    pub fn exact(hops: u32) -> Self {
        Self {
            min: Some(hops),
            max: Some(hops),
        }
    }

    /// Any number of hops
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Parse the source form of a path length
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        let body = trimmed.strip_prefix('*').unwrap_or(trimmed).trim();

        if body.is_empty() {
            return Ok(Self::unbounded());
        }

        match body.split_once("..") {
            Some((lo, hi)) => {
                let min = parse_bound(spec, lo)?;
                let max = parse_bound(spec, hi)?;
                Self::new(min, max).map_err(|_| Error::InvalidPathLength {
                    spec: spec.to_string(),
                    reason: "descending bounds".to_string(),
                })
            }
            None => {
                let hops = parse_bound(spec, body)?.ok_or_else(|| Error::InvalidPathLength {
                    spec: spec.to_string(),
                    reason: "missing hop count".to_string(),
                })?;
                Ok(Self::exact(hops))
            }
        }
    }

    pub fn min(&self) -> Option<u32> {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Returns true unless both bounds are present and equal
    pub fn is_variable_length(&self) -> bool {
        self.min != self.max || self.min.is_none()
    }

    /// Returns true if neither bound is present
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns true for exactly one hop, which needs no quantifier
    pub fn is_single_hop(&self) -> bool {
        self.min == Some(1) && self.max == Some(1)
    }

    /// Range body without brackets or star: `1..3`, `5`, `..4`, `..`
    fn range_body(&self) -> String {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) if lo == hi => lo.to_string(),
            (Some(lo), Some(hi)) => format!("{}..{}", lo, hi),
            (Some(lo), None) => format!("{}..", lo),
            (None, Some(hi)) => format!("..{}", hi),
            (None, None) => "..".to_string(),
        }
    }

    /// Bracketed target form: `[1..3]`, `[5]`, `[..4]`, `[..]`
    pub fn to_target_syntax(&self) -> String {
        format!("[{}]", self.range_body())
    }

    /// Inline quantifier placed inside a graph-match edge: `*1..3`
    pub fn to_quantifier(&self) -> String {
        format!("*{}", self.range_body())
    }
}

impl fmt::Display for PathLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "*"),
            _ => write!(f, "*{}", self.range_body()),
        }
    }
}

fn parse_bound(spec: &str, text: &str) -> Result<Option<u32>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let value: i64 = text.parse().map_err(|_| Error::InvalidPathLength {
        spec: spec.to_string(),
        reason: format!("'{}' is not a number", text),
    })?;
    if value < 0 {
        return Err(Error::InvalidPathLength {
            spec: spec.to_string(),
            reason: "bounds must be non-negative".to_string(),
        });
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| Error::InvalidPathLength {
            spec: spec.to_string(),
            reason: format!("bound {} is too large", value),
        })
}
