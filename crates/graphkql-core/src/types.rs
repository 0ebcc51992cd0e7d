//! Shared value types
//!
//! Types that both the query crate and the schema crate need to agree on.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a relationship traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Outgoing relationship (->)
    Outgoing,
    /// Incoming relationship (<-)
    Incoming,
    /// Both directions (--)
    Both,
}

impl Direction {
    /// Returns the opposite direction
    pub fn reverse(self) -> Self {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
            Direction::Both => Direction::Both,
        }
    }

    /// The connector placed before the relationship bracket
    pub fn prefix(self) -> &'static str {
        match self {
            Direction::Incoming => "<-",
            Direction::Outgoing | Direction::Both => "-",
        }
    }

    /// The connector placed after the relationship bracket
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Outgoing => "->",
            Direction::Incoming | Direction::Both => "-",
        }
    }
}

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// A lookback window with whole-second precision
///
/// Written as `<n><unit>` with unit one of `d`, `h`, `m`, `s`, which is both
/// the configuration format and the target timespan literal syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timespan {
    seconds: u64,
}

impl Timespan {
    /// Create a timespan from seconds
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Create a timespan from hours
    pub const fn from_hours(hours: u64) -> Self {
        Self::from_secs(hours * SECS_PER_HOUR)
    }

    /// Create a timespan from days
    pub const fn from_days(days: u64) -> Self {
        Self::from_secs(days * SECS_PER_DAY)
    }

    /// Length in seconds
    pub fn as_secs(&self) -> u64 {
        self.seconds
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.seconds;
        if s != 0 && s % SECS_PER_DAY == 0 {
            write!(f, "{}d", s / SECS_PER_DAY)
        } else if s != 0 && s % SECS_PER_HOUR == 0 {
            write!(f, "{}h", s / SECS_PER_HOUR)
        } else if s != 0 && s % SECS_PER_MINUTE == 0 {
            write!(f, "{}m", s / SECS_PER_MINUTE)
        } else {
            write!(f, "{}s", s)
        }
    }
}

impl FromStr for Timespan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::Configuration(format!("invalid timespan '{}'", s));

        let unit = s.chars().last().ok_or_else(invalid)?;
        let multiplier = match unit {
            'd' => SECS_PER_DAY,
            'h' => SECS_PER_HOUR,
            'm' => SECS_PER_MINUTE,
            's' => 1,
            _ => return Err(invalid()),
        };

        let amount: u64 = s[..s.len() - 1].parse().map_err(|_| invalid())?;
        amount
            .checked_mul(multiplier)
            .map(Timespan::from_secs)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Timespan {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Timespan> for String {
    fn from(value: Timespan) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_direction_reverse() {
        assert_eq!(Direction::Outgoing.reverse(), Direction::Incoming);
        assert_eq!(Direction::Incoming.reverse(), Direction::Outgoing);
        assert_eq!(Direction::Both.reverse(), Direction::Both);
    }

    #[test]
    fn test_direction_connectors() {
        assert_eq!((Direction::Outgoing.prefix(), Direction::Outgoing.suffix()), ("-", "->"));
        assert_eq!((Direction::Incoming.prefix(), Direction::Incoming.suffix()), ("<-", "-"));
        assert_eq!((Direction::Both.prefix(), Direction::Both.suffix()), ("-", "-"));
    }

    #[test]
    fn test_timespan_display_picks_largest_unit() {
        assert_eq!(Timespan::from_days(1).to_string(), "1d");
        assert_eq!(Timespan::from_hours(36).to_string(), "36h");
        assert_eq!(Timespan::from_secs(90).to_string(), "90s");
        assert_eq!(Timespan::from_secs(120).to_string(), "2m");
        assert_eq!(Timespan::from_secs(0).to_string(), "0s");
    }

    #[test]
    fn test_timespan_parse() {
        assert_eq!("7d".parse::<Timespan>().unwrap(), Timespan::from_days(7));
        assert_eq!("12h".parse::<Timespan>().unwrap(), Timespan::from_hours(12));
        assert!("12".parse::<Timespan>().is_err());
        assert!("xd".parse::<Timespan>().is_err());
        assert!("".parse::<Timespan>().is_err());
    }

    #[test]
    fn test_timespan_serde() {
        let json = serde_json::to_string(&Timespan::from_days(2)).unwrap();
        assert_eq!(json, "\"2d\"");
        let back: Timespan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Timespan::from_days(2));
        assert!(serde_json::from_str::<Timespan>("\"2w\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_timespan_text_is_lossless(seconds in 0u64..10_000_000) {
            let span = Timespan::from_secs(seconds);
            prop_assert_eq!(span.to_string().parse::<Timespan>().unwrap(), span);
        }
    }
}
