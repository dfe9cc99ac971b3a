//! The tier verdict and its total order.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A correctness verdict.
///
/// Variants are declared lowest first so the derived `Ord` gives
/// `Excellent > Partial > Insufficient`. Every comparison between two
/// verdicts goes through this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Insufficient,
    Partial,
    Excellent,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Tier; 3] = [Tier::Insufficient, Tier::Partial, Tier::Excellent];

    /// Whether this tier counts as a correct answer.
    pub fn is_correct(self) -> bool {
        self == Tier::Excellent
    }

    /// Single-letter code used by the quiz front end.
    pub fn code(self) -> char {
        match self {
            Tier::Excellent => 'E',
            Tier::Partial => 'P',
            Tier::Insufficient => 'I',
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Excellent => write!(f, "excellent"),
            Tier::Partial => write!(f, "partial"),
            Tier::Insufficient => write!(f, "insufficient"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excellent" | "e" => Ok(Tier::Excellent),
            "partial" | "p" => Ok(Tier::Partial),
            "insufficient" | "i" => Ok(Tier::Insufficient),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// Accepts anything [`FromStr`] does: full names or letter codes, in any
/// case, with surrounding whitespace.
impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
