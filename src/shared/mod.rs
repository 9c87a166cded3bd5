//! Shared newtypes used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw format the exchange sends, so they can be used
//! directly in wire types without conversion overhead.

pub mod throttle;

pub use throttle::{Throttle, ThrottleOptions};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── Symbol ──────────────────────────────────────────────────────────────────

/// Newtype for exchange trading symbols (e.g. `"BTCUSDT"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used in stream names (`btcusdt@kline_1m`).
    pub fn to_stream_symbol(&self) -> String {
        self.0.to_lowercase()
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self("BTCUSDT".to_string())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Symbol(s.to_string()))
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol(s))
    }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Kline candle resolution — the full ladder from 1 second to 1 month.
///
/// Totally ordered by [`Resolution::score`]; variants are declared in score
/// order so the derived `Ord` agrees with it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Resolution {
    #[serde(rename = "1s")]
    Sec1,
    #[default]
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "3m")]
    Min3,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sec1 => "1s",
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Day3 => "3d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }

    /// Display label — identical to the wire form.
    pub fn label(&self) -> &'static str {
        self.as_str()
    }

    /// Position in the display ordering (0 = 1s .. 15 = 1M).
    pub fn score(&self) -> u8 {
        *self as u8
    }

    /// Duration of one candle in seconds. A month counts as 30 days.
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Sec1 => 1,
            Self::Min1 => 60,
            Self::Min3 => 180,
            Self::Min5 => 300,
            Self::Min15 => 900,
            Self::Min30 => 1800,
            Self::Hour1 => 3600,
            Self::Hour2 => 7200,
            Self::Hour4 => 14400,
            Self::Hour6 => 21600,
            Self::Hour8 => 28800,
            Self::Hour12 => 43200,
            Self::Day1 => 86400,
            Self::Day3 => 259200,
            Self::Week1 => 604800,
            Self::Month1 => 2592000,
        }
    }

    /// Every resolution, in score order.
    pub fn all() -> &'static [Resolution] {
        &[
            Self::Sec1,
            Self::Min1,
            Self::Min3,
            Self::Min5,
            Self::Min15,
            Self::Min30,
            Self::Hour1,
            Self::Hour2,
            Self::Hour4,
            Self::Hour6,
            Self::Hour8,
            Self::Hour12,
            Self::Day1,
            Self::Day3,
            Self::Week1,
            Self::Month1,
        ]
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_stream_form() {
        let s = Symbol::new("BTCUSDT");
        assert_eq!(s.as_str(), "BTCUSDT");
        assert_eq!(s.to_stream_symbol(), "btcusdt");
    }

    #[test]
    fn test_symbol_serde() {
        let s = Symbol::from("ETHUSDT");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"ETHUSDT\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn test_resolution_serde() {
        let r: Resolution = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(r, Resolution::Hour1);
        assert_eq!(r.seconds(), 3600);
        let month: Resolution = serde_json::from_str("\"1M\"").unwrap();
        assert_eq!(month, Resolution::Month1);
    }

    #[test]
    fn test_resolution_universe_is_complete() {
        assert_eq!(Resolution::all().len(), 16);
        for (i, r) in Resolution::all().iter().enumerate() {
            assert_eq!(r.score() as usize, i);
        }
    }

    #[test]
    fn test_resolution_ord_agrees_with_score() {
        let mut shuffled = vec![
            Resolution::Day1,
            Resolution::Sec1,
            Resolution::Hour4,
            Resolution::Min1,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                Resolution::Sec1,
                Resolution::Min1,
                Resolution::Hour4,
                Resolution::Day1,
            ]
        );
    }

    #[test]
    fn test_resolution_default_is_one_minute() {
        assert_eq!(Resolution::default(), Resolution::Min1);
    }
}
