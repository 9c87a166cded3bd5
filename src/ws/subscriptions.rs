//! Kline stream identities — naming and tracking.

use crate::shared::{Resolution, Symbol};
use serde::{Deserialize, Serialize};

/// Default UTC offset suffix for kline stream names.
pub const DEFAULT_UTC_OFFSET: &str = "+08:00";

/// One kline stream: symbol + resolution + candle UTC offset.
///
/// The wire name is `<symbol>@kline_<resolution>@<offset>`, e.g.
/// `btcusdt@kline_1m@+08:00`. Equality is by wire name, so a subscribe can
/// be matched against a later unsubscribe.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct KlineStream {
    pub symbol: Symbol,
    pub resolution: Resolution,
    pub utc_offset: String,
}

impl KlineStream {
    pub fn new(symbol: Symbol, resolution: Resolution) -> Self {
        Self {
            symbol,
            resolution,
            utc_offset: DEFAULT_UTC_OFFSET.to_string(),
        }
    }

    pub fn with_offset(symbol: Symbol, resolution: Resolution, utc_offset: &str) -> Self {
        Self {
            symbol,
            resolution,
            utc_offset: utc_offset.to_string(),
        }
    }

    /// Same stream, different resolution. Used when the selection changes.
    pub fn at_resolution(&self, resolution: Resolution) -> Self {
        Self {
            symbol: self.symbol.clone(),
            resolution,
            utc_offset: self.utc_offset.clone(),
        }
    }

    /// The wire stream name.
    pub fn stream_name(&self) -> String {
        format!(
            "{}@kline_{}@{}",
            self.symbol.to_stream_symbol(),
            self.resolution.as_str(),
            self.utc_offset
        )
    }
}

impl std::fmt::Display for KlineStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stream_name())
    }
}
