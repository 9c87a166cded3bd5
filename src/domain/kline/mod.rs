//! Kline domain — candles, series state, history fetching.

#[cfg(feature = "http")]
pub mod client;
pub mod convert;
pub mod state;
pub mod wire;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{CandleSeries, FetchToken, HistoryState};

/// One OHLCV bucket for a time interval.
///
/// Price and volume fields keep the exchange's decimal-string precision;
/// conversion to floating point happens only at the render boundary via
/// [`Candle::to_point`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, epoch milliseconds.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Bucket close time, epoch milliseconds.
    pub close_time: i64,
    pub quote_volume: Decimal,
    pub trade_count: u64,
}

impl Candle {
    /// Render-ready form of this candle.
    pub fn to_point(&self) -> CandlePoint {
        CandlePoint {
            time: self.open_time,
            open: self.open.to_f64().unwrap_or_default(),
            high: self.high.to_f64().unwrap_or_default(),
            low: self.low.to_f64().unwrap_or_default(),
            close: self.close.to_f64().unwrap_or_default(),
        }
    }
}

/// What a charting surface consumes: one candlestick data point with
/// numeric prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    /// Bucket open time, epoch milliseconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}
