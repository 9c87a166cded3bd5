//! Conversions from wire types to domain types for klines.

use super::wire::{KlineRow, WsKline};
use super::Candle;

impl From<KlineRow> for Candle {
    fn from(row: KlineRow) -> Self {
        Self {
            open_time: row.0,
            open: row.1,
            high: row.2,
            low: row.3,
            close: row.4,
            volume: row.5,
            close_time: row.6,
            quote_volume: row.7,
            trade_count: row.8,
        }
    }
}

impl From<WsKline> for Candle {
    fn from(k: WsKline) -> Self {
        Self {
            open_time: k.open_time,
            open: k.open,
            high: k.high,
            low: k.low,
            close: k.close,
            volume: k.volume,
            close_time: k.close_time.unwrap_or(k.open_time),
            quote_volume: k.quote_volume,
            trade_count: k.trade_count,
        }
    }
}
