//! Wire types for klines (REST + WS).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the REST klines response.
///
/// The exchange sends each candle as a 9-element positional array:
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume,
/// tradeCount]`. Prices and volumes arrive as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineRow(
    pub i64,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub i64,
    pub Decimal,
    pub u64,
);

/// WS kline event payload: `{"e":"kline","k":{…}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "e", default)]
    pub event_type: Option<String>,
    #[serde(rename = "k")]
    pub kline: WsKline,
}

/// One incremental candle from the WS stream.
///
/// Short field names are the exchange's. Only the open-time and OHLC fields
/// are guaranteed; the rest default when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct WsKline {
    /// Bucket open time, epoch milliseconds.
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
    #[serde(rename = "v", default)]
    pub volume: Decimal,
    /// Bucket close time, epoch milliseconds.
    #[serde(rename = "T", default)]
    pub close_time: Option<i64>,
    #[serde(rename = "q", default)]
    pub quote_volume: Decimal,
    #[serde(rename = "n", default)]
    pub trade_count: u64,
    /// Whether the bucket is final (no further updates will amend it).
    #[serde(rename = "x", default)]
    pub closed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kline_row_parses_positional_array() {
        let raw = r#"[
            1700000000000,
            "42000.01000000",
            "42020.00000000",
            "41990.55000000",
            "42010.10000000",
            "12.50000000",
            1700000059999,
            "525125.20000000",
            812
        ]"#;
        let row: KlineRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.0, 1700000000000);
        assert_eq!(row.1, Decimal::from_str("42000.01").unwrap());
        assert_eq!(row.6, 1700000059999);
        assert_eq!(row.8, 812);
    }

    #[test]
    fn test_kline_row_keeps_string_precision() {
        let raw = r#"[0,"0.00000001","0.00000002","0.00000001","0.00000002","1",0,"1",1]"#;
        let row: KlineRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.1.to_string(), "0.00000001");
    }

    #[test]
    fn test_ws_kline_minimal_payload() {
        let raw = r#"{"t":1700000000000,"o":"1.0","h":"2.0","l":"0.5","c":"1.5"}"#;
        let k: WsKline = serde_json::from_str(raw).unwrap();
        assert_eq!(k.open_time, 1700000000000);
        assert_eq!(k.close, Decimal::from_str("1.5").unwrap());
        assert_eq!(k.close_time, None);
        assert!(!k.closed);
    }

    #[test]
    fn test_ws_kline_full_payload() {
        let raw = r#"{
            "t": 1700000000000,
            "T": 1700000059999,
            "o": "42000.01",
            "h": "42020.00",
            "l": "41990.55",
            "c": "42010.10",
            "v": "12.5",
            "q": "525125.2",
            "n": 812,
            "x": true
        }"#;
        let k: WsKline = serde_json::from_str(raw).unwrap();
        assert_eq!(k.close_time, Some(1700000059999));
        assert_eq!(k.trade_count, 812);
        assert!(k.closed);
    }
}
