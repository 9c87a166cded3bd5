//! Klines sub-client — history snapshot queries.

use super::Candle;
use crate::client::ChartClient;
use crate::error::SdkError;
use crate::shared::{Resolution, Symbol};

/// Candles per history page. One page is all the chart loads.
pub const DEFAULT_KLINE_LIMIT: u32 = 1000;

/// Sub-client for kline operations.
pub struct Klines<'a> {
    pub(crate) client: &'a ChartClient,
}

impl<'a> Klines<'a> {
    /// Fetch the most recent page of candles for a symbol + resolution,
    /// ending now.
    pub async fn history(
        &self,
        symbol: &Symbol,
        resolution: Resolution,
    ) -> Result<Vec<Candle>, SdkError> {
        let end_time = chrono::Utc::now().timestamp_millis();
        self.history_ending_at(symbol, resolution, end_time).await
    }

    /// Fetch the page of candles ending at an explicit time (epoch ms).
    pub async fn history_ending_at(
        &self,
        symbol: &Symbol,
        resolution: Resolution,
        end_time: i64,
    ) -> Result<Vec<Candle>, SdkError> {
        let rows = self
            .client
            .http
            .get_klines(
                symbol,
                resolution,
                self.client.time_zone(),
                DEFAULT_KLINE_LIMIT,
                end_time,
            )
            .await?;
        Ok(rows.into_iter().map(Candle::from).collect())
    }
}
