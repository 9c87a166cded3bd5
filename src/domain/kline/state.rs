//! Kline state containers — app-owned, SDK-provided update logic.

use super::{Candle, CandlePoint};

// ─── CandleSeries ────────────────────────────────────────────────────────────

/// The rendered candle series for one symbol + resolution.
///
/// Once populated, the series is append/patch-only: a live update either
/// amends the most recent bucket or appends a new one; history is never
/// reordered.
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole series (REST snapshot after a resolution change).
    pub fn set_snapshot(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
    }

    /// Apply one incremental candle: upsert by timestamp.
    ///
    /// If the incoming open time matches the last candle's, the last candle
    /// is replaced (last write wins); otherwise the candle is appended.
    pub fn apply_update(&mut self, candle: Candle) {
        if let Some(last) = self.candles.last_mut() {
            if last.open_time == candle.open_time {
                *last = candle;
                return;
            }
        }
        self.candles.push(candle);
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    /// Render-ready points for a charting surface.
    pub fn to_points(&self) -> Vec<CandlePoint> {
        self.candles.iter().map(Candle::to_point).collect()
    }
}

// ─── HistoryState ────────────────────────────────────────────────────────────

/// Token identifying one in-flight history fetch.
///
/// Only the token from the most recent [`HistoryState::begin`] may commit;
/// stale in-flight responses are discarded so a slow fetch for an old
/// resolution cannot clobber a newer one's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// History fetch state: last-good data, loading flag, last error.
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    series: Vec<Candle>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch: raises the loading flag and invalidates all earlier
    /// tokens.
    pub fn begin(&mut self) -> FetchToken {
        self.generation += 1;
        self.loading = true;
        FetchToken(self.generation)
    }

    /// Finish a fetch.
    ///
    /// A stale token leaves the state untouched. A current token commits the
    /// result: on success the series is replaced; on failure the last-good
    /// series is preserved and the error recorded. Either way the committed
    /// view is returned — empty on failure, matching the behavior of a
    /// fetcher that exhausted its retries.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        token: FetchToken,
        result: Result<Vec<Candle>, E>,
    ) -> &[Candle] {
        if token.0 != self.generation {
            tracing::debug!(
                token = token.0,
                current = self.generation,
                "discarding stale history fetch result"
            );
            return &[];
        }

        self.loading = false;
        match result {
            Ok(candles) => {
                self.error = None;
                self.series = candles;
                &self.series
            }
            Err(e) => {
                tracing::warn!(error = %e, "history fetch failed; keeping last-good series");
                self.error = Some(e.to_string());
                &[]
            }
        }
    }

    pub fn series(&self) -> &[Candle] {
        &self.series
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use rust_decimal::Decimal;

    fn candle(open_time: i64, close: i64) -> Candle {
        Candle {
            open_time,
            open: Decimal::new(close - 5, 0),
            high: Decimal::new(close + 10, 0),
            low: Decimal::new(close - 10, 0),
            close: Decimal::new(close, 0),
            volume: Decimal::ONE,
            close_time: open_time + 59_999,
            quote_volume: Decimal::ONE,
            trade_count: 1,
        }
    }

    fn series_of(n: i64) -> Vec<Candle> {
        (0..n).map(|i| candle(i * 60_000, 100 + i)).collect()
    }

    // ── CandleSeries ─────────────────────────────────────────────────────

    #[test]
    fn test_update_with_same_timestamp_replaces_last() {
        let mut series = CandleSeries::new();
        series.set_snapshot(series_of(5));
        assert_eq!(series.len(), 5);

        let last_time = series.last().unwrap().open_time;
        series.apply_update(candle(last_time, 999));

        assert_eq!(series.len(), 5);
        assert_eq!(series.last().unwrap().close, Decimal::new(999, 0));
    }

    #[test]
    fn test_update_with_new_timestamp_appends() {
        let mut series = CandleSeries::new();
        series.set_snapshot(series_of(5));

        let next_time = series.last().unwrap().open_time + 60_000;
        series.apply_update(candle(next_time, 123));

        assert_eq!(series.len(), 6);
        assert_eq!(series.last().unwrap().open_time, next_time);
    }

    #[test]
    fn test_update_on_empty_series_appends() {
        let mut series = CandleSeries::new();
        series.apply_update(candle(0, 100));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_history_is_never_reordered() {
        let mut series = CandleSeries::new();
        series.set_snapshot(series_of(3));

        // An update older than the last bucket appends rather than sorting
        // itself in: last write wins by timestamp, nothing more.
        series.apply_update(candle(0, 555));
        assert_eq!(series.len(), 4);
        assert_eq!(series.candles()[0].close, Decimal::new(100, 0));
    }

    // ── HistoryState ─────────────────────────────────────────────────────

    #[test]
    fn test_failed_fetch_preserves_last_good_series() {
        let mut state = HistoryState::new();

        let token = state.begin();
        let committed = state.complete(token, Ok::<_, HttpError>(series_of(5)));
        assert_eq!(committed.len(), 5);

        let token = state.begin();
        assert!(state.is_loading());
        let committed = state.complete(
            token,
            Err(HttpError::MaxRetriesExceeded {
                attempts: 4,
                last_error: "connection refused".into(),
            }),
        );

        assert!(committed.is_empty());
        assert_eq!(state.series().len(), 5);
        assert!(!state.is_loading());
        assert!(state.last_error().unwrap().contains("4 attempts"));
    }

    #[test]
    fn test_stale_token_does_not_commit() {
        let mut state = HistoryState::new();

        let stale = state.begin();
        let current = state.begin();

        // The slow, stale fetch lands after the newer one.
        let committed = state.complete(current, Ok::<_, HttpError>(series_of(3)));
        assert_eq!(committed.len(), 3);

        let committed = state.complete(stale, Ok::<_, HttpError>(series_of(8)));
        assert!(committed.is_empty());
        assert_eq!(state.series().len(), 3);
    }

    #[test]
    fn test_stale_failure_does_not_clear_loading() {
        let mut state = HistoryState::new();

        let stale = state.begin();
        let _current = state.begin();

        state.complete(
            stale,
            Err(HttpError::Timeout),
        );
        // The newer fetch still owns the loading flag.
        assert!(state.is_loading());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut state = HistoryState::new();

        let token = state.begin();
        state.complete(token, Err(HttpError::Timeout));
        assert!(state.last_error().is_some());

        let token = state.begin();
        state.complete(token, Ok::<_, HttpError>(series_of(1)));
        assert!(state.last_error().is_none());
    }
}
