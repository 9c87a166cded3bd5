//! Chart session — the mount-to-teardown composition of history fetch,
//! live feed, and resolution board.
//!
//! A session owns one WS connection and one rendered series. Selecting a
//! resolution persists the choice, re-fetches history (generation-guarded),
//! and re-subscribes the stream. Teardown closes the socket only from an
//! Open/Closing state.

use crate::client::ChartClient;
use crate::domain::kline::{Candle, CandleSeries, HistoryState};
use crate::domain::resolution::{ResolutionBoard, ResolutionPrefs};
use crate::error::SdkError;
use crate::shared::{Resolution, Symbol};
use crate::ws::native::WsClient;
use crate::ws::subscriptions::DEFAULT_UTC_OFFSET;
use crate::ws::{KlineStream, MessageIn, WsEvent};

use futures_util::StreamExt;

/// Session parameters: what to chart and where to start.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub symbol: Symbol,
    /// Selection used when the store has none (or a corrupted one).
    pub default_resolution: Resolution,
    /// UTC offset suffix for kline stream names.
    pub utc_offset: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            symbol: Symbol::default(),
            default_resolution: Resolution::default(),
            utc_offset: DEFAULT_UTC_OFFSET.to_string(),
        }
    }
}

/// One mounted chart: prefs, history, series, and the live stream.
pub struct ChartSession {
    client: ChartClient,
    ws: WsClient,
    prefs: ResolutionPrefs,
    history: HistoryState,
    series: CandleSeries,
    symbol: Symbol,
    utc_offset: String,
}

impl ChartSession {
    /// Mount a session: load prefs, connect the stream, subscribe the
    /// selected resolution, and fetch the initial history page.
    pub async fn mount(client: ChartClient, config: SessionConfig) -> Result<Self, SdkError> {
        let prefs = ResolutionPrefs::load(
            client.prefs_store().clone(),
            config.default_resolution,
        );

        let mut ws = client.ws_native();
        ws.connect().await?;

        let mut session = Self {
            client,
            ws,
            prefs,
            history: HistoryState::new(),
            series: CandleSeries::new(),
            symbol: config.symbol,
            utc_offset: config.utc_offset,
        };

        if let Err(e) = session.ws.subscribe(&session.stream()) {
            tracing::warn!(error = %e, "initial subscribe failed");
        }
        session.refresh_history().await;

        Ok(session)
    }

    /// The stream for the current selection.
    pub fn stream(&self) -> KlineStream {
        KlineStream::with_offset(
            self.symbol.clone(),
            self.prefs.selected(),
            &self.utc_offset,
        )
    }

    // ── Resolution board ─────────────────────────────────────────────────

    /// Change the selected resolution: persist, re-fetch history, and move
    /// the live feed to the new stream.
    pub async fn select(&mut self, resolution: Resolution) {
        let old_stream = self.stream();

        match self.prefs.select(resolution) {
            Ok(true) => {}
            Ok(false) => return, // not on the board; selection unchanged
            Err(e) => {
                tracing::warn!(error = %e, "selection not persisted; continuing in memory");
            }
        }

        self.refresh_history().await;

        let new_stream = self.stream();
        if let Err(e) = self.ws.switch(&old_stream, &new_stream) {
            tracing::warn!(error = %e, "stream re-subscription failed");
        }
    }

    pub fn pin(&mut self, resolution: Resolution) -> bool {
        match self.prefs.pin(resolution) {
            Ok(moved) => moved,
            Err(e) => {
                tracing::warn!(error = %e, "pin not persisted; continuing in memory");
                true
            }
        }
    }

    pub fn unpin(&mut self, resolution: Resolution) -> bool {
        match self.prefs.unpin(resolution) {
            Ok(moved) => moved,
            Err(e) => {
                tracing::warn!(error = %e, "unpin not persisted; continuing in memory");
                true
            }
        }
    }

    pub fn board(&self) -> &ResolutionBoard {
        self.prefs.board()
    }

    pub fn selected(&self) -> Resolution {
        self.prefs.selected()
    }

    // ── History ──────────────────────────────────────────────────────────

    /// Fetch one history page for the current selection and commit it if
    /// still current. Failures keep the last-good series.
    pub async fn refresh_history(&mut self) {
        let token = self.history.begin();
        let result = self
            .client
            .klines()
            .history(&self.symbol, self.prefs.selected())
            .await;
        self.history.complete(token, result);

        if !self.history.is_loading() && self.history.last_error().is_none() {
            self.series.set_snapshot(self.history.series().to_vec());
        }
    }

    // ── Live feed ────────────────────────────────────────────────────────

    /// Wait for the next WS event and fold it into the session.
    pub async fn poll_event(&mut self) -> Option<WsEvent> {
        let event = {
            let events = self.ws.events();
            tokio::pin!(events);
            events.next().await
        };
        if let Some(ev) = &event {
            self.handle_event(ev.clone());
        }
        event
    }

    /// Fold one WS event into the session state.
    pub fn handle_event(&mut self, event: WsEvent) {
        match event {
            WsEvent::Message(MessageIn::Stream(envelope)) => {
                // After a resolution switch, messages for the old stream can
                // still be in flight; apply only the current stream's.
                if let Some(name) = &envelope.stream {
                    if *name != self.stream().stream_name() {
                        tracing::debug!(stream = %name, "dropping update for stale stream");
                        return;
                    }
                }
                self.series.apply_update(Candle::from(envelope.data.kline));
            }
            WsEvent::Message(MessageIn::Ack(_)) => {}
            WsEvent::Connected => {
                tracing::info!("stream connected");
            }
            WsEvent::Disconnected { code, reason } => {
                tracing::info!(?code, reason, "stream disconnected");
            }
            WsEvent::Error(e) => {
                tracing::warn!(error = %e, "stream error");
            }
            WsEvent::MaxReconnectReached => {
                tracing::warn!("stream reconnect attempts exhausted");
            }
        }
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    // ── Teardown ─────────────────────────────────────────────────────────

    /// Close the stream. A close frame is only sent from Open/Closing;
    /// tearing down a dead session is a no-op.
    pub async fn teardown(&mut self) {
        if let Err(e) = self.ws.disconnect().await {
            tracing::warn!(error = %e, "stream teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::StreamEnvelope;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn session_parts() -> (ResolutionPrefs, CandleSeries) {
        let dir = tempfile::tempdir().unwrap();
        let prefs = ResolutionPrefs::load(
            crate::store::PrefsStore::new(dir.path()),
            Resolution::Min1,
        );
        (prefs, CandleSeries::new())
    }

    fn kline_text(stream: &str, open_time: i64, close: &str) -> String {
        format!(
            r#"{{"stream":"{stream}","data":{{"e":"kline","k":{{"t":{open_time},"o":"1.0","h":"2.0","l":"0.5","c":"{close}"}}}}}}"#
        )
    }

    // handle_event needs a full session (with a WS client), which needs a
    // runtime; the stream-matching rule is exercised through the envelope
    // decode + series upsert it is built from.
    #[test]
    fn test_stream_envelope_folds_into_series_upsert() {
        let (_prefs, mut series) = session_parts();

        let env: StreamEnvelope = serde_json::from_str::<crate::ws::MessageIn>(&kline_text(
            "btcusdt@kline_1m@+08:00",
            1700000000000,
            "1.5",
        ))
        .map(|m| match m {
            crate::ws::MessageIn::Stream(env) => env,
            other => panic!("expected stream envelope, got {other:?}"),
        })
        .unwrap();

        series.apply_update(Candle::from(env.data.kline));
        assert_eq!(series.len(), 1);

        // Same bucket again: replaced, not appended.
        let env2: StreamEnvelope = serde_json::from_str::<crate::ws::MessageIn>(&kline_text(
            "btcusdt@kline_1m@+08:00",
            1700000000000,
            "1.9",
        ))
        .map(|m| match m {
            crate::ws::MessageIn::Stream(env) => env,
            _ => unreachable!(),
        })
        .unwrap();
        series.apply_update(Candle::from(env2.data.kline));

        assert_eq!(series.len(), 1);
        assert_eq!(
            series.last().unwrap().close,
            Decimal::from_str("1.9").unwrap()
        );
    }

    #[tokio::test]
    async fn test_session_select_and_teardown_offline() {
        // A session against an unreachable endpoint still keeps its board
        // working and tears down cleanly.
        let dir = tempfile::tempdir().unwrap();
        let client = ChartClient::builder()
            .base_url("http://127.0.0.1:1")
            .ws_url("ws://127.0.0.1:1")
            .prefs_store(crate::store::PrefsStore::new(dir.path()))
            .build()
            .unwrap();

        let ws = client.ws_native();
        let prefs = ResolutionPrefs::load(client.prefs_store().clone(), Resolution::Min1);
        let mut session = ChartSession {
            client,
            ws,
            prefs,
            history: HistoryState::new(),
            series: CandleSeries::new(),
            symbol: Symbol::default(),
            utc_offset: DEFAULT_UTC_OFFSET.to_string(),
        };

        assert!(session.pin(Resolution::Hour1));
        assert!(session.board().is_pinned(Resolution::Hour1));
        assert_eq!(session.stream().stream_name(), "btcusdt@kline_1m@+08:00");

        // Never connected: disconnect must be a no-op.
        session.teardown().await;
    }
}
