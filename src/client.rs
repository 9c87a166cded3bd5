//! High-level client — `ChartClient` with nested sub-client accessors.

use crate::domain::kline::client::Klines;
use crate::error::SdkError;
use crate::http::MarketHttp;
use crate::store::PrefsStore;
use crate::ws::WsConfig;

// Re-export sub-client types for convenience.
pub use crate::domain::kline::client::Klines as KlinesClient;

/// Candle bucket time zone sent with REST kline requests.
pub const DEFAULT_TIME_ZONE: &str = "7";

/// The primary entry point for the SDK.
///
/// Provides sub-client accessors (`client.klines()`) plus the WS config and
/// prefs store handed to a [`crate::chart::ChartSession`].
pub struct ChartClient {
    pub(crate) http: MarketHttp,
    pub(crate) ws_config: WsConfig,
    pub(crate) prefs_store: PrefsStore,
    pub(crate) time_zone: String,
}

impl ChartClient {
    pub fn builder() -> ChartClientBuilder {
        ChartClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn klines(&self) -> Klines<'_> {
        Klines { client: self }
    }

    /// Get a WS config for creating a WebSocket connection.
    ///
    /// The WS client is intentionally not embedded in `ChartClient` because
    /// WS connection lifetimes are managed at the session layer (tied to a
    /// chart's mount/teardown).
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a new native WS client from the current config.
    #[cfg(feature = "ws-native")]
    pub fn ws_native(&self) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(self.ws_config.clone())
    }

    pub fn prefs_store(&self) -> &PrefsStore {
        &self.prefs_store
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }
}

impl Clone for ChartClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            ws_config: self.ws_config.clone(),
            prefs_store: self.prefs_store.clone(),
            time_zone: self.time_zone.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ChartClientBuilder {
    base_url: String,
    ws_url: String,
    prefs_store: Option<PrefsStore>,
    time_zone: String,
}

impl Default for ChartClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            ws_url: crate::network::DEFAULT_WS_URL.to_string(),
            prefs_store: None,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }
}

impl ChartClientBuilder {
    /// Builder seeded from the environment (`CANDLEFEED_API_URL`,
    /// `CANDLEFEED_WS_URL`), falling back to the compiled-in defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: crate::network::api_url_from_env(),
            ws_url: crate::network::ws_url_from_env(),
            ..Self::default()
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    /// Use an explicit prefs store (default: the platform config dir).
    pub fn prefs_store(mut self, store: PrefsStore) -> Self {
        self.prefs_store = Some(store);
        self
    }

    pub fn time_zone(mut self, tz: &str) -> Self {
        self.time_zone = tz.to_string();
        self
    }

    pub fn build(self) -> Result<ChartClient, SdkError> {
        Ok(ChartClient {
            http: MarketHttp::new(&self.base_url),
            ws_config: WsConfig {
                url: self.ws_url,
                ..WsConfig::default()
            },
            prefs_store: self
                .prefs_store
                .unwrap_or_else(PrefsStore::default_location),
            time_zone: self.time_zone,
        })
    }
}
