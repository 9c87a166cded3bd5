//! Network URL constants and environment overrides.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.binance.com";

/// Default WebSocket combined-stream URL.
pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/stream";

/// Environment variable overriding the REST base URL.
pub const API_URL_ENV: &str = "CANDLEFEED_API_URL";

/// Environment variable overriding the WebSocket URL.
pub const WS_URL_ENV: &str = "CANDLEFEED_WS_URL";

/// REST base URL: environment override or the compiled-in default.
pub fn api_url_from_env() -> String {
    std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// WebSocket URL: environment override or the compiled-in default.
pub fn ws_url_from_env() -> String {
    std::env::var(WS_URL_ENV).unwrap_or_else(|_| DEFAULT_WS_URL.to_string())
}
