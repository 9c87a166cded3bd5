//! # candlefeed
//!
//! A Rust client for Binance-style candlestick chart data: one-shot REST
//! history snapshots reconciled with a live incremental kline stream, plus
//! a persistent pinned/available resolution board.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, domain models, state containers
//! 2. **HTTP API** — `MarketHttp` with per-endpoint retry policies
//! 3. **WebSocket** — `WsClient` over `tokio-tungstenite` with subscription
//!    tracking and reconnect
//! 4. **High-Level Client** — `ChartClient` with sub-clients, and
//!    `ChartSession`, the mount-to-teardown chart composition
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use candlefeed::prelude::*;
//!
//! let client = ChartClient::builder()
//!     .base_url("https://api.binance.com")
//!     .build()?;
//!
//! let mut session = ChartSession::mount(client, SessionConfig::default()).await?;
//! session.select(Resolution::Min5).await;
//! while let Some(_event) = session.poll_event().await {
//!     let _points = session.series().to_points();
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants and environment overrides.
pub mod network;

/// Persistent key/value preference store.
pub mod store;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// WebSocket client: messages, subscriptions, events.
pub mod ws;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `ChartClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

/// `ChartSession` — mount-to-teardown chart composition.
#[cfg(all(feature = "http", feature = "ws-native"))]
pub mod chart;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Resolution, Symbol, Throttle, ThrottleOptions};

    // Domain types — kline
    pub use crate::domain::kline::{Candle, CandlePoint, CandleSeries, FetchToken, HistoryState};

    // Domain types — resolution board
    pub use crate::domain::resolution::{
        ResolutionBoard, ResolutionEntry, ResolutionPrefs,
    };

    // Domain types — panel presentation
    pub use crate::domain::panel::{hidden_in_scroll, indicator_visible, PanelState, Rect};

    // Errors
    pub use crate::error::SdkError;

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_WS_URL};

    // Persistence
    pub use crate::store::PrefsStore;

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{ChartClient, ChartClientBuilder, KlinesClient};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{KlineStream, MessageIn, MessageOut, ReadyState, WsConfig, WsEvent};

    // Session
    #[cfg(all(feature = "http", feature = "ws-native"))]
    pub use crate::chart::{ChartSession, SessionConfig};
}
