//! Rate gate for bursty event sources (resize observers, scroll events).
//!
//! At most one invocation per window. Leading-edge events fire immediately;
//! events inside the window are dropped, or deferred to the window edge when
//! `trailing` is enabled. Callers drive time explicitly, so the gate works
//! the same under a UI event loop, a tokio timer, or a test clock.

use std::time::{Duration, Instant};

/// Edge behavior of a [`Throttle`].
#[derive(Debug, Clone, Copy)]
pub struct ThrottleOptions {
    /// Fire on the first event of a window.
    pub leading: bool,
    /// Defer one suppressed event to the end of the window.
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: false,
        }
    }
}

/// One-invocation-per-window gate.
#[derive(Debug)]
pub struct Throttle {
    limit: Duration,
    options: ThrottleOptions,
    window_start: Option<Instant>,
    trailing_deadline: Option<Instant>,
}

impl Throttle {
    /// Leading-edge throttle with the given window.
    pub fn new(limit: Duration) -> Self {
        Self::with_options(limit, ThrottleOptions::default())
    }

    pub fn with_options(limit: Duration, options: ThrottleOptions) -> Self {
        Self {
            limit,
            options,
            window_start: None,
            trailing_deadline: None,
        }
    }

    /// An event arrived at `now`. Returns `true` when the caller should run
    /// its action immediately.
    pub fn on_event(&mut self, now: Instant) -> bool {
        let window_open = match self.window_start {
            None => true,
            Some(start) => now.duration_since(start) >= self.limit,
        };

        if window_open {
            self.trailing_deadline = None;
            self.window_start = Some(now);
            if self.options.leading {
                return true;
            }
            if self.options.trailing {
                self.trailing_deadline = Some(now + self.limit);
                return false;
            }
            // Neither edge configured: degenerate, run immediately.
            return true;
        }

        if self.options.trailing && self.trailing_deadline.is_none() {
            if let Some(start) = self.window_start {
                // One deferred run at the edge of the current window.
                self.trailing_deadline = Some(start + self.limit);
            }
        }
        false
    }

    /// Deadline of the armed trailing invocation, if any. Callers schedule a
    /// timer for this instant and then call [`Throttle::poll_trailing`].
    pub fn trailing_deadline(&self) -> Option<Instant> {
        self.trailing_deadline
    }

    /// Returns `true` once when the armed trailing invocation is due,
    /// consuming it and starting a fresh window.
    pub fn poll_trailing(&mut self, now: Instant) -> bool {
        match self.trailing_deadline {
            Some(deadline) if now >= deadline => {
                self.trailing_deadline = None;
                self.window_start = Some(now);
                true
            }
            _ => false,
        }
    }
}
