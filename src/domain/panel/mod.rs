//! Resolution panel presentation state — overflow geometry and edit mode.
//!
//! Pure computation over bounding rectangles supplied by the rendering
//! surface; nothing here is persisted or shared.

use crate::shared::{Throttle, ThrottleOptions};
use std::time::{Duration, Instant};

/// Resize evaluations are throttled to one per this window.
pub const RESIZE_THROTTLE: Duration = Duration::from_millis(200);

/// Bounding rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Container rect from its top-left corner and client size: the visible
    /// bottom is `top + client_height` regardless of scroll extent.
    pub fn from_client_size(left: f64, top: f64, client_width: f64, client_height: f64) -> Self {
        Self {
            left,
            right: left + client_width,
            top,
            bottom: top + client_height,
        }
    }
}

/// Whether the selected pill lies outside the visible bounds of the pinned
/// row: fully to the right, fully to the left, or wrapped below it.
pub fn hidden_in_scroll(pill: &Rect, container: &Rect) -> bool {
    pill.left >= container.right || pill.right <= container.left || pill.top > container.bottom
}

/// Whether the duplicate overflow-indicator pill should show: always when
/// the selection is not pinned, otherwise only when the pinned pill is
/// scrolled out of view.
pub fn indicator_visible(selected_is_pinned: bool, hidden_in_scroll: bool) -> bool {
    !selected_is_pinned || hidden_in_scroll
}

/// Panel state: the edit-mode flag plus the throttled overflow watch.
#[derive(Debug)]
pub struct PanelState {
    editing: bool,
    throttle: Throttle,
    pill_hidden: bool,
}

impl PanelState {
    pub fn new() -> Self {
        Self {
            editing: false,
            throttle: Throttle::with_options(
                RESIZE_THROTTLE,
                ThrottleOptions {
                    leading: true,
                    trailing: false,
                },
            ),
            pill_hidden: false,
        }
    }

    /// Edit mode only controls whether pin/unpin affordances render.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn toggle_editing(&mut self) -> bool {
        self.editing = !self.editing;
        self.editing
    }

    /// Feed one resize observation. Evaluations inside the throttle window
    /// are dropped and the previous result stands.
    pub fn on_resize(&mut self, now: Instant, pill: &Rect, container: &Rect) {
        if self.throttle.on_event(now) {
            self.pill_hidden = hidden_in_scroll(pill, container);
        }
    }

    pub fn pill_hidden(&self) -> bool {
        self.pill_hidden
    }

    /// Current overflow-indicator visibility for the given selection state.
    pub fn indicator_visible(&self, selected_is_pinned: bool) -> bool {
        indicator_visible(selected_is_pinned, self.pill_hidden)
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}
