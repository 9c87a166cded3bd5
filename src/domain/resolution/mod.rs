//! Resolution domain — the pinned/available board and its persistence.

pub mod prefs;
pub mod state;

use crate::shared::Resolution;
use serde::{Deserialize, Serialize};

pub use prefs::ResolutionPrefs;
pub use state::ResolutionBoard;

/// Display record for one resolution: what a pill button renders.
///
/// The persisted JSON matches this shape
/// (`{"label":"1m","value":"1m","score":1}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEntry {
    pub label: String,
    pub value: Resolution,
    pub score: u8,
}

impl ResolutionEntry {
    pub fn of(resolution: Resolution) -> Self {
        Self {
            label: resolution.label().to_string(),
            value: resolution,
            score: resolution.score(),
        }
    }
}

/// Resolutions pinned by default: the sub-hour ladder, 1s through 30m.
pub fn default_pinned() -> Vec<ResolutionEntry> {
    Resolution::all()
        .iter()
        .filter(|r| r.score() <= Resolution::Min30.score())
        .map(|r| ResolutionEntry::of(*r))
        .collect()
}

/// Resolutions available but unpinned by default: 1h through 1M.
pub fn default_available() -> Vec<ResolutionEntry> {
    Resolution::all()
        .iter()
        .filter(|r| r.score() > Resolution::Min30.score())
        .map(|r| ResolutionEntry::of(*r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_of_carries_score() {
        let entry = ResolutionEntry::of(Resolution::Min3);
        assert_eq!(entry.label, "3m");
        assert_eq!(entry.value, Resolution::Min3);
        assert_eq!(entry.score, 2);
    }

    #[test]
    fn test_defaults_partition_the_universe() {
        let pinned = default_pinned();
        let available = default_available();
        assert_eq!(pinned.len(), 6);
        assert_eq!(available.len(), 10);
        assert_eq!(pinned.len() + available.len(), Resolution::all().len());
    }

    #[test]
    fn test_entry_persisted_shape() {
        let json = serde_json::to_value(ResolutionEntry::of(Resolution::Min1)).unwrap();
        assert_eq!(json["label"], "1m");
        assert_eq!(json["value"], "1m");
        assert_eq!(json["score"], 1);
    }
}
