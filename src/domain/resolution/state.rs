//! Resolution board state — pure transitions, no side effects.

use super::{default_available, default_pinned, ResolutionEntry};
use crate::shared::Resolution;
use std::collections::BTreeMap;

/// The pinned/available board plus the current selection.
///
/// Invariant: every resolution of the universe lives in exactly one of the
/// two collections at all times; `pin`/`unpin` move entries between them
/// preserving their score, never duplicating or dropping one.
///
/// Transitions are pure state changes; persistence is layered on by
/// [`super::ResolutionPrefs`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionBoard {
    pinned: BTreeMap<Resolution, ResolutionEntry>,
    available: BTreeMap<Resolution, ResolutionEntry>,
    selected: Resolution,
}

impl ResolutionBoard {
    /// Board with the default split and the given selection.
    pub fn with_defaults(selected: Resolution) -> Self {
        Self {
            pinned: default_pinned()
                .into_iter()
                .map(|e| (e.value, e))
                .collect(),
            available: default_available()
                .into_iter()
                .map(|e| (e.value, e))
                .collect(),
            selected,
        }
    }

    /// Board from persisted collections.
    ///
    /// If `selected` is not a member of either collection (corrupted
    /// storage), the externally supplied `default` wins.
    pub fn from_parts(
        pinned: BTreeMap<Resolution, ResolutionEntry>,
        available: BTreeMap<Resolution, ResolutionEntry>,
        selected: Resolution,
        default: Resolution,
    ) -> Self {
        let mut board = Self {
            pinned,
            available,
            selected: default,
        };
        if board.contains(selected) {
            board.selected = selected;
        } else {
            tracing::warn!(
                selected = %selected,
                fallback = %default,
                "persisted selection not on the board; using default"
            );
        }
        board
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn selected(&self) -> Resolution {
        self.selected
    }

    /// Display record of the current selection.
    pub fn selected_entry(&self) -> Option<&ResolutionEntry> {
        self.pinned
            .get(&self.selected)
            .or_else(|| self.available.get(&self.selected))
    }

    pub fn is_pinned(&self, resolution: Resolution) -> bool {
        self.pinned.contains_key(&resolution)
    }

    pub fn contains(&self, resolution: Resolution) -> bool {
        self.pinned.contains_key(&resolution) || self.available.contains_key(&resolution)
    }

    /// Pinned entries in score order.
    pub fn pinned(&self) -> Vec<&ResolutionEntry> {
        self.pinned.values().collect()
    }

    /// Available entries in score order.
    pub fn available(&self) -> Vec<&ResolutionEntry> {
        self.available.values().collect()
    }

    pub(crate) fn pinned_map(&self) -> &BTreeMap<Resolution, ResolutionEntry> {
        &self.pinned
    }

    pub(crate) fn available_map(&self) -> &BTreeMap<Resolution, ResolutionEntry> {
        &self.available
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Set the selection. Returns `false` (and changes nothing) when the
    /// resolution is not on the board.
    pub fn select(&mut self, resolution: Resolution) -> bool {
        if !self.contains(resolution) {
            tracing::warn!(resolution = %resolution, "ignoring selection not on the board");
            return false;
        }
        self.selected = resolution;
        true
    }

    /// Move a resolution from Available to Pinned, keeping its score.
    /// No-op when already pinned.
    pub fn pin(&mut self, resolution: Resolution) -> bool {
        match self.available.remove(&resolution) {
            Some(entry) => {
                self.pinned.insert(resolution, entry);
                true
            }
            None => false,
        }
    }

    /// Move a resolution from Pinned to Available, keeping its score.
    /// No-op when already available.
    pub fn unpin(&mut self, resolution: Resolution) -> bool {
        match self.pinned.remove(&resolution) {
            Some(entry) => {
                self.available.insert(resolution, entry);
                true
            }
            None => false,
        }
    }
}

impl Default for ResolutionBoard {
    fn default() -> Self {
        Self::with_defaults(Resolution::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(board: &ResolutionBoard) {
        for r in Resolution::all() {
            let in_pinned = board.pinned_map().contains_key(r);
            let in_available = board.available_map().contains_key(r);
            assert!(
                in_pinned ^ in_available,
                "{r} must be in exactly one collection (pinned={in_pinned}, available={in_available})"
            );
        }
    }

    #[test]
    fn test_defaults_satisfy_partition() {
        assert_partition(&ResolutionBoard::default());
    }

    #[test]
    fn test_partition_holds_under_arbitrary_pin_unpin() {
        let mut board = ResolutionBoard::default();
        let moves = [
            Resolution::Hour1,
            Resolution::Sec1,
            Resolution::Hour1,
            Resolution::Month1,
            Resolution::Min15,
            Resolution::Sec1,
        ];
        for (i, r) in moves.iter().enumerate() {
            if i % 2 == 0 {
                board.pin(*r);
            } else {
                board.unpin(*r);
            }
            assert_partition(&board);
        }
    }

    #[test]
    fn test_pin_then_unpin_restores_score() {
        let mut board = ResolutionBoard::default();
        let original = board
            .available_map()
            .get(&Resolution::Hour4)
            .cloned()
            .unwrap();

        assert!(board.pin(Resolution::Hour4));
        assert!(board.is_pinned(Resolution::Hour4));
        assert!(board.unpin(Resolution::Hour4));

        let restored = board.available_map().get(&Resolution::Hour4).unwrap();
        assert_eq!(*restored, original);
        assert_eq!(restored.score, Resolution::Hour4.score());
    }

    #[test]
    fn test_pin_already_pinned_is_noop() {
        let mut board = ResolutionBoard::default();
        assert!(!board.pin(Resolution::Min1));
        assert_partition(&board);
    }

    #[test]
    fn test_unpin_already_available_is_noop() {
        let mut board = ResolutionBoard::default();
        assert!(!board.unpin(Resolution::Day1));
        assert_partition(&board);
    }

    #[test]
    fn test_views_are_score_ordered() {
        let mut board = ResolutionBoard::default();
        board.pin(Resolution::Month1);
        board.pin(Resolution::Hour1);

        let scores: Vec<u8> = board.pinned().iter().map(|e| e.score).collect();
        let mut sorted = scores.clone();
        sorted.sort();
        assert_eq!(scores, sorted);
    }

    #[test]
    fn test_select_member_updates_selection() {
        let mut board = ResolutionBoard::default();
        assert!(board.select(Resolution::Day1));
        assert_eq!(board.selected(), Resolution::Day1);
        assert_eq!(
            board.selected_entry().unwrap().value,
            Resolution::Day1
        );
    }

    #[test]
    fn test_from_parts_falls_back_when_selection_missing() {
        // A board whose persisted collections lost 1w entirely.
        let mut pinned = BTreeMap::new();
        pinned.insert(Resolution::Min1, ResolutionEntry::of(Resolution::Min1));
        let available = BTreeMap::new();

        let board = ResolutionBoard::from_parts(
            pinned,
            available,
            Resolution::Week1,
            Resolution::Min1,
        );
        assert_eq!(board.selected(), Resolution::Min1);
    }
}
