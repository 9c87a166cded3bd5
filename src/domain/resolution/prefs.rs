//! Persistence-bound resolution board.
//!
//! Wraps [`ResolutionBoard`] with the store side effect: every transition
//! writes back the entries it touched. Reads are forgiving (missing or
//! corrupted entries fall back to defaults); writes propagate errors so the
//! caller can decide whether degraded persistence matters.

use super::state::ResolutionBoard;
use super::ResolutionEntry;
use crate::error::StoreError;
use crate::shared::Resolution;
use crate::store::PrefsStore;
use std::collections::BTreeMap;

const PINNED_KEY: &str = "pinned_resolutions";
const AVAILABLE_KEY: &str = "available_resolutions";
const SELECTED_KEY: &str = "selected_resolution";

type PersistedCollection = BTreeMap<Resolution, ResolutionEntry>;

/// Resolution board backed by a [`PrefsStore`].
#[derive(Debug)]
pub struct ResolutionPrefs {
    store: PrefsStore,
    board: ResolutionBoard,
}

impl ResolutionPrefs {
    /// Load the board from the store.
    ///
    /// Sourcing priority for the selection: persisted value > supplied
    /// default. Missing or corrupted entries fall back to compiled-in
    /// defaults without error.
    pub fn load(store: PrefsStore, default_selected: Resolution) -> Self {
        let pinned: Option<PersistedCollection> = store.load(PINNED_KEY);
        let available: Option<PersistedCollection> = store.load(AVAILABLE_KEY);
        let selected: Option<Resolution> = store.load(SELECTED_KEY);

        let board = match (pinned, available) {
            (Some(pinned), Some(available)) => ResolutionBoard::from_parts(
                pinned,
                available,
                selected.unwrap_or(default_selected),
                default_selected,
            ),
            _ => {
                let mut board = ResolutionBoard::with_defaults(default_selected);
                if let Some(s) = selected {
                    // Persisted selection survives even when the collections
                    // didn't; select() rejects anything off the board.
                    board.select(s);
                }
                board
            }
        };

        Self { store, board }
    }

    pub fn board(&self) -> &ResolutionBoard {
        &self.board
    }

    pub fn selected(&self) -> Resolution {
        self.board.selected()
    }

    /// Set the selection and persist it.
    pub fn select(&mut self, resolution: Resolution) -> Result<bool, StoreError> {
        if !self.board.select(resolution) {
            return Ok(false);
        }
        self.store.save(SELECTED_KEY, &resolution)?;
        Ok(true)
    }

    /// Pin a resolution and persist both collections.
    pub fn pin(&mut self, resolution: Resolution) -> Result<bool, StoreError> {
        if !self.board.pin(resolution) {
            return Ok(false);
        }
        self.persist_collections()?;
        Ok(true)
    }

    /// Unpin a resolution and persist both collections.
    pub fn unpin(&mut self, resolution: Resolution) -> Result<bool, StoreError> {
        if !self.board.unpin(resolution) {
            return Ok(false);
        }
        self.persist_collections()?;
        Ok(true)
    }

    /// Write both collections. Called after every pin/unpin so the persisted
    /// split can never hold a resolution in both collections or neither.
    fn persist_collections(&self) -> Result<(), StoreError> {
        self.store.save(PINNED_KEY, self.board.pinned_map())?;
        self.store.save(AVAILABLE_KEY, self.board.available_map())?;
        Ok(())
    }
}
