//! Ordered in-memory collection of overlays.
//!
//! [`OverlayStore`] is the single render source for the view layer.
//! Insertion order is creation order and is preserved across in-place
//! updates. Every lookup is by [`OverlayId`], never by position, so
//! out-of-order remote responses cannot land on the wrong entry.

use crate::overlay::{Overlay, OverlayPatch};
use crate::types::OverlayId;

/// Ordered collection of overlays currently known to the client.
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
}

impl OverlayStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All overlays in display order.
    pub fn list(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Replace the whole collection (initial load).
    pub fn replace_all(&mut self, overlays: Vec<Overlay>) {
        self.overlays = overlays;
    }

    /// Insert `overlay` at the end if its id is unknown, otherwise replace
    /// the existing entry in place.
    pub fn upsert(&mut self, overlay: Overlay) {
        match self.position(&overlay.id) {
            Some(index) => self.overlays[index] = overlay,
            None => self.overlays.push(overlay),
        }
    }

    /// Remove an overlay, returning it if it was present.
    pub fn remove(&mut self, id: &OverlayId) -> Option<Overlay> {
        let index = self.position(id)?;
        Some(self.overlays.remove(index))
    }

    pub fn get(&self, id: &OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| &o.id == id)
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.position(id).is_some()
    }

    /// Index of the overlay in display order.
    pub fn position(&self, id: &OverlayId) -> Option<usize> {
        self.overlays.iter().position(|o| &o.id == id)
    }

    /// Apply a partial patch in place.
    ///
    /// Returns the overlay as it was before the patch, or `None` when the id
    /// is not in the collection (nothing changes).
    pub fn apply_patch(&mut self, id: &OverlayId, patch: &OverlayPatch) -> Option<Overlay> {
        let overlay = self.overlays.iter_mut().find(|o| &o.id == id)?;
        let previous = overlay.clone();
        overlay.apply_patch(patch);
        Some(previous)
    }

    /// Insert at `index` (clamped to the current length). If the id is
    /// already present the existing entry is replaced in place instead.
    pub fn insert_at(&mut self, index: usize, overlay: Overlay) {
        if self.contains(&overlay.id) {
            self.upsert(overlay);
            return;
        }
        let index = index.min(self.overlays.len());
        self.overlays.insert(index, overlay);
    }
}
