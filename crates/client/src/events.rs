//! Notifications published by the sync controller.
//!
//! [`SyncEventBus`] fans [`SyncEvent`]s out over a `tokio::sync::broadcast`
//! channel so a view layer can refresh or show a status line without
//! polling the controller.

use serde::Serialize;
use tokio::sync::broadcast;

use overlaycast_core::overlay::Overlay;
use overlaycast_core::types::OverlayId;

// ---------------------------------------------------------------------------
// SyncEvent
// ---------------------------------------------------------------------------

/// The remote operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Load,
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A reconciliation step that changed (or failed to change) local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The collection was replaced by a `GET /overlays` result.
    Loaded { count: usize },

    /// A create was confirmed; the overlay now carries its store id.
    Created { overlay: Overlay },

    /// An update response was merged into the local copy.
    Updated { overlay: Overlay },

    /// A delete was confirmed by the store.
    Deleted { id: OverlayId },

    /// A failed request was undone locally.
    RolledBack { id: OverlayId },

    /// A request failed. `id` is `None` for creates and loads.
    Failed {
        operation: SyncOperation,
        id: Option<OverlayId>,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// SyncEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out channel for [`SyncEvent`]s.
///
/// Slow subscribers observe `RecvError::Lagged` once the buffer fills;
/// events are never queued for receivers that do not exist yet.
#[derive(Debug, Clone)]
pub struct SyncEventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl SyncEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: SyncEvent) {
        // Only fails when nobody is listening.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl Default for SyncEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
