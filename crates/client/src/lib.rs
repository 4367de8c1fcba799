//! Client side of the overlay editor.
//!
//! [`SyncController`](sync::SyncController) owns the local
//! [`OverlayStore`](overlaycast_core::store::OverlayStore), applies every
//! mutation to it immediately and reconciles with a [`RemoteStore`]
//! (normally the HTTP one in [`http`]) as responses come back.
//! [`Dashboard`](dashboard::Dashboard) wires the controller to the gesture
//! engine, the create/edit form and the stream attachment.

pub mod config;
pub mod dashboard;
pub mod events;
pub mod http;
pub mod remote;
pub mod sync;

pub use remote::{RemoteError, RemoteOverlay, RemoteStore};
