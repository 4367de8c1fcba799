use std::sync::Arc;

use overlaycast_db::OverlayRepository;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Overlay persistence backend (PostgreSQL or in-memory).
    pub overlays: Arc<dyn OverlayRepository>,
    pub config: Arc<ServerConfig>,
}
