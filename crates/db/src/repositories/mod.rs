//! Overlay repositories.

mod memory_overlay_repo;
mod overlay_repo;

use async_trait::async_trait;
use overlaycast_core::error::CoreError;
use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayPatch};
use overlaycast_core::types::OverlayId;

pub use memory_overlay_repo::MemoryOverlayRepo;
pub use overlay_repo::PgOverlayRepo;

/// Errors raised by a repository backend.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back onto the domain type.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// CRUD surface over the persisted overlay collection.
///
/// `list` returns overlays in creation order. `update` and `delete` report
/// a missing id as `Ok(None)` / `Ok(false)` and leave the status mapping to
/// the caller.
#[async_trait]
pub trait OverlayRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Overlay>, RepoError>;

    async fn find_by_id(&self, id: &OverlayId) -> Result<Option<Overlay>, RepoError>;

    async fn create(&self, input: &NewOverlay) -> Result<Overlay, RepoError>;

    async fn update(
        &self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<Option<Overlay>, RepoError>;

    async fn delete(&self, id: &OverlayId) -> Result<bool, RepoError>;

    /// `true` when the backend can serve requests.
    async fn is_healthy(&self) -> bool;
}

/// Generate a fresh store-assigned overlay id.
pub(crate) fn new_overlay_id() -> OverlayId {
    OverlayId::new(uuid::Uuid::now_v7().to_string())
}
