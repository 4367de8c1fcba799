//! In-process overlay repository.
//!
//! Used when no `DATABASE_URL` is configured and by the HTTP tests. State
//! lives for the lifetime of the process.

use async_trait::async_trait;
use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayPatch};
use overlaycast_core::types::OverlayId;
use tokio::sync::RwLock;

use super::{new_overlay_id, OverlayRepository, RepoError};

/// Overlay CRUD over a `Vec` kept in creation order.
#[derive(Default)]
pub struct MemoryOverlayRepo {
    overlays: RwLock<Vec<Overlay>>,
}

impl MemoryOverlayRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing overlays, ids included.
    pub fn with_overlays(overlays: Vec<Overlay>) -> Self {
        Self {
            overlays: RwLock::new(overlays),
        }
    }
}

#[async_trait]
impl OverlayRepository for MemoryOverlayRepo {
    async fn list(&self) -> Result<Vec<Overlay>, RepoError> {
        Ok(self.overlays.read().await.clone())
    }

    async fn find_by_id(&self, id: &OverlayId) -> Result<Option<Overlay>, RepoError> {
        Ok(self
            .overlays
            .read()
            .await
            .iter()
            .find(|o| &o.id == id)
            .cloned())
    }

    async fn create(&self, input: &NewOverlay) -> Result<Overlay, RepoError> {
        let overlay = input.clone().into_overlay(new_overlay_id());
        self.overlays.write().await.push(overlay.clone());
        Ok(overlay)
    }

    async fn update(
        &self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<Option<Overlay>, RepoError> {
        let mut overlays = self.overlays.write().await;
        Ok(overlays.iter_mut().find(|o| &o.id == id).map(|overlay| {
            overlay.apply_patch(patch);
            overlay.clone()
        }))
    }

    async fn delete(&self, id: &OverlayId) -> Result<bool, RepoError> {
        let mut overlays = self.overlays.write().await;
        let before = overlays.len();
        overlays.retain(|o| &o.id != id);
        Ok(overlays.len() != before)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> NewOverlay {
        NewOverlay {
            name: name.to_string(),
            ..NewOverlay::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_in_order() {
        let repo = MemoryOverlayRepo::new();
        let a = repo.create(&input("A")).await.unwrap();
        let b = repo.create(&input("B")).await.unwrap();

        assert_ne!(a.id, b.id);
        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|o| o.name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn update_applies_partial_patch() {
        let repo = MemoryOverlayRepo::new();
        let created = repo.create(&input("A")).await.unwrap();

        let updated = repo
            .update(&created.id, &OverlayPatch::visibility(false))
            .await
            .unwrap()
            .unwrap();

        assert!(!updated.visible);
        assert_eq!(updated.name, "A");
        assert_eq!(updated.width, 200);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let repo = MemoryOverlayRepo::new();
        let result = repo
            .update(&OverlayId::new("nope"), &OverlayPatch::position(1, 2))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let repo = MemoryOverlayRepo::new();
        let created = repo.create(&input("A")).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(!repo.delete(&created.id).await.unwrap());
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeded_overlays_are_listed() {
        let seeded = input("S").into_overlay(OverlayId::new("seed"));
        let repo = MemoryOverlayRepo::with_overlays(vec![seeded.clone()]);
        assert_eq!(repo.list().await.unwrap(), vec![seeded]);
        assert!(repo.is_healthy().await);
    }
}
