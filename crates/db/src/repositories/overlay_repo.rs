//! PostgreSQL repository for the `overlays` table.

use async_trait::async_trait;
use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayPatch};
use overlaycast_core::types::OverlayId;

use super::{new_overlay_id, OverlayRepository, RepoError};
use crate::models::overlay::OverlayRow;
use crate::DbPool;

/// Column list for overlays queries.
const COLUMNS: &str = "id, name, kind, content, x, y, width, height, visible, \
    created_at, updated_at";

/// Overlay CRUD backed by PostgreSQL.
#[derive(Clone)]
pub struct PgOverlayRepo {
    pool: DbPool,
}

impl PgOverlayRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OverlayRepository for PgOverlayRepo {
    /// List all overlays, oldest first.
    async fn list(&self) -> Result<Vec<Overlay>, RepoError> {
        let query = format!("SELECT {COLUMNS} FROM overlays ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query_as::<_, OverlayRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| Overlay::try_from(row).map_err(RepoError::from))
            .collect()
    }

    async fn find_by_id(&self, id: &OverlayId) -> Result<Option<Overlay>, RepoError> {
        let query = format!("SELECT {COLUMNS} FROM overlays WHERE id = $1");
        let row = sqlx::query_as::<_, OverlayRow>(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Overlay::try_from).transpose()?)
    }

    async fn create(&self, input: &NewOverlay) -> Result<Overlay, RepoError> {
        let query = format!(
            "INSERT INTO overlays
                (id, name, kind, content, x, y, width, height, visible)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, OverlayRow>(&query)
            .bind(new_overlay_id().as_str())
            .bind(&input.name)
            .bind(input.kind.as_str())
            .bind(&input.content)
            .bind(input.x)
            .bind(input.y)
            .bind(input.width)
            .bind(input.height)
            .bind(input.visible)
            .fetch_one(&self.pool)
            .await?;
        Ok(Overlay::try_from(row)?)
    }

    /// Update the fields present in `patch`, leaving the others untouched.
    async fn update(
        &self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<Option<Overlay>, RepoError> {
        let query = format!(
            "UPDATE overlays SET
                name = COALESCE($2, name),
                kind = COALESCE($3, kind),
                content = COALESCE($4, content),
                x = COALESCE($5, x),
                y = COALESCE($6, y),
                width = COALESCE($7, width),
                height = COALESCE($8, height),
                visible = COALESCE($9, visible),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, OverlayRow>(&query)
            .bind(id.as_str())
            .bind(patch.name.as_deref())
            .bind(patch.kind.map(|k| k.as_str()))
            .bind(patch.content.as_deref())
            .bind(patch.x)
            .bind(patch.y)
            .bind(patch.width)
            .bind(patch.height)
            .bind(patch.visible)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Overlay::try_from).transpose()?)
    }

    /// Delete an overlay. Returns `true` if a row was removed.
    async fn delete(&self, id: &OverlayId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM overlays WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_healthy(&self) -> bool {
        match crate::health_check(&self.pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        }
    }
}
