//! Overlay row model.

use overlaycast_core::error::CoreError;
use overlaycast_core::overlay::{Overlay, OverlayKind};
use overlaycast_core::types::{OverlayId, Timestamp};
use sqlx::FromRow;

/// A row from the `overlays` table.
#[derive(Debug, Clone, FromRow)]
pub struct OverlayRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub content: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub visible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<OverlayRow> for Overlay {
    type Error = CoreError;

    fn try_from(row: OverlayRow) -> Result<Self, Self::Error> {
        Ok(Overlay {
            id: OverlayId::new(row.id),
            name: row.name,
            kind: OverlayKind::from_str(&row.kind)?,
            content: row.content,
            x: row.x,
            y: row.y,
            width: row.width,
            height: row.height,
            visible: row.visible,
        })
    }
}
