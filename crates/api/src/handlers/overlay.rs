//! Handlers for the overlay CRUD surface.
//!
//! Bodies are plain overlays (no envelope) so any client written against
//! the store contract can talk to this server.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use overlaycast_core::error::CoreError;
use overlaycast_core::overlay::{NewOverlay, OverlayPatch};
use overlaycast_core::types::OverlayId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Fields a create request must carry. `type` and `visible` default.
const REQUIRED_CREATE_FIELDS: &[&str] = &["name", "content", "x", "y", "width", "height"];

/// Body returned by a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

/// GET /overlays
///
/// List every overlay in creation order.
pub async fn list_overlays(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let overlays = state.overlays.list().await?;
    Ok(Json(overlays))
}

/// POST /overlays
///
/// Create an overlay. The store assigns the id.
pub async fn create_overlay(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let input = parse_create_body(body)?;
    input.validate()?;

    let overlay = state.overlays.create(&input).await?;

    tracing::info!(
        overlay_id = %overlay.id,
        kind = overlay.kind.as_str(),
        "Overlay created"
    );

    Ok((StatusCode::CREATED, Json(overlay)))
}

/// GET /overlays/{id}
pub async fn get_overlay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = OverlayId::new(id);
    let overlay = state
        .overlays
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(overlay))
}

/// PUT /overlays/{id}
///
/// Apply a partial patch and return the full updated overlay. The patched
/// overlay must pass the same validation as a create.
pub async fn update_overlay(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let id = OverlayId::new(id);
    let patch: OverlayPatch = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("invalid overlay patch: {e}")))?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let mut candidate = state
        .overlays
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    candidate.apply_patch(&patch);
    candidate.validate()?;

    let overlay = state
        .overlays
        .update(&id, &patch)
        .await?
        .ok_or_else(|| not_found(&id))?;

    tracing::info!(overlay_id = %id, patch = ?patch, "Overlay updated");

    Ok(Json(overlay))
}

/// DELETE /overlays/{id}
pub async fn delete_overlay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = OverlayId::new(id);
    if !state.overlays.delete(&id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(overlay_id = %id, "Overlay deleted");

    Ok(Json(DeleteResponse { status: "deleted" }))
}

fn not_found(id: &OverlayId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Overlay",
        id: id.to_string(),
    })
}

/// Check required keys first so a missing field reads as such rather than
/// as a generic decode failure.
fn parse_create_body(body: serde_json::Value) -> Result<NewOverlay, AppError> {
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::BadRequest("overlay must be a JSON object".to_string()))?;

    let missing: Vec<&str> = REQUIRED_CREATE_FIELDS
        .iter()
        .copied()
        .filter(|key| !obj.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "missing fields: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("invalid overlay: {e}")))
}
