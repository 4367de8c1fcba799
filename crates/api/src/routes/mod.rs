pub mod health;
pub mod overlay;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /overlays           list, create
/// /overlays/{id}      get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/overlays", overlay::router())
}
