//! The remote overlay store as seen by the client.
//!
//! [`RemoteStore`] is the seam between the sync layer and the network. The
//! production implementation is [`HttpOverlayStore`](crate::http::HttpOverlayStore);
//! tests substitute in-process fakes.

use std::future::Future;

use serde::{Deserialize, Serialize};

use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayPatch};
use overlaycast_core::types::OverlayId;

/// Errors from talking to the remote store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Overlay store error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured base URL cannot address the overlay endpoints.
    #[error("Invalid overlay store URL: {0}")]
    InvalidUrl(String),
}

/// An update response: the id plus whichever fields the store sent back.
///
/// Merging goes field by field, so a store that answers a partial patch with
/// a partial entity cannot blank out fields it did not mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOverlay {
    pub id: OverlayId,
    #[serde(flatten)]
    pub fields: OverlayPatch,
}

impl From<Overlay> for RemoteOverlay {
    fn from(overlay: Overlay) -> Self {
        let fields = OverlayPatch {
            name: Some(overlay.name),
            kind: Some(overlay.kind),
            content: Some(overlay.content),
            x: Some(overlay.x),
            y: Some(overlay.y),
            width: Some(overlay.width),
            height: Some(overlay.height),
            visible: Some(overlay.visible),
        };
        Self {
            id: overlay.id,
            fields,
        }
    }
}

/// CRUD operations the sync layer needs from the overlay store.
pub trait RemoteStore: Send + Sync {
    /// `GET /overlays`: every overlay, in creation order.
    fn list(&self) -> impl Future<Output = Result<Vec<Overlay>, RemoteError>> + Send;

    /// `POST /overlays`: persist a new overlay and return it with its id.
    fn create(
        &self,
        overlay: &NewOverlay,
    ) -> impl Future<Output = Result<Overlay, RemoteError>> + Send;

    /// `PUT /overlays/{id}`: apply a partial patch.
    fn update(
        &self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> impl Future<Output = Result<RemoteOverlay, RemoteError>> + Send;

    /// `DELETE /overlays/{id}`.
    fn delete(&self, id: &OverlayId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
