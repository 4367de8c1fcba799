//! REST client for the overlay store.
//!
//! Talks to the `/overlays` endpoints served by `overlaycast-api` (or any
//! store honouring the same contract) using [`reqwest`].

use reqwest::Url;

use overlaycast_core::overlay::{NewOverlay, Overlay, OverlayPatch};
use overlaycast_core::types::OverlayId;

use crate::config::ClientConfig;
use crate::remote::{RemoteError, RemoteOverlay, RemoteStore};

/// HTTP-backed [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct HttpOverlayStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOverlayStore {
    /// Create a store client with the configured base URL and timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_client(client, &config.api_url)
    }

    /// Create a store client reusing an existing [`reqwest::Client`].
    ///
    /// * `api_url` - Base URL without the `/overlays` segment, e.g.
    ///   `http://localhost:5000/api`.
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Result<Self, RemoteError> {
        let base_url = Url::parse(api_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(api_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/overlays` or `{base}/overlays/{id}`, with the id percent-encoded.
    fn overlays_url(&self, id: Option<&OverlayId>) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("overlays");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`RemoteError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), RemoteError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

impl RemoteStore for HttpOverlayStore {
    async fn list(&self) -> Result<Vec<Overlay>, RemoteError> {
        let url = self.overlays_url(None)?;
        tracing::debug!(%url, "Fetching overlays");
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    async fn create(&self, overlay: &NewOverlay) -> Result<Overlay, RemoteError> {
        let url = self.overlays_url(None)?;
        tracing::debug!(%url, name = %overlay.name, "Creating overlay");
        let response = self.client.post(url).json(overlay).send().await?;
        Self::parse_response(response).await
    }

    async fn update(
        &self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<RemoteOverlay, RemoteError> {
        let url = self.overlays_url(Some(id))?;
        tracing::debug!(%url, "Updating overlay");
        let response = self.client.put(url).json(patch).send().await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, id: &OverlayId) -> Result<(), RemoteError> {
        let url = self.overlays_url(Some(id))?;
        tracing::debug!(%url, "Deleting overlay");
        let response = self.client.delete(url).send().await?;
        Self::check_status(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn store(api_url: &str) -> HttpOverlayStore {
        HttpOverlayStore::with_client(reqwest::Client::new(), api_url).unwrap()
    }

    #[test]
    fn collection_url_appends_overlays_segment() {
        let url = store("http://localhost:5000/api").overlays_url(None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/overlays");
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let url = store("http://localhost:5000/api/").overlays_url(None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/overlays");
    }

    #[test]
    fn item_url_percent_encodes_id() {
        let id = OverlayId::new("a b/c");
        let url = store("http://localhost:5000/api")
            .overlays_url(Some(&id))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/overlays/a%20b%2Fc");
    }

    #[test]
    fn unparseable_base_rejected() {
        let result = HttpOverlayStore::with_client(reqwest::Client::new(), "not a url");
        assert_matches!(result, Err(RemoteError::InvalidUrl(_)));
    }

    #[test]
    fn non_hierarchical_base_rejected() {
        let result = HttpOverlayStore::with_client(reqwest::Client::new(), "mailto:ops@example.com");
        assert_matches!(result, Err(RemoteError::InvalidUrl(_)));
    }
}
