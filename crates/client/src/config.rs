use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the overlay store, without the `/overlays` segment.
    pub api_url: String,
    /// Per-request timeout. A timed-out request takes the failure path.
    pub request_timeout_secs: u64,
    /// Revert optimistic changes when the store rejects them.
    pub rollback_on_failure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 10,
            rollback_on_failure: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                     |
    /// |--------------------------------|-----------------------------|
    /// | `OVERLAY_API_URL`              | `http://localhost:5000/api` |
    /// | `OVERLAY_REQUEST_TIMEOUT_SECS` | `10`                        |
    /// | `OVERLAY_ROLLBACK_ON_FAILURE`  | `true`                      |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("OVERLAY_API_URL").unwrap_or(defaults.api_url);

        let request_timeout_secs: u64 = std::env::var("OVERLAY_REQUEST_TIMEOUT_SECS")
            .map(|v| {
                v.parse()
                    .expect("OVERLAY_REQUEST_TIMEOUT_SECS must be a valid u64")
            })
            .unwrap_or(defaults.request_timeout_secs);

        let rollback_on_failure = std::env::var("OVERLAY_ROLLBACK_ON_FAILURE")
            .map(|v| parse_flag(&v).expect("OVERLAY_ROLLBACK_ON_FAILURE must be true or false"))
            .unwrap_or(defaults.rollback_on_failure);

        Self {
            api_url,
            request_timeout_secs,
            rollback_on_failure,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
