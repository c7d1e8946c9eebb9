//! Backend liveness probe.

use reqwest::Method;
use tracing::instrument;
use url::Url;

use super::{ApiClient, ApiError};
use crate::models::HealthResponse;

/// Health endpoint for an API base: the first `/api` in the path becomes
/// `/health`.
///
/// Only the path is rewritten, so a host such as `api.example.in` is left
/// alone. A base without `/api` is probed at `<base>/health`.
#[must_use]
pub fn health_url(base: &Url) -> Url {
    let path = base.path();
    let health_path = if path.contains("/api") {
        path.replacen("/api", "/health", 1)
    } else {
        format!("{}/health", path.trim_end_matches('/'))
    };

    let mut url = base.clone();
    url.set_path(&health_path);
    url.set_query(None);
    url
}

impl ApiClient {
    /// Probe the backend health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or answers with a
    /// non-2xx status.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<HealthResponse, ApiError> {
        let url = health_url(self.base_url());
        self.send(self.request(Method::GET, url)).await
    }
}
