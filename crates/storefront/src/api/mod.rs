//! REST client for the Avira Vastra backend.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process; clones share the HTTP pool and cache
//! - Bearer token read from the session at request time, so a login or
//!   logout takes effect on the next call without rebuilding the client
//! - Catalog reads cached via `moka` (5 minute TTL); catalog writes
//!   invalidate the whole cache
//! - Responses may be bare or wrapped in `{ "data": … }`; both decode
//!
//! # Scopes
//!
//! A client built with [`ApiClient::with_session`] authenticates as the
//! customer. [`ApiClient::as_admin`] returns a client sharing the same pool
//! and cache that authenticates with the back-office token instead.
//!
//! # Example
//!
//! ```rust,ignore
//! let api = ApiClient::new(&config.api)?.with_session(session.clone());
//! let products = api.list_products(&ProductFilters::storefront()).await?;
//! ```

mod admin;
mod auth;
mod catalog;
mod gateway;
mod health;
mod orders;

pub use gateway::{CheckoutGateway, OrderLookup};
#[cfg(test)]
pub use gateway::{MockCheckoutGateway, MockOrderLookup};
pub use health::health_url;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;
use crate::services::session::{AdminSessionHandle, SessionHandle};

/// Message shown when the backend gives no usable error text.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Message shown for transport failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;
const ERROR_BODY_LOG_LIMIT: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the generic fallback.
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot carry request paths.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The caller supplied a value the request cannot carry. Nothing was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A sign-in response arrived without a bearer token.
    #[error("Sign-in response did not include a token")]
    MissingToken,
}

impl ApiError {
    /// Build an API error from a non-2xx response body.
    ///
    /// Uses the body's `message` field, then `error`, then the fallback.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"].iter().find_map(|field| {
                    value
                        .get(field)
                        .and_then(serde_json::Value::as_str)
                        .filter(|m| !m.trim().is_empty())
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

        Self::Api { status, message }
    }

    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Parse(_) | Self::InvalidBaseUrl(_) | Self::MissingToken => {
                FALLBACK_ERROR_MESSAGE.to_string()
            }
            Self::InvalidInput(message) => message.clone(),
        }
    }

    /// HTTP status, for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error is an HTTP 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Whether the error points at a client or backend bug rather than a
    /// user-facing condition.
    const fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Parse(_) | Self::InvalidBaseUrl(_) | Self::MissingToken
        ) || matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Where the bearer token for a request comes from.
#[derive(Debug, Clone, Default)]
pub enum AuthSource {
    /// No `Authorization` header.
    #[default]
    Anonymous,
    /// The customer session token.
    Customer(SessionHandle),
    /// The back-office session token.
    Admin(AdminSessionHandle),
}

impl AuthSource {
    /// Cache partition. Back-office responses are never served to the
    /// storefront scopes.
    const fn cache_scope(&self) -> &'static str {
        match self {
            Self::Anonymous | Self::Customer(_) => "public",
            Self::Admin(_) => "admin",
        }
    }

    fn token(&self) -> Option<SecretString> {
        match self {
            Self::Anonymous => None,
            Self::Customer(session) => session.token(),
            Self::Admin(session) => session.token(),
        }
    }
}

/// Client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    auth: AuthSource,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
    cache: Cache<String, serde_json::Value>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create an anonymous client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry paths or the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("avira-vastra/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                request_timeout: config.request_timeout,
                cache,
            }),
            auth: AuthSource::Anonymous,
        })
    }

    /// A client sharing this one's pool and cache that authenticates as the
    /// customer in `session`.
    #[must_use]
    pub fn with_session(&self, session: SessionHandle) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            auth: AuthSource::Customer(session),
        }
    }

    /// A client sharing this one's pool and cache that authenticates with
    /// the back-office token.
    #[must_use]
    pub fn as_admin(&self, session: AdminSessionHandle) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            auth: AuthSource::Admin(session),
        }
    }

    /// The configured API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL for `segments` under the base URL.
    ///
    /// Segments are percent-encoded, so IDs cannot escape their position in
    /// the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build a request with auth and the default timeout applied.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request_without_timeout(method, url)
            .timeout(self.inner.request_timeout)
    }

    /// Build a request with auth but no transport timeout.
    fn request_without_timeout(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.inner.http.request(method, url);
        match self.auth.token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode the payload.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let value = self.send_raw(request).await?;
        decode(value).inspect_err(report)
    }

    /// Send a request and return the parsed JSON body.
    async fn send_raw(&self, request: RequestBuilder) -> Result<serde_json::Value, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Backend request failed");
            let error = ApiError::Network(e);
            report(&error);
            error
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await.map_err(|e| {
            let error = ApiError::Network(e);
            report(&error);
            error
        })?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %url,
                body = %body.chars().take(ERROR_BODY_LOG_LIMIT).collect::<String>(),
                "Backend returned non-success status"
            );
            let error = ApiError::from_response(status.as_u16(), &body);
            report(&error);
            return Err(error);
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %url,
                body = %body.chars().take(ERROR_BODY_LOG_LIMIT).collect::<String>(),
                "Failed to parse backend response"
            );
            let error = ApiError::Parse(e);
            report(&error);
            error
        })
    }

    /// GET `segments`, decoding the payload.
    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url)).await
    }

    /// GET through the catalog cache.
    async fn get_cached<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let cache_key = format!("catalog:{}:{url}", self.auth.cache_scope());

        if let Some(value) = self.inner.cache.get(&cache_key).await {
            tracing::debug!(key = %cache_key, "Cache hit");
            return decode(value);
        }

        let value = self.send_raw(self.request(Method::GET, url)).await?;
        let decoded = decode(value.clone())?;
        self.inner.cache.insert(cache_key, value).await;
        Ok(decoded)
    }

    /// Send a JSON body with `method`, decoding the payload.
    async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        self.send(self.request(method, url).json(body)).await
    }

    /// DELETE `segments`, ignoring any response body.
    async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        self.send_raw(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        tracing::debug!("Invalidating catalog cache");
        self.inner.cache.invalidate_all();
    }
}

/// Decode a payload that may be wrapped in `{ "data": … }`.
fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    if let serde_json::Value::Object(map) = &value
        && let Some(inner) = map.get("data")
        && let Ok(decoded) = T::deserialize(inner)
    {
        return Ok(decoded);
    }
    Ok(serde_json::from_value(value)?)
}

/// Send unexpected failures to Sentry.
fn report(error: &ApiError) {
    if error.is_unexpected() {
        let event_id = sentry::capture_error(error);
        tracing::debug!(sentry_event_id = %event_id, "Reported backend error");
    }
}
