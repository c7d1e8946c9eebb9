//! Integration tests for the Avira Vastra storefront client.
//!
//! The tests drive the real client against [`FakeBackend`], an in-process
//! HTTP server that answers scripted JSON and records every request.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p avira-vastra-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `gateway` - Request shaping, auth headers, error mapping, caching
//! - `checkout` - Full checkout runs from bag to confirmation
//! - `persistence` - State surviving a restart on disk

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::task::JoinHandle;

use avira_vastra_storefront::config::StorefrontConfig;

/// Payment key the fake configuration carries.
pub const TEST_KEY_ID: &str = "rzp_test_fake";

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    /// The body parsed as JSON, or `Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct Shared {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process backend that answers scripted responses.
///
/// Unscripted routes answer 404 with `{"message": "Not found"}`.
pub struct FakeBackend {
    addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake backend address");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Self { addr, shared, task }
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn on(&self, method: Method, path: &str, status: StatusCode, body: &Value) {
        self.on_raw(method, path, status, &body.to_string());
    }

    /// Answer `method path` with `status` and a raw body.
    pub fn on_raw(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        lock(&self.shared.routes).insert(
            (method, path.to_string()),
            Reply {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Base URL of the fake API, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.shared.requests).clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }

    /// How many times `method path` was requested.
    #[must_use]
    pub fn hits(&self, method: &Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self, state_dir: &Path) -> StorefrontConfig {
        let vars = HashMap::from([
            ("AVIRA_API_BASE_URL", self.api_url()),
            ("AVIRA_STATE_DIR", state_dir.display().to_string()),
            ("AVIRA_REQUEST_TIMEOUT_SECS", "5".to_string()),
            ("RAZORPAY_KEY_ID", TEST_KEY_ID.to_string()),
        ]);
        StorefrontConfig::from_lookup(|name| vars.get(name).cloned())
            .expect("Failed to build test configuration")
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    lock(&shared.requests).push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body,
    });

    let reply = lock(&shared.routes)
        .get(&(method, uri.path().to_string()))
        .cloned();

    match reply {
        Some(reply) => (
            reply.status,
            [(header::CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"message":"Not found"}"#,
        )
            .into_response(),
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product record as the backend returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: u32, discounted: Option<u32>, stock: u32) -> Value {
    let mut product = serde_json::json!({
        "_id": id,
        "name": name,
        "price": price,
        "stock": stock,
        "images": [format!("/uploads/{id}.jpg")],
        "isActive": true
    });
    if let (Some(discounted), Some(map)) = (discounted, product.as_object_mut()) {
        map.insert("discountedPrice".to_string(), discounted.into());
    }
    product
}

/// A customer auth response.
#[must_use]
pub fn auth_json(token: &str) -> Value {
    serde_json::json!({
        "token": token,
        "user": {
            "_id": "u-meera",
            "name": "Meera Shah",
            "email": "meera@example.in",
            "phone": "9876543210",
            "address": {
                "street": "14 Koregaon Park",
                "city": "Pune",
                "state": "Maharashtra",
                "pincode": "411001"
            }
        }
    })
}
