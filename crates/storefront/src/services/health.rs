//! Backend connection monitor.
//!
//! Polls the health endpoint on a background task and publishes the latest
//! [`ConnectionStatus`] over a `watch` channel. Readers never wait on the
//! network.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, ApiError};

/// Body status reported by a healthy backend.
const HEALTHY: &str = "success";

/// Reachability of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    /// No probe has finished yet.
    #[default]
    Checking,
    /// The backend reports itself healthy.
    Connected,
    /// The backend answered but is not healthy.
    Error,
    /// The backend could not be reached.
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checking => "Connecting to backend...",
            Self::Connected => "Backend connected",
            Self::Error => "Backend error",
            Self::Disconnected => "Backend offline",
        })
    }
}

/// Probe the backend once.
pub async fn check_once(api: &ApiClient) -> ConnectionStatus {
    match api.health_check().await {
        Ok(response) if response.status == HEALTHY => ConnectionStatus::Connected,
        Ok(response) => {
            tracing::warn!(status = %response.status, "Backend reports unhealthy");
            ConnectionStatus::Error
        }
        Err(ApiError::Network(e)) => {
            tracing::warn!(error = %e, "Backend unreachable");
            ConnectionStatus::Disconnected
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            ConnectionStatus::Error
        }
    }
}

/// Background health poller. Dropping it stops the task.
#[derive(Debug)]
pub struct HealthMonitor {
    status: watch::Receiver<ConnectionStatus>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Start polling every `interval`, beginning immediately.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(api: ApiClient, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(ConnectionStatus::Checking);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = tx.closed() => break,
                }

                let status = check_once(&api).await;
                tx.send_if_modified(|current| {
                    if *current == status {
                        return false;
                    }
                    tracing::info!(from = ?current, to = ?status, "Backend status changed");
                    *current = status;
                    true
                });
            }
        });

        Self { status: rx, task }
    }

    /// Latest known status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// A receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
