//! Persisted client state.
//!
//! Application state that must survive a restart (cart contents, the auth
//! session) is written through a [`StateStore`] as JSON values keyed by name.
//!
//! ## Keys
//!
//! - `auth-storage` - Customer session (user, token, authentication flag)
//! - `cart-storage` - Cart line items
//! - `token` - Raw customer token written alongside the session
//! - `adminToken` / `adminData` - Back-office session
//!
//! Every value is wrapped in a [`PersistEnvelope`] so that the stored shape
//! can be versioned independently of the in-memory types.
//!
//! # Backends
//!
//! - [`FileStore`] - One JSON file per key under a state directory
//! - [`MemoryStore`] - Process-local map, used by tests and ephemeral tools

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Customer session.
    pub const AUTH: &str = "auth-storage";

    /// Cart line items.
    pub const CART: &str = "cart-storage";

    /// Raw customer token, purged on logout.
    pub const TOKEN: &str = "token";

    /// Back-office token.
    pub const ADMIN_TOKEN: &str = "adminToken";

    /// Back-office user record.
    pub const ADMIN_DATA: &str = "adminData";
}

/// Current persisted state version.
pub const STATE_VERSION: u32 = 0;

/// Errors that can occur when reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Stored value could not be encoded or decoded.
    #[error("serialization error for key {key}: {source}")]
    Serialization {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Key contains characters that are not allowed in a file name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Key/value persistence for serializable client state.
pub trait StateStore: Send + Sync {
    /// Load the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or holds invalid JSON.
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Versioned wrapper around every persisted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistEnvelope<T> {
    /// The persisted state.
    pub state: T,
    /// Shape version of `state`.
    #[serde(default)]
    pub version: u32,
}

/// Load and decode the state stored under `key`.
///
/// Returns `Ok(None)` when nothing is stored.
///
/// # Errors
///
/// Returns an error if the backend fails or the stored value does not match `T`.
pub fn load_state<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };

    let envelope: PersistEnvelope<T> =
        serde_json::from_value(raw).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;

    Ok(Some(envelope.state))
}

/// Encode `state` and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the backend write fails.
pub fn save_state<T: Serialize>(
    store: &dyn StateStore,
    key: &str,
    state: &T,
) -> Result<(), StoreError> {
    let envelope = PersistEnvelope {
        state,
        version: STATE_VERSION,
    };
    let value = serde_json::to_value(&envelope).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &value)
}

/// Rehydrate `key`, falling back to the default state on any failure.
///
/// A corrupt entry must not keep the application from starting, so errors
/// are reported and swallowed here.
pub fn rehydrate<T: DeserializeOwned + Default>(store: &dyn StateStore, key: &str) -> T {
    match load_state(store, key) {
        Ok(Some(state)) => state,
        Ok(None) => T::default(),
        Err(e) => {
            crate::error::report_store_error(&e);
            tracing::warn!(key, error = %e, "Discarding unreadable persisted state");
            T::default()
        }
    }
}

/// Persist `state` under `key`, logging instead of failing.
pub fn persist<T: Serialize>(store: &dyn StateStore, key: &str, state: &T) {
    if let Err(e) = save_state(store, key, state) {
        crate::error::report_store_error(&e);
        tracing::warn!(key, error = %e, "Failed to persist state");
    }
}
