//! Application state shared across the client.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::checkout::{Checkout, CheckoutEntry, CheckoutSettings};
use crate::config::{ConfigError, StorefrontConfig};
use crate::services::{AdminSessionHandle, CartHandle, HealthMonitor, SessionHandle};
use crate::store::{FileStore, StateStore};

/// Application state shared across the client.
///
/// This struct is cheaply cloneable via `Arc`. The cart and both sessions
/// are rehydrated from the state store once, at construction.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn StateStore>,
    cart: CartHandle,
    session: SessionHandle,
    admin_session: AdminSessionHandle,
    api: ApiClient,
    admin_api: ApiClient,
}

impl AppState {
    /// Create application state backed by files under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL cannot be used.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn StateStore> = Arc::new(FileStore::new(config.state_dir.clone()));
        Self::with_store(config, store)
    }

    /// Create application state on top of an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL cannot be used.
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn StateStore>) -> Result<Self, ApiError> {
        let cart = CartHandle::load(Arc::clone(&store));
        let session = SessionHandle::load(Arc::clone(&store));
        let admin_session = AdminSessionHandle::load(Arc::clone(&store));

        let base = ApiClient::new(&config.api)?;
        let api = base.with_session(session.clone());
        let admin_api = base.as_admin(admin_session.clone());

        tracing::debug!(
            cart_items = cart.item_count(),
            signed_in = session.is_authenticated(),
            "Rehydrated client state"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                cart,
                session,
                admin_session,
                api,
                admin_api,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persisted state store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn cart(&self) -> &CartHandle {
        &self.inner.cart
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    #[must_use]
    pub fn admin_session(&self) -> &AdminSessionHandle {
        &self.inner.admin_session
    }

    /// API client carrying the customer's token.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// API client carrying the back-office token.
    #[must_use]
    pub fn admin_api(&self) -> &ApiClient {
        &self.inner.admin_api
    }

    /// Payment settings for a checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if no payment key is configured.
    pub fn checkout_settings(&self) -> Result<CheckoutSettings, ConfigError> {
        CheckoutSettings::from_config(&self.inner.config.payment)
    }

    /// Open a checkout over the current cart and session.
    ///
    /// # Errors
    ///
    /// Returns an error if no payment key is configured.
    pub fn begin_checkout(&self) -> Result<CheckoutEntry, ConfigError> {
        let settings = self.checkout_settings()?;
        Ok(Checkout::enter(
            self.inner.cart.clone(),
            self.inner.session.clone(),
            settings,
        ))
    }

    /// Start the background health monitor at the configured interval.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn_health_monitor(&self) -> HealthMonitor {
        HealthMonitor::spawn(self.inner.api.clone(), self.inner.config.health_interval)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::services::cart::tests::product;
    use crate::services::session::tests::user;
    use crate::store::MemoryStore;

    fn config(key_id: Option<&str>) -> StorefrontConfig {
        let mut vars = HashMap::from([("AVIRA_API_BASE_URL", "http://localhost:5000/api".to_string())]);
        if let Some(key) = key_id {
            vars.insert("RAZORPAY_KEY_ID", key.to_string());
        }
        StorefrontConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
    }

    #[test]
    fn test_state_rehydrates_from_store() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        let first = AppState::with_store(config(None), Arc::clone(&store)).unwrap();
        first.cart().add_item(&product("p1", 1500, None), 2);
        first.session().login(user(), "tok");

        let second = AppState::with_store(config(None), store).unwrap();
        assert_eq!(second.cart().item_count(), 2);
        assert!(second.session().is_authenticated());
        assert!(!second.admin_session().is_authenticated());
    }

    #[test]
    fn test_begin_checkout_requires_payment_key() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        let state = AppState::with_store(config(None), Arc::clone(&store)).unwrap();
        assert!(matches!(
            state.begin_checkout(),
            Err(ConfigError::MissingEnvVar(_))
        ));

        let state = AppState::with_store(config(Some("rzp_test_abc")), store).unwrap();
        assert!(matches!(
            state.begin_checkout().unwrap(),
            CheckoutEntry::Redirect(_)
        ));
    }
}
