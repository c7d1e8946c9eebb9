//! Customer and back-office sessions.
//!
//! Sessions are persisted so a restart keeps the user signed in. The customer
//! session lives under `auth-storage` with the raw token mirrored under
//! `token`; the back-office session uses `adminToken` and `adminData`.
//!
//! `is_authenticated` is derived from the presence of a user and token. The
//! persisted flag is written for compatibility but recomputed on rehydrate.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{AdminUser, User};
use crate::store::{self, StateStore, keys};

/// Persisted shape of the customer session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
}

#[derive(Default)]
struct Session {
    user: Option<User>,
    token: Option<SecretString>,
}

impl Session {
    fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            token: self.token.as_ref().map(|t| t.expose_secret().to_string()),
            is_authenticated: self.is_authenticated(),
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(persisted: PersistedSession) -> Self {
        let token = persisted
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        // A user without a token (or the reverse) is treated as signed out
        if persisted.user.is_some() && token.is_some() {
            Self {
                user: persisted.user,
                token,
            }
        } else {
            Self::default()
        }
    }
}

/// Shared handle to the customer session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    session: RwLock<Session>,
    store: Arc<dyn StateStore>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("user", &self.user().map(|u| u.id))
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl SessionHandle {
    /// Rehydrate the session from `store`.
    #[must_use]
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let persisted: PersistedSession = store::rehydrate(store.as_ref(), keys::AUTH);
        let session = Session::from(persisted);
        if let Some(user) = &session.user {
            set_sentry_user(&user.id, Some(&user.email));
        }
        tracing::debug!(
            authenticated = session.is_authenticated(),
            "Session rehydrated"
        );
        Self {
            inner: Arc::new(SessionInner {
                session: RwLock::new(session),
                store,
            }),
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        let mut session = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut session);
        store::persist(
            self.inner.store.as_ref(),
            keys::AUTH,
            &session.to_persisted(),
        );
    }

    fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        let session = self
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Sign in with a user record and bearer token.
    ///
    /// An empty token is ignored; it could not survive a reload.
    pub fn login(&self, user: User, token: impl Into<String>) {
        let token: String = token.into();
        if token.is_empty() {
            tracing::warn!(user_id = %user.id, "Ignoring sign-in without a token");
            return;
        }
        set_sentry_user(&user.id, Some(&user.email));
        tracing::info!(user_id = %user.id, "Customer signed in");
        store::persist(self.inner.store.as_ref(), keys::TOKEN, &token);
        self.mutate(|session| {
            session.user = Some(user);
            session.token = Some(SecretString::from(token));
        });
    }

    /// Sign out and purge the stored token.
    pub fn logout(&self) {
        self.mutate(|session| *session = Session::default());
        if let Err(e) = self.inner.store.remove(keys::TOKEN) {
            tracing::warn!(error = %e, "Failed to remove stored token");
        }
        clear_sentry_user();
        tracing::info!("Customer signed out");
    }

    /// Replace the user record, keeping the token.
    ///
    /// Ignored when nobody is signed in.
    pub fn update_user(&self, user: User) {
        if !self.is_authenticated() {
            tracing::debug!("Ignoring user update without a session");
            return;
        }
        self.mutate(|session| session.user = Some(user));
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    /// The bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read(|s| s.token.clone())
    }

    /// Whether a user and token are both present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(Session::is_authenticated)
    }
}

// =============================================================================
// Back-office session
// =============================================================================

#[derive(Default)]
struct AdminSession {
    admin: Option<AdminUser>,
    token: Option<SecretString>,
}

/// Shared handle to the back-office session.
#[derive(Clone)]
pub struct AdminSessionHandle {
    inner: Arc<AdminSessionInner>,
}

struct AdminSessionInner {
    session: RwLock<AdminSession>,
    store: Arc<dyn StateStore>,
}

impl std::fmt::Debug for AdminSessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSessionHandle")
            .field("admin", &self.admin().map(|a| a.id))
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AdminSessionHandle {
    /// Rehydrate the back-office session from `store`.
    #[must_use]
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let token: Option<String> = store::rehydrate(store.as_ref(), keys::ADMIN_TOKEN);
        let admin: Option<AdminUser> = store::rehydrate(store.as_ref(), keys::ADMIN_DATA);
        let session = match (admin, token.filter(|t| !t.is_empty())) {
            (admin, Some(token)) => AdminSession {
                admin,
                token: Some(SecretString::from(token)),
            },
            _ => AdminSession::default(),
        };
        Self {
            inner: Arc::new(AdminSessionInner {
                session: RwLock::new(session),
                store,
            }),
        }
    }

    /// Sign in to the back-office. An empty token is ignored.
    pub fn login(&self, admin: AdminUser, token: impl Into<String>) {
        let token: String = token.into();
        if token.is_empty() {
            tracing::warn!(admin_id = %admin.id, "Ignoring back-office sign-in without a token");
            return;
        }
        let store = self.inner.store.as_ref();
        store::persist(store, keys::ADMIN_TOKEN, &token);
        store::persist(store, keys::ADMIN_DATA, &admin);
        tracing::info!(admin_id = %admin.id, "Admin signed in");

        let mut session = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        session.admin = Some(admin);
        session.token = Some(SecretString::from(token));
    }

    /// Sign out of the back-office.
    pub fn logout(&self) {
        {
            let mut session = self
                .inner
                .session
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *session = AdminSession::default();
        }
        for key in [keys::ADMIN_TOKEN, keys::ADMIN_DATA] {
            if let Err(e) = self.inner.store.remove(key) {
                tracing::warn!(error = %e, key, "Failed to remove admin state");
            }
        }
        tracing::info!("Admin signed out");
    }

    /// The signed-in administrator, if known.
    #[must_use]
    pub fn admin(&self) -> Option<AdminUser> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .admin
            .clone()
    }

    /// The back-office bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    /// Whether a back-office token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use avira_vastra_core::{AdminId, UserId};

    pub(crate) fn user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Meera Shah".to_string(),
            email: "meera@example.in".to_string(),
            phone: Some("9876543210".to_string()),
            address: None,
            role: None,
            avatar: None,
        }
    }

    #[test]
    fn test_login_then_reload() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionHandle::load(store.clone());
        assert!(!session.is_authenticated());

        session.login(user(), "tok-123");
        assert!(session.is_authenticated());

        let reloaded = SessionHandle::load(store.clone());
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user().unwrap().name, "Meera Shah");
        assert_eq!(reloaded.token().unwrap().expose_secret(), "tok-123");

        let raw = store.load(keys::AUTH).unwrap().unwrap();
        assert_eq!(raw["state"]["isAuthenticated"], true);
        assert!(store.contains(keys::TOKEN));
    }

    #[test]
    fn test_login_with_empty_token_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionHandle::load(store.clone());
        session.login(user(), "");

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(!store.contains(keys::TOKEN));
        assert_eq!(
            session.is_authenticated(),
            SessionHandle::load(store).is_authenticated()
        );
    }

    #[test]
    fn test_admin_login_with_empty_token_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let admin = AdminSessionHandle::load(store.clone());
        admin.login(
            AdminUser {
                id: AdminId::new("a1"),
                name: "Ops".to_string(),
                email: "ops@aviravastra.in".to_string(),
                role: None,
            },
            "",
        );

        assert!(!admin.is_authenticated());
        assert!(!store.contains(keys::ADMIN_TOKEN));
    }

    #[test]
    fn test_logout_purges_token() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionHandle::load(store.clone());
        session.login(user(), "tok-123");
        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(!store.contains(keys::TOKEN));
        assert!(!SessionHandle::load(store).is_authenticated());
    }

    #[test]
    fn test_persisted_flag_is_recomputed() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(
                keys::AUTH,
                &serde_json::json!({
                    "state": { "user": null, "token": "stale", "isAuthenticated": true },
                    "version": 0
                }),
            )
            .unwrap();

        let session = SessionHandle::load(store);
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_update_user_keeps_token() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionHandle::load(store);
        session.login(user(), "tok-123");

        let mut updated = user();
        updated.phone = Some("9000000000".to_string());
        session.update_user(updated);

        assert_eq!(session.user().unwrap().phone.as_deref(), Some("9000000000"));
        assert_eq!(session.token().unwrap().expose_secret(), "tok-123");
    }

    #[test]
    fn test_update_user_ignored_when_signed_out() {
        let session = SessionHandle::load(Arc::new(MemoryStore::new()));
        session.update_user(user());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_corrupt_session_starts_signed_out() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(keys::AUTH, &serde_json::json!({ "state": 42 }))
            .unwrap();
        assert!(!SessionHandle::load(store).is_authenticated());
    }

    #[test]
    fn test_admin_session_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let admin = AdminSessionHandle::load(store.clone());
        admin.login(
            AdminUser {
                id: AdminId::new("a1"),
                name: "Ops".to_string(),
                email: "ops@aviravastra.in".to_string(),
                role: Some("admin".to_string()),
            },
            "admin-tok",
        );

        let reloaded = AdminSessionHandle::load(store.clone());
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.admin().unwrap().name, "Ops");

        reloaded.logout();
        assert!(!store.contains(keys::ADMIN_TOKEN));
        assert!(!store.contains(keys::ADMIN_DATA));
        assert!(!AdminSessionHandle::load(store).is_authenticated());
    }
}
