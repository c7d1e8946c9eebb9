//! Sign-in flows that tie API responses to the persisted sessions.

use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::models::{AdminUser, Credentials, GoogleSignIn, Registration, User};
use crate::services::session::{AdminSessionHandle, SessionHandle};

/// Sign in with email and password and store the session.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials; the session is
/// left unchanged.
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn login(
    api: &ApiClient,
    session: &SessionHandle,
    credentials: &Credentials,
) -> Result<User, ApiError> {
    let response = api.login(credentials).await?;
    require_token(&response.token)?;
    session.login(response.user.clone(), response.token);
    Ok(response.user)
}

/// Register a new customer and sign them in.
///
/// # Errors
///
/// Returns an error if the backend rejects the registration.
#[instrument(skip_all, fields(email = %registration.email))]
pub async fn register(
    api: &ApiClient,
    session: &SessionHandle,
    registration: &Registration,
) -> Result<User, ApiError> {
    let response = api.register(registration).await?;
    require_token(&response.token)?;
    session.login(response.user.clone(), response.token);
    Ok(response.user)
}

/// Sign in with a Google ID token.
///
/// # Errors
///
/// Returns an error if the backend rejects the token.
#[instrument(skip_all)]
pub async fn google_login(
    api: &ApiClient,
    session: &SessionHandle,
    sign_in: &GoogleSignIn,
) -> Result<User, ApiError> {
    let response = api.google_login(sign_in).await?;
    require_token(&response.token)?;
    session.login(response.user.clone(), response.token);
    Ok(response.user)
}

/// Re-read the profile and store it in the session.
///
/// A 401 means the token is no longer valid, so the session is cleared.
///
/// # Errors
///
/// Returns the backend error, after clearing the session on 401.
#[instrument(skip_all)]
pub async fn refresh_profile(api: &ApiClient, session: &SessionHandle) -> Result<User, ApiError> {
    match api.profile().await {
        Ok(user) => {
            session.update_user(user.clone());
            Ok(user)
        }
        Err(e) => {
            if e.status() == Some(401) {
                tracing::info!("Stored token rejected, signing out");
                session.logout();
            }
            Err(e)
        }
    }
}

/// Sign in to the back-office and store the admin session.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials.
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn admin_login(
    api: &ApiClient,
    session: &AdminSessionHandle,
    credentials: &Credentials,
) -> Result<AdminUser, ApiError> {
    let response = api.admin_login(credentials).await?;
    require_token(&response.token)?;
    session.login(response.admin.clone(), response.token);
    Ok(response.admin)
}

/// A sign-in without a token cannot be stored as a session.
fn require_token(token: &str) -> Result<(), ApiError> {
    if token.is_empty() {
        let error = ApiError::MissingToken;
        tracing::error!(error = %error, "Rejecting sign-in response");
        sentry::capture_error(&error);
        return Err(error);
    }
    Ok(())
}
