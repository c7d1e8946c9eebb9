//! Customer and back-office authentication.
//!
//! These calls return tokens; storing them is the caller's job (see
//! [`crate::services::session`]).

use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::{
    AdminAuthResponse, AdminUser, AuthResponse, Credentials, GoogleSignIn, ProfileUpdate,
    Registration, User,
};

impl ApiClient {
    /// Sign in to the back-office.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn admin_login(
        &self,
        credentials: &Credentials,
    ) -> Result<AdminAuthResponse, ApiError> {
        self.send_json(Method::POST, &["admin", "login"], credentials)
            .await
    }

    /// Fetch the signed-in administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin token is missing or expired.
    #[instrument(skip(self))]
    pub async fn admin_profile(&self) -> Result<AdminUser, ApiError> {
        self.get(&["admin", "profile"]).await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, &["auth", "register"], registration)
            .await
    }

    /// Sign in as a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, &["auth", "login"], credentials)
            .await
    }

    /// Sign in with a Google ID token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the token.
    #[instrument(skip_all)]
    pub async fn google_login(&self, sign_in: &GoogleSignIn) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, &["auth", "google"], sign_in)
            .await
    }

    /// Fetch the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or expired.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get(&["auth", "profile"]).await
    }

    /// Update the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_json(Method::PUT, &["auth", "profile"], update)
            .await
    }
}
