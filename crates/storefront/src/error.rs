//! Unified error handling with Sentry integration.
//!
//! Each concern has its own error enum (`ApiError`, `StoreError`,
//! `ConfigError`, `CheckoutError`). `AppError` wraps them for binaries that
//! need one error type, and every variant can produce a message fit for
//! the user.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout step rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Input rejected before reaching the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Checkout(e) => e.user_message(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Config(e) => e.to_string(),
            Self::Store(_) => crate::api::FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Capture a storage failure to Sentry.
///
/// Storage failures never reach the user, so this is the only trace of them
/// beyond the log line at the call site.
pub fn report_store_error(error: &StoreError) {
    let event_id = sentry::capture_error(error);
    tracing::debug!(sentry_event_id = %event_id, "Reported storage error");
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Order created", Some(&[("order_ref", "AV-1042")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::AddressField;

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidInput("quantity must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity must be positive");

        let err = AppError::from(ConfigError::MissingEnvVar("RAZORPAY_KEY_ID".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: RAZORPAY_KEY_ID"
        );
    }

    #[test]
    fn test_user_messages() {
        let err = AppError::from(ApiError::Api {
            status: 400,
            message: "Coupon expired".to_string(),
        });
        assert_eq!(err.user_message(), "Coupon expired");

        let err = AppError::from(CheckoutError::MissingFields(vec![AddressField::Phone]));
        assert_eq!(err.user_message(), "Please fill all required fields");

        let err = AppError::from(StoreError::InvalidKey("../etc".to_string()));
        assert_eq!(err.user_message(), "Something went wrong");
    }
}
