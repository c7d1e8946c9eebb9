//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `AVIRA_API_BASE_URL` - REST API base (default: `http://localhost:5000/api`)
//! - `AVIRA_STATE_DIR` - Directory for persisted cart and session (default: `.avira`)
//! - `AVIRA_REQUEST_TIMEOUT_SECS` - Transport timeout for API calls (default: 30)
//! - `AVIRA_VERIFY_TIMEOUT_SECS` - Ceiling on payment verification (default: none)
//! - `AVIRA_HEALTH_INTERVAL_SECS` - Backend health poll interval (default: 30)
//! - `AVIRA_MERCHANT_NAME` - Merchant name shown by the payment widget (default: Avira Vastra)
//! - `RAZORPAY_KEY_ID` - Public payment key; required only to check out
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_STATE_DIR: &str = ".avira";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";
const DEFAULT_HEALTH_INTERVAL_SECS: &str = "30";
const DEFAULT_MERCHANT_NAME: &str = "Avira Vastra";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Directory holding persisted client state
    pub state_dir: PathBuf,
    /// Backend health poll interval
    pub health_interval: Duration,
    /// Payment widget settings
    pub payment: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Backend API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// REST base URL, including the `/api` prefix
    pub base_url: Url,
    /// Transport timeout applied to every call except payment verification
    pub request_timeout: Duration,
}

/// Payment widget settings.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Public payment key id (safe to expose)
    pub key_id: Option<String>,
    /// Merchant name shown in the widget
    pub merchant_name: String,
    /// Ceiling on payment verification; `None` waits indefinitely
    pub verify_timeout: Option<Duration>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_env_or_default(&lookup, "AVIRA_API_BASE_URL", DEFAULT_API_BASE_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("AVIRA_API_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "AVIRA_API_BASE_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        let api = ApiConfig {
            base_url,
            request_timeout: get_secs(
                &lookup,
                "AVIRA_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        };

        let verify_timeout = get_optional_env(&lookup, "AVIRA_VERIFY_TIMEOUT_SECS")
            .map(|value| parse_secs("AVIRA_VERIFY_TIMEOUT_SECS", &value))
            .transpose()?;

        let payment = PaymentConfig {
            key_id: get_optional_env(&lookup, "RAZORPAY_KEY_ID"),
            merchant_name: get_env_or_default(&lookup, "AVIRA_MERCHANT_NAME", DEFAULT_MERCHANT_NAME),
            verify_timeout,
        };

        Ok(Self {
            api,
            state_dir: PathBuf::from(get_env_or_default(
                &lookup,
                "AVIRA_STATE_DIR",
                DEFAULT_STATE_DIR,
            )),
            health_interval: get_secs(
                &lookup,
                "AVIRA_HEALTH_INTERVAL_SECS",
                DEFAULT_HEALTH_INTERVAL_SECS,
            )?,
            payment,
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }
}

impl PaymentConfig {
    /// The payment key id, required before a checkout can start.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `RAZORPAY_KEY_ID` is unset.
    pub fn require_key_id(&self) -> Result<&str, ConfigError> {
        self.key_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("RAZORPAY_KEY_ID".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating blank values as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a whole-second duration with a default value.
fn get_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Duration, ConfigError> {
    parse_secs(key, &get_env_or_default(lookup, key, default))
}

/// Parse a positive number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
