//! Payment widget handoff.
//!
//! The hosted payment widget is an external capability: the checkout hands
//! it a [`PaymentRequest`] and waits for exactly one [`PaymentOutcome`].

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use avira_vastra_core::CurrencyCode;

use crate::models::PaymentVerification;

/// Brand colour passed to the widget.
pub const THEME_COLOR: &str = "#1a1a1a";

/// Logo shown in the widget header.
pub const LOGO_PATH: &str = "/logo.png";

/// Contact details the widget prefills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Free-form notes attached to the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentNotes {
    pub address: String,
}

/// Everything the widget needs to collect a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    /// Public key id.
    pub key: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    pub currency: CurrencyCode,
    /// Merchant name.
    pub name: String,
    /// `Order #<orderId>`.
    pub description: String,
    pub image: String,
    /// Gateway-side payment session id.
    pub order_id: String,
    pub prefill: PaymentPrefill,
    pub notes: PaymentNotes,
    pub theme_color: String,
}

/// How the widget session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The customer paid; the signed fields must be verified server-side.
    Confirmed(PaymentVerification),
    /// The customer dismissed the widget.
    Cancelled,
    /// The widget closed without reporting anything.
    NoResponse,
}

/// A payment widget.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    /// Open the widget and wait for it to finish.
    async fn initiate(&self, request: PaymentRequest) -> PaymentOutcome;
}
