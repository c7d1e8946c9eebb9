//! Site content, uploads and dashboard records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::Order;

/// The singleton site-content record edited from the back-office.
///
/// Fields the client does not know about are kept in `extra` so an update
/// never drops data written by a newer back-office.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_banner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_floating_whatsapp: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response from `/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Response from the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

/// Headline numbers on the back-office dashboard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub total_products: u64,
}

/// Response from `/admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}
