//! Order records.
//!
//! The backend owns orders. The client builds a [`NewOrder`] from the cart at
//! checkout and otherwise only reads [`Order`] snapshots for display. The
//! signed payment fields and the verification reply live here too.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use avira_vastra_core::{OrderId, OrderStatus, PaymentStatus, ProductId};

/// Shipping destination attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product reference; the backend may return it populated or as a bare ID.
    pub product: serde_json::Value,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Online,
    Cod,
}

/// An order as returned by `/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Internal record ID; empty when the backend omits it.
    #[serde(rename = "_id", default)]
    pub id: OrderId,
    /// Human-readable order number (e.g. `AV-1042`), assigned by the server.
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Payment session identifier issued by the payment gateway.
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl Order {
    /// Identifier used in confirmation and failure routes: the human-readable
    /// order number, falling back to the internal record ID.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.order_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.id.as_str()).filter(|id| !id.is_empty()))
    }
}

/// Line submitted when creating an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product: ProductId,
    pub name: String,
    pub quantity: u32,
    /// Effective unit price (discounted when a discount applies).
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub phone: String,
    pub customer_name: String,
    pub email: String,
}

/// Query for guest order tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOrderQuery {
    pub order_id: String,
    pub email: String,
}

/// Body for `PUT /orders/:id/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Signed fields returned by the payment widget on success.
///
/// Forwarded verbatim to `/payments/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Response from `/payments/verify`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerificationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_json(order_id: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "_id": "665f00aa",
            "orderId": order_id,
            "totalAmount": 2000,
            "paymentStatus": "PENDING",
            "orderStatus": "PLACED",
            "items": [{ "product": "p1", "name": "Silk", "quantity": 1, "price": 2000 }],
            "createdAt": "2026-03-01T10:00:00Z",
            "razorpayOrderId": "order_Rz123"
        })
    }

    #[test]
    fn test_order_reference_prefers_human_id() {
        let order: Order = serde_json::from_value(order_json(Some("AV-1042"))).unwrap();
        assert_eq!(order.reference(), Some("AV-1042"));
        assert_eq!(order.razorpay_order_id.as_deref(), Some("order_Rz123"));
        assert_eq!(order.total_amount, Decimal::from(2000));
    }

    #[test]
    fn test_order_reference_falls_back_to_record_id() {
        let order: Order = serde_json::from_value(order_json(None)).unwrap();
        assert_eq!(order.reference(), Some("665f00aa"));
    }

    #[test]
    fn test_order_without_record_id_decodes() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "orderId": "AV-1",
            "totalAmount": 100
        }))
        .unwrap();
        assert_eq!(order.reference(), Some("AV-1"));
        assert_eq!(order.id.as_str(), "");

        let bare: Order =
            serde_json::from_value(serde_json::json!({ "totalAmount": 100 })).unwrap();
        assert_eq!(bare.reference(), None);
    }

    #[test]
    fn test_verification_result_defaults_to_failure() {
        let result: VerificationResult =
            serde_json::from_value(serde_json::json!({ "message": "Invalid signature" })).unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Invalid signature"));
    }

    #[test]
    fn test_new_order_wire_format() {
        let order = NewOrder {
            items: vec![NewOrderItem {
                product: ProductId::new("p1"),
                name: "Silk".to_string(),
                quantity: 2,
                price: Decimal::from(500),
            }],
            shipping_address: ShippingAddress {
                address: "12 Ring Rd".to_string(),
                city: "Surat".to_string(),
                state: "Gujarat".to_string(),
                pincode: "395002".to_string(),
            },
            payment_method: PaymentMethod::Online,
            total_amount: Decimal::from(1000),
            phone: "9876543210".to_string(),
            customer_name: "Meera".to_string(),
            email: "meera@example.in".to_string(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["paymentMethod"], "ONLINE");
        assert_eq!(json["totalAmount"], 1000.0);
        assert_eq!(json["items"][0]["product"], "p1");
        assert_eq!(json["shippingAddress"]["address"], "12 Ring Rd");
        assert_eq!(json["customerName"], "Meera");
    }
}
