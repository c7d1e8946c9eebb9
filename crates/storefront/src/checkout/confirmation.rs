//! Order confirmation lookup.
//!
//! The confirmation page only knows the order reference from its route.
//! Signed-in customers read the order directly; if that fails (the backend
//! may not accept a human order number there) the order is tracked by
//! number and email instead. Whatever cannot be resolved is rendered with
//! placeholders, so the page always shows something.

use chrono::{DateTime, Utc};

use avira_vastra_core::{PaymentStatus, Price};

use crate::api::OrderLookup;
use crate::models::Order;
use crate::services::session::SessionHandle;

/// Shown while the total is unknown.
pub const TOTAL_PLACEHOLDER: &str = "...";

/// Resolve `order_ref` to an order, if the backend lets us see it.
pub async fn resolve_order(
    lookup: &dyn OrderLookup,
    session: &SessionHandle,
    order_ref: &str,
) -> Option<Order> {
    let email = session
        .user()
        .map(|u| u.email)
        .filter(|e| !e.trim().is_empty());

    if session.is_authenticated() {
        match lookup.get_order(order_ref).await {
            Ok(order) => return Some(order),
            Err(e) => tracing::debug!(error = %e, order_ref, "Direct order lookup failed"),
        }
    }

    let email = email?;
    match lookup.track_order(order_ref, &email).await {
        Ok(order) => Some(order),
        Err(e) => {
            tracing::warn!(error = %e, order_ref, "Order tracking failed");
            None
        }
    }
}

/// What the confirmation page displays.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Reference from the route, shown as-is.
    pub order_ref: String,
    pub date: DateTime<Utc>,
    pub total: Option<Price>,
    pub payment_status: PaymentStatus,
}

impl OrderConfirmation {
    /// Build the page, falling back to placeholders for anything unknown.
    #[must_use]
    pub fn new(order_ref: &str, order: Option<&Order>, now: DateTime<Utc>) -> Self {
        Self {
            order_ref: order_ref.to_string(),
            date: order.and_then(|o| o.created_at).unwrap_or(now),
            total: order.map(|o| Price::inr(o.total_amount)),
            payment_status: order.map_or(PaymentStatus::Paid, |o| o.payment_status),
        }
    }

    /// Total for display, or the placeholder.
    #[must_use]
    pub fn total_display(&self) -> String {
        self.total
            .map_or_else(|| TOTAL_PLACEHOLDER.to_string(), |p| p.to_string())
    }

    /// Date for display, e.g. `1 March 2026`.
    #[must_use]
    pub fn date_display(&self) -> String {
        self.date.format("%-d %B %Y").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::api::{ApiError, MockOrderLookup};
    use crate::services::session::tests::user;
    use crate::store::MemoryStore;

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "_id": "665f00aa",
            "orderId": "AV-1042",
            "totalAmount": 2000,
            "paymentStatus": "PAID",
            "orderStatus": "PLACED",
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap()
    }

    fn not_found() -> ApiError {
        ApiError::Api {
            status: 404,
            message: "Order not found".to_string(),
        }
    }

    fn signed_in() -> SessionHandle {
        let session = SessionHandle::load(Arc::new(MemoryStore::new()));
        session.login(user(), "tok-123");
        session
    }

    #[tokio::test]
    async fn test_authenticated_reads_order_directly() {
        let mut lookup = MockOrderLookup::new();
        lookup
            .expect_get_order()
            .with(eq("AV-1042"))
            .times(1)
            .returning(|_| Ok(order()));
        lookup.expect_track_order().never();

        let resolved = resolve_order(&lookup, &signed_in(), "AV-1042").await;
        assert_eq!(resolved.unwrap().reference(), Some("AV-1042"));
    }

    #[tokio::test]
    async fn test_authenticated_falls_back_to_tracking() {
        let mut lookup = MockOrderLookup::new();
        lookup.expect_get_order().returning(|_| Err(not_found()));
        lookup
            .expect_track_order()
            .with(eq("AV-1042"), eq("meera@example.in"))
            .times(1)
            .returning(|_, _| Ok(order()));

        assert!(resolve_order(&lookup, &signed_in(), "AV-1042").await.is_some());
    }

    #[tokio::test]
    async fn test_signed_out_without_email_resolves_nothing() {
        let mut lookup = MockOrderLookup::new();
        lookup.expect_get_order().never();
        lookup.expect_track_order().never();

        let session = SessionHandle::load(Arc::new(MemoryStore::new()));
        assert!(resolve_order(&lookup, &session, "AV-1042").await.is_none());
    }

    #[tokio::test]
    async fn test_tracking_failure_resolves_nothing() {
        let mut lookup = MockOrderLookup::new();
        lookup.expect_get_order().returning(|_| Err(not_found()));
        lookup.expect_track_order().returning(|_, _| Err(not_found()));

        assert!(resolve_order(&lookup, &signed_in(), "AV-1042").await.is_none());
    }

    #[test]
    fn test_confirmation_placeholders() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let page = OrderConfirmation::new("AV-1042", None, now);

        assert_eq!(page.total_display(), TOTAL_PLACEHOLDER);
        assert_eq!(page.payment_status, PaymentStatus::Paid);
        assert_eq!(page.date, now);
        assert_eq!(page.date_display(), "16 October 2026");
    }

    #[test]
    fn test_confirmation_from_order() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let order = order();
        let page = OrderConfirmation::new("AV-1042", Some(&order), now);

        assert_eq!(page.total, Some(Price::inr(Decimal::from(2000))));
        assert_eq!(page.total_display(), "₹2000");
        assert_eq!(page.date_display(), "1 March 2026");
    }
}
