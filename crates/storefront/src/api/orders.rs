//! Orders and payment verification.
//!
//! Never cached. Creation and verification are POSTs and are sent once;
//! callers decide what a failure means for the checkout.

use reqwest::Method;
use tracing::instrument;

use avira_vastra_core::OrderStatus;

use super::{ApiClient, ApiError};
use crate::models::{NewOrder, Order, PaymentVerification, StatusUpdate, VerificationResult};

impl ApiClient {
    /// Create an order from the checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total_amount))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.send_json(Method::POST, &["orders"], order).await
    }

    /// Get an order by record ID or order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not visible to the caller.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &str) -> Result<Order, ApiError> {
        self.get(&["orders", id]).await
    }

    /// Look up an order by number and the email it was placed with.
    ///
    /// # Errors
    ///
    /// Returns an error if no order matches.
    #[instrument(skip(self, email))]
    pub async fn track_order(&self, order_id: &str, email: &str) -> Result<Order, ApiError> {
        let mut url = self.endpoint(&["orders", "track"])?;
        url.query_pairs_mut()
            .append_pair("orderId", order_id)
            .append_pair("email", email);
        self.send(self.request(Method::GET, url)).await
    }

    /// List every order (back-office).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an administrator or the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(&["orders"]).await
    }

    /// List the signed-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(&["orders", "my-orders"]).await
    }

    /// Move an order to a new fulfilment status (back-office).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.send_json(Method::PUT, &["orders", id, "status"], &StatusUpdate { status })
            .await
    }

    /// Forward the payment widget's signed fields for verification.
    ///
    /// Sent without the transport timeout; the checkout applies its own
    /// ceiling when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. A `success: false` answer is
    /// returned as `Ok` and left to the caller.
    #[instrument(skip(self, payment), fields(razorpay_order_id = %payment.razorpay_order_id))]
    pub async fn verify_payment(
        &self,
        payment: &PaymentVerification,
    ) -> Result<VerificationResult, ApiError> {
        let url = self.endpoint(&["payments", "verify"])?;
        self.send(self.request_without_timeout(Method::POST, url).json(payment))
            .await
    }
}
