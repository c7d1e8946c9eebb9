//! Narrow views of the API used by checkout and order confirmation.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::{ApiClient, ApiError};
use crate::models::{NewOrder, Order, PaymentVerification, ProfileUpdate, User, VerificationResult};

/// Calls the checkout makes, in the order it makes them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Save the shipping details to the customer's profile.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    /// Create the order and its payment session.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError>;

    /// Verify the payment widget's signed fields.
    async fn verify_payment(
        &self,
        payment: &PaymentVerification,
    ) -> Result<VerificationResult, ApiError>;
}

/// Order reads used by the confirmation page.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderLookup: Send + Sync {
    /// Get an order visible to the signed-in customer.
    async fn get_order(&self, id: &str) -> Result<Order, ApiError>;

    /// Find an order by number and email.
    async fn track_order(&self, order_id: &str, email: &str) -> Result<Order, ApiError>;
}

#[async_trait]
impl CheckoutGateway for ApiClient {
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        Self::update_profile(self, update).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        Self::create_order(self, order).await
    }

    async fn verify_payment(
        &self,
        payment: &PaymentVerification,
    ) -> Result<VerificationResult, ApiError> {
        Self::verify_payment(self, payment).await
    }
}

#[async_trait]
impl OrderLookup for ApiClient {
    async fn get_order(&self, id: &str) -> Result<Order, ApiError> {
        Self::get_order(self, id).await
    }

    async fn track_order(&self, order_id: &str, email: &str) -> Result<Order, ApiError> {
        Self::track_order(self, order_id, email).await
    }
}
