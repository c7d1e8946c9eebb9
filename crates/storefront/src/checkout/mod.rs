//! Checkout state machine.
//!
//! # Phases
//!
//! ```text
//! Address ──proceed_to_payment──▶ Payment ──place_order──▶ Confirmed
//!    ▲                              │  │                    Failed
//!    └────────back_to_address───────┘  │                    Abandoned
//!                                      └─(create failed / cancelled: stay)
//! ```
//!
//! `place_order` runs its steps strictly in sequence: profile sync, order
//! creation, payment widget, verification. The cart is cleared only after
//! the backend confirms the payment; every other ending leaves it exactly
//! as it was.

mod address;
pub mod confirmation;
pub mod payment;

pub use address::{AddressField, AddressForm};
pub use confirmation::{OrderConfirmation, resolve_order};
pub use payment::{PaymentNotes, PaymentOutcome, PaymentPrefill, PaymentRequest, PaymentWidget};

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use avira_vastra_core::{CurrencyCode, Price};

use crate::api::CheckoutGateway;
use crate::config::{ConfigError, PaymentConfig};
use crate::error::add_breadcrumb;
use crate::models::{
    NewOrder, NewOrderItem, Order, PaymentMethod, PaymentVerification, VerificationResult,
};
use crate::navigation::{Navigation, Notice, Route};
use crate::services::cart::CartHandle;
use crate::services::session::SessionHandle;

pub const LOGIN_REQUIRED: &str = "Please login to checkout";
pub const FIELDS_REQUIRED: &str = "Please fill all required fields";
pub const PAYMENT_SUCCESSFUL: &str = "Payment successful!";
pub const PAYMENT_CANCELLED: &str = "Payment cancelled";
pub const VERIFICATION_FAILED: &str = "Payment verification failed";
pub const ORDER_ID_MISSING: &str = "Payment verified, but could not find Order ID";

/// Errors that can occur while driving the checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Required address fields are blank.
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<AddressField>),

    /// The action is not allowed in the current phase.
    #[error("cannot {action} during the {phase} phase")]
    InvalidPhase {
        action: &'static str,
        phase: &'static str,
    },

    /// The order total cannot be expressed in minor units.
    #[error("order total out of range: {0}")]
    AmountOutOfRange(Decimal),

    /// Payment settings are incomplete.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CheckoutError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(_) => FIELDS_REQUIRED.to_string(),
            _ => crate::api::FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

fn join_fields(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where the checkout currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Collecting the shipping address.
    Address,
    /// Address accepted; ready to place the order.
    Payment,
    /// Payment verified.
    Confirmed { order_ref: Option<String> },
    /// Payment taken but verification failed.
    Failed { order_ref: Option<String> },
    /// The widget closed without an outcome.
    Abandoned,
}

impl CheckoutPhase {
    const fn name(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Payment => "payment",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the checkout has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { .. } | Self::Failed { .. } | Self::Abandoned
        )
    }
}

/// Payment settings the checkout needs.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub key_id: String,
    pub merchant_name: String,
    pub verify_timeout: Option<Duration>,
}

impl CheckoutSettings {
    /// Extract checkout settings from the payment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no payment key is configured.
    pub fn from_config(config: &PaymentConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: config.require_key_id()?.to_string(),
            merchant_name: config.merchant_name.clone(),
            verify_timeout: config.verify_timeout,
        })
    }
}

/// Result of trying to enter the checkout.
#[derive(Debug)]
pub enum CheckoutEntry {
    /// The checkout can start.
    Ready(Checkout),
    /// A guard sent the user elsewhere.
    Redirect(Navigation),
}

/// How a `place_order` attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Stay on the payment step and show a notice.
    Stay(Notice),
    /// Leave the checkout.
    Leave(Navigation),
    /// The widget reported nothing; no change was made.
    Abandoned,
}

/// A single checkout attempt.
#[derive(Debug)]
pub struct Checkout {
    cart: CartHandle,
    session: SessionHandle,
    settings: CheckoutSettings,
    form: AddressForm,
    phase: CheckoutPhase,
}

impl Checkout {
    /// Enter the checkout.
    ///
    /// Signed-out users are sent to login (returning to checkout afterwards)
    /// and an empty cart sends the user back to the cart. Neither guard
    /// touches the cart.
    #[must_use]
    pub fn enter(
        cart: CartHandle,
        session: SessionHandle,
        settings: CheckoutSettings,
    ) -> CheckoutEntry {
        if !session.is_authenticated() {
            return CheckoutEntry::Redirect(
                Navigation::to(Route::login_for_checkout())
                    .with_notice(Notice::error(LOGIN_REQUIRED)),
            );
        }
        if cart.is_empty() {
            return CheckoutEntry::Redirect(Navigation::to(Route::Cart));
        }

        let form = AddressForm::prefill(session.user().as_ref());
        add_breadcrumb("checkout", "Entered checkout", None);
        CheckoutEntry::Ready(Self {
            cart,
            session,
            settings,
            form,
            phase: CheckoutPhase::Address,
        })
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// The address form.
    #[must_use]
    pub const fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Mutable access to the address form.
    pub fn form_mut(&mut self) -> &mut AddressForm {
        &mut self.form
    }

    fn require_phase(
        &self,
        expected: &CheckoutPhase,
        action: &'static str,
    ) -> Result<(), CheckoutError> {
        if &self.phase == expected {
            Ok(())
        } else {
            Err(CheckoutError::InvalidPhase {
                action,
                phase: self.phase.name(),
            })
        }
    }

    /// Validate the address and move to the payment step.
    ///
    /// # Errors
    ///
    /// Returns `MissingFields` when street, city, pincode or phone is blank;
    /// the phase does not change and nothing is sent.
    pub fn proceed_to_payment(&mut self) -> Result<(), CheckoutError> {
        self.require_phase(&CheckoutPhase::Address, "proceed to payment")?;

        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(missing = %join_fields(&missing), "Address incomplete");
            return Err(CheckoutError::MissingFields(missing));
        }

        self.phase = CheckoutPhase::Payment;
        Ok(())
    }

    /// Return from the payment step to edit the address.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` outside the payment step.
    pub fn back_to_address(&mut self) -> Result<(), CheckoutError> {
        self.require_phase(&CheckoutPhase::Payment, "return to address")?;
        self.phase = CheckoutPhase::Address;
        Ok(())
    }

    /// Place the order and take payment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` outside the payment step. Backend and payment
    /// failures are not errors; they are reported through the outcome.
    pub async fn place_order(
        &mut self,
        gateway: &dyn CheckoutGateway,
        widget: &dyn PaymentWidget,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.require_phase(&CheckoutPhase::Payment, "place an order")?;

        // The cart is shared and may have been emptied since entry.
        if self.cart.is_empty() {
            tracing::debug!("Cart emptied during checkout");
            return Ok(CheckoutOutcome::Leave(Navigation::to(Route::Cart)));
        }

        self.sync_profile(gateway).await;

        let order = match gateway.create_order(&self.new_order()).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, "Order creation failed");
                return Ok(CheckoutOutcome::Stay(Notice::error(e.user_message())));
            }
        };
        let order_ref = order.reference().map(str::to_string);
        tracing::info!(order_ref = ?order_ref, "Order created");
        add_breadcrumb(
            "checkout",
            "Order created",
            Some(&[("order_ref", order_ref.as_deref().unwrap_or(""))]),
        );

        let request = self.payment_request(&order)?;
        match widget.initiate(request).await {
            PaymentOutcome::Confirmed(signed) => Ok(self.verify(gateway, &signed, order_ref).await),
            PaymentOutcome::Cancelled => {
                tracing::info!(order_ref = ?order_ref, "Payment cancelled");
                Ok(CheckoutOutcome::Stay(Notice::error(PAYMENT_CANCELLED)))
            }
            PaymentOutcome::NoResponse => {
                tracing::warn!(order_ref = ?order_ref, "Payment widget closed without a result");
                self.phase = CheckoutPhase::Abandoned;
                Ok(CheckoutOutcome::Abandoned)
            }
        }
    }

    /// Verify a payment taken out of band for an order created earlier.
    ///
    /// No order is created and the widget is not opened. `order_ref` is the
    /// order's human-readable number, used for the result route.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` outside the payment step.
    pub async fn complete_payment(
        &mut self,
        gateway: &dyn CheckoutGateway,
        signed: &PaymentVerification,
        order_ref: Option<String>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.require_phase(&CheckoutPhase::Payment, "complete a payment")?;
        add_breadcrumb(
            "checkout",
            "Completing payment",
            Some(&[("razorpay_order_id", signed.razorpay_order_id.as_str())]),
        );
        Ok(self.verify(gateway, signed, order_ref).await)
    }

    /// Save the form to the profile. Failures are logged and ignored.
    async fn sync_profile(&self, gateway: &dyn CheckoutGateway) {
        match gateway.update_profile(&self.form.profile_update()).await {
            Ok(user) => self.session.update_user(user),
            Err(e) => tracing::warn!(error = %e, "Failed to sync address with profile"),
        }
    }

    fn new_order(&self) -> NewOrder {
        let items = self
            .cart
            .items()
            .into_iter()
            .map(|item| NewOrderItem {
                price: item.effective_unit_price(),
                product: item.product_id,
                name: item.name,
                quantity: item.quantity,
            })
            .collect();

        NewOrder {
            items,
            shipping_address: self.form.shipping_address(),
            payment_method: PaymentMethod::Online,
            total_amount: self.cart.total(),
            phone: self.form.phone.clone(),
            customer_name: self.form.name.clone(),
            email: self.form.email.clone(),
        }
    }

    fn payment_request(&self, order: &Order) -> Result<PaymentRequest, CheckoutError> {
        let amount = Price::inr(order.total_amount)
            .minor_units()
            .ok_or(CheckoutError::AmountOutOfRange(order.total_amount))?;

        Ok(PaymentRequest {
            key: self.settings.key_id.clone(),
            amount,
            currency: CurrencyCode::INR,
            name: self.settings.merchant_name.clone(),
            description: format!("Order #{}", order.order_id.as_deref().unwrap_or_default()),
            image: payment::LOGO_PATH.to_string(),
            order_id: order.razorpay_order_id.clone().unwrap_or_default(),
            prefill: PaymentPrefill {
                name: self.form.name.clone(),
                email: self.form.email.clone(),
                contact: self.form.phone.clone(),
            },
            notes: PaymentNotes {
                address: self.form.street.clone(),
            },
            theme_color: payment::THEME_COLOR.to_string(),
        })
    }

    async fn verify(
        &mut self,
        gateway: &dyn CheckoutGateway,
        signed: &PaymentVerification,
        order_ref: Option<String>,
    ) -> CheckoutOutcome {
        let verification = gateway.verify_payment(signed);
        let result = match self.settings.verify_timeout {
            Some(limit) => tokio::time::timeout(limit, verification)
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!(timeout = ?limit, "Payment verification timed out");
                    Ok(VerificationResult::default())
                }),
            None => verification.await,
        };

        match result {
            Ok(verified) if verified.success => {
                self.cart.clear_cart();
                self.phase = CheckoutPhase::Confirmed {
                    order_ref: order_ref.clone(),
                };
                tracing::info!(order_ref = ?order_ref, "Payment verified");
                add_breadcrumb("checkout", "Payment verified", None);

                match order_ref {
                    Some(id) => CheckoutOutcome::Leave(
                        Navigation::to(Route::OrderSuccess(id))
                            .with_notice(Notice::success(PAYMENT_SUCCESSFUL)),
                    ),
                    None => CheckoutOutcome::Leave(
                        Navigation::to(Route::Profile).with_notice(Notice::error(ORDER_ID_MISSING)),
                    ),
                }
            }
            outcome => {
                match outcome {
                    Ok(verified) => tracing::warn!(
                        message = ?verified.message,
                        "Payment verification rejected"
                    ),
                    Err(e) => tracing::error!(error = %e, "Payment verification failed"),
                }
                self.phase = CheckoutPhase::Failed {
                    order_ref: order_ref.clone(),
                };
                let route = order_ref.map_or(Route::Profile, Route::OrderFailed);
                CheckoutOutcome::Leave(
                    Navigation::to(route).with_notice(Notice::error(VERIFICATION_FAILED)),
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use avira_vastra_core::{OrderId, OrderStatus, PaymentStatus};

    use super::payment::MockPaymentWidget;
    use super::*;
    use crate::api::{ApiError, MockCheckoutGateway};
    use crate::models::{ProfileUpdate, User};
    use crate::services::cart::tests::product;
    use crate::services::session::tests::user;
    use crate::store::MemoryStore;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            key_id: "rzp_test_key".to_string(),
            merchant_name: "Avira Vastra".to_string(),
            verify_timeout: None,
        }
    }

    fn signed_in() -> (CartHandle, SessionHandle) {
        let store = Arc::new(MemoryStore::new());
        let cart = CartHandle::load(store.clone());
        let session = SessionHandle::load(store);
        session.login(user(), "tok-123");
        cart.add_item(&product("a", 1000, None), 1);
        cart.add_item(&product("b", 600, Some(500)), 2);
        (cart, session)
    }

    fn ready(cart: &CartHandle, session: &SessionHandle) -> Checkout {
        let CheckoutEntry::Ready(mut checkout) =
            Checkout::enter(cart.clone(), session.clone(), settings())
        else {
            panic!("expected checkout to start");
        };
        let form = checkout.form_mut();
        form.street = "12 Ring Rd".to_string();
        form.city = "Surat".to_string();
        form.state = "Gujarat".to_string();
        form.pincode = "395002".to_string();
        checkout.proceed_to_payment().unwrap();
        checkout
    }

    fn created_order(order_id: Option<&str>, record_id: &str) -> Order {
        Order {
            id: OrderId::new(record_id),
            order_id: order_id.map(str::to_string),
            total_amount: Decimal::from(2000),
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Placed,
            items: Vec::new(),
            shipping_address: None,
            created_at: None,
            razorpay_order_id: Some("order_Rz123".to_string()),
            customer_name: None,
            phone: None,
            email: None,
            payment_method: Some(PaymentMethod::Online),
        }
    }

    fn signed_payment() -> PaymentVerification {
        PaymentVerification {
            razorpay_order_id: "order_Rz123".to_string(),
            razorpay_payment_id: "pay_77".to_string(),
            razorpay_signature: "sig".to_string(),
        }
    }

    fn gateway_creating(order: Order) -> MockCheckoutGateway {
        let mut gateway = MockCheckoutGateway::new();
        gateway
            .expect_update_profile()
            .returning(|_| Ok(user()));
        gateway
            .expect_create_order()
            .times(1)
            .returning(move |_| Ok(order.clone()));
        gateway
    }

    fn widget_returning(outcome: PaymentOutcome) -> MockPaymentWidget {
        let mut widget = MockPaymentWidget::new();
        widget
            .expect_initiate()
            .times(1)
            .returning(move |_| outcome.clone());
        widget
    }

    #[test]
    fn test_signed_out_user_is_sent_to_login() {
        let store = Arc::new(MemoryStore::new());
        let cart = CartHandle::load(store.clone());
        cart.add_item(&product("a", 1000, None), 1);
        let before = cart.snapshot();

        let entry = Checkout::enter(cart.clone(), SessionHandle::load(store), settings());
        let CheckoutEntry::Redirect(nav) = entry else {
            panic!("expected redirect");
        };
        assert_eq!(nav.route.to_string(), "/login?redirect=checkout");
        assert_eq!(nav.notice.unwrap().message, LOGIN_REQUIRED);
        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn test_empty_cart_is_sent_to_cart() {
        let (cart, session) = signed_in();
        cart.clear_cart();

        let CheckoutEntry::Redirect(nav) = Checkout::enter(cart, session, settings()) else {
            panic!("expected redirect");
        };
        assert_eq!(nav.route, Route::Cart);
    }

    #[test]
    fn test_form_is_prefilled_from_session() {
        let (cart, session) = signed_in();
        let CheckoutEntry::Ready(checkout) = Checkout::enter(cart, session, settings()) else {
            panic!("expected checkout");
        };
        assert_eq!(checkout.form().email, "meera@example.in");
        assert_eq!(checkout.phase(), &CheckoutPhase::Address);
    }

    #[test]
    fn test_blank_pincode_blocks_payment() {
        let (cart, session) = signed_in();
        let CheckoutEntry::Ready(mut checkout) = Checkout::enter(cart, session, settings()) else {
            panic!("expected checkout");
        };
        let form = checkout.form_mut();
        form.street = "12 Ring Rd".to_string();
        form.city = "Surat".to_string();

        let err = checkout.proceed_to_payment().unwrap_err();
        assert!(matches!(&err, CheckoutError::MissingFields(f) if f == &[AddressField::Pincode]));
        assert_eq!(err.user_message(), FIELDS_REQUIRED);
        assert_eq!(checkout.phase(), &CheckoutPhase::Address);
    }

    #[tokio::test]
    async fn test_place_order_requires_payment_phase() {
        let (cart, session) = signed_in();
        let CheckoutEntry::Ready(mut checkout) = Checkout::enter(cart, session, settings()) else {
            panic!("expected checkout");
        };

        // No expectations: any gateway call would panic
        let gateway = MockCheckoutGateway::new();
        let widget = MockPaymentWidget::new();
        let err = checkout.place_order(&gateway, &widget).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidPhase { phase: "address", .. }));
    }

    #[tokio::test]
    async fn test_cart_emptied_after_entry_returns_to_cart() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);
        cart.clear_cart();

        // No expectations: any gateway or widget call would panic
        let gateway = MockCheckoutGateway::new();
        let widget = MockPaymentWidget::new();
        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        assert_eq!(outcome, CheckoutOutcome::Leave(Navigation::to(Route::Cart)));
        assert_eq!(checkout.phase(), &CheckoutPhase::Payment);
    }

    #[tokio::test]
    async fn test_complete_payment_verifies_without_new_order() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);

        let mut gateway = MockCheckoutGateway::new();
        gateway
            .expect_verify_payment()
            .withf(|signed| signed == &signed_payment())
            .times(1)
            .returning(|_| {
                Ok(VerificationResult {
                    success: true,
                    message: None,
                })
            });

        let outcome = checkout
            .complete_payment(&gateway, &signed_payment(), Some("AV-1042".to_string()))
            .await
            .unwrap();

        let CheckoutOutcome::Leave(nav) = outcome else {
            panic!("expected navigation");
        };
        assert_eq!(nav.route, Route::OrderSuccess("AV-1042".to_string()));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_complete_payment_requires_payment_phase() {
        let (cart, session) = signed_in();
        let CheckoutEntry::Ready(mut checkout) = Checkout::enter(cart, session, settings()) else {
            panic!("expected checkout");
        };

        let gateway = MockCheckoutGateway::new();
        let err = checkout
            .complete_payment(&gateway, &signed_payment(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidPhase { phase: "address", .. }));
    }

    #[tokio::test]
    async fn test_back_to_address() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);
        checkout.back_to_address().unwrap();
        assert_eq!(checkout.phase(), &CheckoutPhase::Address);
        assert!(checkout.back_to_address().is_err());
    }

    #[tokio::test]
    async fn test_successful_payment_clears_cart() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);

        let mut gateway = MockCheckoutGateway::new();
        gateway.expect_update_profile().times(1).returning(|update: &ProfileUpdate| {
            let mut user = user();
            user.phone = Some(update.phone.clone());
            Ok(user)
        });
        gateway
            .expect_create_order()
            .withf(|order: &NewOrder| {
                order.total_amount == Decimal::from(2000)
                    && order.items.len() == 2
                    && order.items[1].price == Decimal::from(500)
                    && order.shipping_address.address == "12 Ring Rd"
                    && order.payment_method == PaymentMethod::Online
            })
            .times(1)
            .returning(|_| Ok(created_order(Some("AV-1042"), "665f00aa")));
        gateway
            .expect_verify_payment()
            .withf(|p: &PaymentVerification| p == &signed_payment())
            .times(1)
            .returning(|_| {
                Ok(VerificationResult {
                    success: true,
                    message: None,
                })
            });

        let mut widget = MockPaymentWidget::new();
        widget
            .expect_initiate()
            .withf(|req: &PaymentRequest| {
                req.amount == 200_000
                    && req.currency == CurrencyCode::INR
                    && req.description == "Order #AV-1042"
                    && req.order_id == "order_Rz123"
                    && req.prefill.contact == "9876543210"
                    && req.notes.address == "12 Ring Rd"
            })
            .times(1)
            .returning(|_| PaymentOutcome::Confirmed(signed_payment()));

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        assert_eq!(
            outcome,
            CheckoutOutcome::Leave(
                Navigation::to(Route::OrderSuccess("AV-1042".to_string()))
                    .with_notice(Notice::success(PAYMENT_SUCCESSFUL))
            )
        );
        assert!(cart.is_empty());
        assert_eq!(
            checkout.phase(),
            &CheckoutPhase::Confirmed {
                order_ref: Some("AV-1042".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_verification_error_keeps_cart() {
        let (cart, session) = signed_in();
        let before = cart.snapshot();
        let mut checkout = ready(&cart, &session);

        let mut gateway = gateway_creating(created_order(Some("AV-1042"), "665f00aa"));
        gateway.expect_verify_payment().times(1).returning(|_| {
            Err(ApiError::Api {
                status: 400,
                message: "Invalid signature".to_string(),
            })
        });
        let widget = widget_returning(PaymentOutcome::Confirmed(signed_payment()));

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        let CheckoutOutcome::Leave(nav) = outcome else {
            panic!("expected navigation");
        };
        assert_eq!(nav.route, Route::OrderFailed("AV-1042".to_string()));
        assert_eq!(nav.notice.unwrap().message, VERIFICATION_FAILED);
        assert_eq!(cart.snapshot(), before);
    }

    #[tokio::test]
    async fn test_unsuccessful_verification_is_failure() {
        let (cart, session) = signed_in();
        let before = cart.snapshot();
        let mut checkout = ready(&cart, &session);

        let mut gateway = gateway_creating(created_order(None, "665f00aa"));
        gateway.expect_verify_payment().returning(|_| {
            Ok(VerificationResult {
                success: false,
                message: Some("Signature mismatch".to_string()),
            })
        });
        let widget = widget_returning(PaymentOutcome::Confirmed(signed_payment()));

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        let CheckoutOutcome::Leave(nav) = outcome else {
            panic!("expected navigation");
        };
        assert_eq!(nav.route, Route::OrderFailed("665f00aa".to_string()));
        assert_eq!(cart.snapshot(), before);
        assert!(matches!(checkout.phase(), CheckoutPhase::Failed { .. }));
    }

    #[tokio::test]
    async fn test_verified_without_any_order_id_goes_to_profile() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);

        let order: Order = serde_json::from_value(serde_json::json!({
            "totalAmount": 2000,
            "razorpayOrderId": "order_Rz123"
        }))
        .unwrap();
        let mut gateway = gateway_creating(order);
        gateway.expect_verify_payment().returning(|_| {
            Ok(VerificationResult {
                success: true,
                message: None,
            })
        });
        let widget = widget_returning(PaymentOutcome::Confirmed(signed_payment()));

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        let CheckoutOutcome::Leave(nav) = outcome else {
            panic!("expected navigation");
        };
        assert_eq!(nav.route, Route::Profile);
        assert_eq!(nav.notice.unwrap().message, ORDER_ID_MISSING);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_payment_stays_on_payment_step() {
        let (cart, session) = signed_in();
        let before = cart.snapshot();
        let mut checkout = ready(&cart, &session);

        let mut gateway = gateway_creating(created_order(Some("AV-1042"), "665f00aa"));
        gateway.expect_verify_payment().never();
        let widget = widget_returning(PaymentOutcome::Cancelled);

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        assert_eq!(outcome, CheckoutOutcome::Stay(Notice::error(PAYMENT_CANCELLED)));
        assert_eq!(checkout.phase(), &CheckoutPhase::Payment);
        assert_eq!(cart.snapshot(), before);
    }

    #[tokio::test]
    async fn test_widget_without_response_abandons() {
        let (cart, session) = signed_in();
        let before = cart.snapshot();
        let mut checkout = ready(&cart, &session);

        let mut gateway = gateway_creating(created_order(Some("AV-1042"), "665f00aa"));
        gateway.expect_verify_payment().never();
        let widget = widget_returning(PaymentOutcome::NoResponse);

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        assert_eq!(outcome, CheckoutOutcome::Abandoned);
        assert_eq!(checkout.phase(), &CheckoutPhase::Abandoned);
        assert!(checkout.phase().is_terminal());
        assert_eq!(cart.snapshot(), before);
    }

    #[tokio::test]
    async fn test_order_creation_failure_stays_with_message() {
        let (cart, session) = signed_in();
        let before = cart.snapshot();
        let mut checkout = ready(&cart, &session);

        let mut gateway = MockCheckoutGateway::new();
        gateway.expect_update_profile().returning(|_| Ok(user()));
        gateway.expect_create_order().times(1).returning(|_| {
            Err(ApiError::Api {
                status: 409,
                message: "Only 1 left in stock".to_string(),
            })
        });
        let mut widget = MockPaymentWidget::new();
        widget.expect_initiate().never();

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();

        assert_eq!(outcome, CheckoutOutcome::Stay(Notice::error("Only 1 left in stock")));
        assert_eq!(checkout.phase(), &CheckoutPhase::Payment);
        assert_eq!(cart.snapshot(), before);
    }

    #[tokio::test]
    async fn test_profile_sync_failure_does_not_block_order() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);

        let mut gateway = MockCheckoutGateway::new();
        gateway.expect_update_profile().times(1).returning(|_| {
            Err(ApiError::Api {
                status: 500,
                message: "Something went wrong".to_string(),
            })
        });
        gateway
            .expect_create_order()
            .times(1)
            .returning(|_| Ok(created_order(Some("AV-1042"), "665f00aa")));
        gateway.expect_verify_payment().returning(|_| {
            Ok(VerificationResult {
                success: true,
                message: None,
            })
        });
        let widget = widget_returning(PaymentOutcome::Confirmed(signed_payment()));

        let outcome = checkout.place_order(&gateway, &widget).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Leave(_)));
        assert_eq!(session.user().unwrap().phone.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_profile_sync_updates_session() {
        let (cart, session) = signed_in();
        let mut checkout = ready(&cart, &session);
        checkout.back_to_address().unwrap();
        checkout.form_mut().phone = "9000000000".to_string();
        checkout.proceed_to_payment().unwrap();

        let mut gateway = MockCheckoutGateway::new();
        gateway.expect_update_profile().returning(|update: &ProfileUpdate| {
            let mut user = user();
            user.phone = Some(update.phone.clone());
            Ok(user)
        });
        gateway.expect_create_order().returning(|_| {
            Err(ApiError::Api {
                status: 503,
                message: "Something went wrong".to_string(),
            })
        });
        let widget = MockPaymentWidget::new();

        checkout.place_order(&gateway, &widget).await.unwrap();
        assert_eq!(session.user().unwrap().phone.as_deref(), Some("9000000000"));
    }

    struct SlowVerifier;

    #[async_trait]
    impl CheckoutGateway for SlowVerifier {
        async fn update_profile(&self, _: &ProfileUpdate) -> Result<User, ApiError> {
            Ok(user())
        }

        async fn create_order(&self, _: &NewOrder) -> Result<Order, ApiError> {
            Ok(created_order(Some("AV-1042"), "665f00aa"))
        }

        async fn verify_payment(
            &self,
            _: &PaymentVerification,
        ) -> Result<VerificationResult, ApiError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(VerificationResult {
                success: true,
                message: None,
            })
        }
    }

    #[tokio::test]
    async fn test_verification_timeout_is_failure() {
        let (cart, session) = signed_in();
        let before = cart.snapshot();
        let CheckoutEntry::Ready(mut checkout) = Checkout::enter(
            cart.clone(),
            session.clone(),
            CheckoutSettings {
                verify_timeout: Some(Duration::from_millis(50)),
                ..settings()
            },
        ) else {
            panic!("expected checkout");
        };
        let form = checkout.form_mut();
        form.street = "12 Ring Rd".to_string();
        form.city = "Surat".to_string();
        form.pincode = "395002".to_string();
        checkout.proceed_to_payment().unwrap();

        let widget = widget_returning(PaymentOutcome::Confirmed(signed_payment()));
        let outcome = checkout.place_order(&SlowVerifier, &widget).await.unwrap();

        let CheckoutOutcome::Leave(nav) = outcome else {
            panic!("expected navigation");
        };
        assert_eq!(nav.route, Route::OrderFailed("AV-1042".to_string()));
        assert_eq!(cart.snapshot(), before);
    }
}
