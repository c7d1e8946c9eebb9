//! Checkout command.
//!
//! The hosted payment widget cannot run in a terminal. A first run creates
//! the order and prints the gateway order to pay. After paying out of band,
//! a second run passes the signed fields back and only verifies them; no
//! new order is created.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use avira_vastra_core::Price;
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::checkout::{
    Checkout, CheckoutEntry, CheckoutOutcome, PaymentOutcome, PaymentRequest, PaymentWidget,
};
use avira_vastra_storefront::models::PaymentVerification;
use clap::Args;

use super::{CliError, CommandResult, print_navigation, say};

#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient name (defaults to the profile)
    #[arg(long)]
    name: Option<String>,

    /// Contact phone (defaults to the profile)
    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    street: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    pincode: Option<String>,

    /// Gateway order the out-of-band payment was made against
    #[arg(long, requires_all = ["payment_id", "signature"], conflicts_with = "cancel")]
    payment_order_id: Option<String>,

    /// Payment ID returned by the widget
    #[arg(long, requires = "payment_order_id")]
    payment_id: Option<String>,

    /// Signature returned by the widget
    #[arg(long, requires = "payment_order_id")]
    signature: Option<String>,

    /// Order number to show once the payment is verified (e.g. `AV-1042`)
    #[arg(long, requires = "payment_order_id")]
    order: Option<String>,

    /// Dismiss the payment instead of leaving it pending
    #[arg(long)]
    cancel: bool,
}

/// Payment widget for a terminal: it records the request so the customer
/// can pay elsewhere, and never reports a payment itself.
struct DeferredWidget {
    cancel: bool,
    requested: Mutex<Option<PaymentRequest>>,
}

#[async_trait]
impl PaymentWidget for DeferredWidget {
    async fn initiate(&self, request: PaymentRequest) -> PaymentOutcome {
        tracing::info!(
            payment_order_id = %request.order_id,
            amount_paise = request.amount,
            description = %request.description,
            "Payment requested"
        );
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner) = Some(request);

        if self.cancel {
            PaymentOutcome::Cancelled
        } else {
            PaymentOutcome::NoResponse
        }
    }
}

pub async fn run(state: &AppState, args: CheckoutArgs) -> CommandResult {
    let mut checkout = match state.begin_checkout()? {
        CheckoutEntry::Ready(checkout) => checkout,
        CheckoutEntry::Redirect(navigation) => return print_navigation(&navigation),
    };

    fill_form(&mut checkout, &args);
    checkout.proceed_to_payment()?;

    if let (Some(payment_order_id), Some(payment_id), Some(signature)) =
        (args.payment_order_id, args.payment_id, args.signature)
    {
        let signed = PaymentVerification {
            razorpay_order_id: payment_order_id,
            razorpay_payment_id: payment_id,
            razorpay_signature: signature,
        };
        let outcome = checkout
            .complete_payment(state.api(), &signed, args.order)
            .await?;
        return finish(outcome);
    }

    let widget = DeferredWidget {
        cancel: args.cancel,
        requested: Mutex::new(None),
    };
    let outcome = checkout.place_order(state.api(), &widget).await?;

    let requested = widget
        .requested
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    if let (CheckoutOutcome::Abandoned, Some(request)) = (&outcome, requested) {
        print_payment_instructions(&request)?;
        return Ok(());
    }
    finish(outcome)
}

fn finish(outcome: CheckoutOutcome) -> CommandResult {
    match outcome {
        CheckoutOutcome::Leave(navigation) => print_navigation(&navigation),
        CheckoutOutcome::Stay(notice) => Err(CliError::Refused(notice)),
        CheckoutOutcome::Abandoned => {
            say!("Payment not completed; the order is awaiting payment");
            Ok(())
        }
    }
}

fn print_payment_instructions(request: &PaymentRequest) -> CommandResult {
    say!("{} is awaiting payment", request.description);
    say!(
        "  amount:        {}",
        Price::from_minor_units(request.amount, request.currency)
    );
    say!("  gateway order: {}", request.order_id);
    say!("  key:           {}", request.key);
    say!("Once paid, run:");
    say!(
        "  av-cli checkout --payment-order-id {} --payment-id <id> --signature <signature> [--order <number>]",
        request.order_id
    );
    Ok(())
}

fn fill_form(checkout: &mut Checkout, args: &CheckoutArgs) {
    let form = checkout.form_mut();
    let fields = [
        (&mut form.name, &args.name),
        (&mut form.phone, &args.phone),
        (&mut form.street, &args.street),
        (&mut form.city, &args.city),
        (&mut form.state, &args.state),
        (&mut form.pincode, &args.pincode),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            field.clone_from(value);
        }
    }
}
