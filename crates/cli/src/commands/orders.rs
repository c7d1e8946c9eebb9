//! Order history and tracking commands.

use avira_vastra_core::{Email, Price};
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::checkout::{OrderConfirmation, resolve_order};
use avira_vastra_storefront::models::Order;
use chrono::Utc;
use clap::Subcommand;

use super::{CommandResult, say};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List the signed-in customer's orders
    Mine,
    /// Track an order by reference and email
    Track {
        /// Order reference (e.g. `AV-1042`)
        order_id: String,

        #[arg(short, long)]
        email: Email,
    },
    /// Show one order
    Show {
        /// Order ID or reference
        id: String,
    },
    /// Show the confirmation page for an order reference
    Confirmation {
        order_ref: String,
    },
}

pub async fn run(state: &AppState, action: OrdersAction) -> CommandResult {
    let api = state.api();

    match action {
        OrdersAction::Mine => {
            let orders = api.my_orders().await?;
            if orders.is_empty() {
                say!("No orders yet");
            }
            for order in &orders {
                print_order_line(order)?;
            }
        }
        OrdersAction::Track { order_id, email } => {
            let order = api.track_order(&order_id, email.as_str()).await?;
            print_order(&order)?;
        }
        OrdersAction::Show { id } => {
            let order = api.get_order(&id).await?;
            print_order(&order)?;
        }
        OrdersAction::Confirmation { order_ref } => {
            let order = resolve_order(api, state.session(), &order_ref).await;
            let page = OrderConfirmation::new(&order_ref, order.as_ref(), Utc::now());
            say!("Order {}", page.order_ref);
            say!("  date:    {}", page.date_display());
            say!("  total:   {}", page.total_display());
            say!("  payment: {}", page.payment_status);
        }
    }
    Ok(())
}

/// One-line order summary.
pub(crate) fn print_order_line(order: &Order) -> CommandResult {
    let date = order
        .created_at
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    say!(
        "{:<12} {:<10} {:>12}  {:<8} {}",
        order.reference().unwrap_or(order.id.as_str()),
        date,
        Price::inr(order.total_amount).to_string(),
        order.payment_status,
        order.order_status
    );
    Ok(())
}

/// Full order detail.
pub(crate) fn print_order(order: &Order) -> CommandResult {
    say!("Order {}", order.reference().unwrap_or(order.id.as_str()));
    say!("  status:  {} / payment {}", order.order_status, order.payment_status);
    say!("  total:   {}", Price::inr(order.total_amount));
    if let Some(name) = &order.customer_name {
        say!("  for:     {name}");
    }
    if let Some(address) = &order.shipping_address {
        say!(
            "  ship to: {}, {}, {} {}",
            address.address,
            address.city,
            address.state,
            address.pincode
        );
    }
    for item in &order.items {
        say!(
            "  - {} x {} @ {}",
            item.quantity,
            item.name,
            Price::inr(item.price)
        );
    }
    Ok(())
}
