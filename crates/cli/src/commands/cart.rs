//! Shopping bag commands.

use avira_vastra_core::{Price, ProductId};
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::navigation::NoticeLevel;
use avira_vastra_storefront::services::CartHandle;
use avira_vastra_storefront::services::catalog::{add_to_bag, load_product};
use clap::Subcommand;

use super::{CliError, CommandResult, print_notice, say};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the bag
    Show,
    /// Add a product to the bag
    Add {
        /// Product ID
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the bag
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a line's quantity; zero or less removes it
    Update {
        /// Product ID
        id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the bag
    Clear,
}

pub async fn run(state: &AppState, action: CartAction) -> CommandResult {
    let cart = state.cart();

    match action {
        CartAction::Show => {}
        CartAction::Add { id, quantity } => {
            let product = match load_product(state.api(), &ProductId::new(id)).await {
                Ok(product) => product,
                Err(navigation) => {
                    return match navigation.notice {
                        Some(notice) => Err(CliError::Refused(notice)),
                        None => Ok(()),
                    };
                }
            };
            let notice = add_to_bag(cart, &product, quantity);
            if notice.level == NoticeLevel::Error {
                return Err(CliError::Refused(notice));
            }
            print_notice(&notice)?;
        }
        CartAction::Remove { id } => cart.remove_item(&ProductId::new(id)),
        CartAction::Update { id, quantity } => {
            cart.update_quantity(&ProductId::new(id), quantity);
        }
        CartAction::Clear => cart.clear_cart(),
    }

    print_cart(cart)
}

fn print_cart(cart: &CartHandle) -> CommandResult {
    let snapshot = cart.snapshot();
    if snapshot.items.is_empty() {
        say!("Your bag is empty");
        return Ok(());
    }

    for item in &snapshot.items {
        say!(
            "{:<26} {:<40} {:>3} x {:<10} = {}",
            item.product_id,
            item.name,
            item.quantity,
            Price::inr(item.effective_unit_price()).to_string(),
            Price::inr(item.line_total())
        );
    }
    say!(
        "{} item(s), total {}",
        snapshot.item_count(),
        Price::inr(snapshot.total())
    );
    Ok(())
}
