//! Product page helpers.

use avira_vastra_core::ProductId;

use crate::api::ApiClient;
use crate::error::add_breadcrumb;
use crate::models::Product;
use crate::navigation::{Navigation, Notice, Route};
use crate::services::cart::CartHandle;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const OUT_OF_STOCK: &str = "Out of Stock";

/// Load a product for its detail page.
///
/// # Errors
///
/// Any failure sends the user back to the listing with a notice.
pub async fn load_product(api: &ApiClient, id: &ProductId) -> Result<Product, Navigation> {
    api.get_product(id).await.map_err(|e| {
        tracing::warn!(error = %e, product_id = %id, "Product lookup failed");
        Navigation::to(Route::Products).with_notice(Notice::error(PRODUCT_NOT_FOUND))
    })
}

/// Add `quantity` units of `product` to the cart.
///
/// Refuses (without touching the cart) when the product is out of stock or
/// the cart would hold more units than are in stock.
pub fn add_to_bag(cart: &CartHandle, product: &Product, quantity: u32) -> Notice {
    if !product.in_stock() {
        return Notice::error(OUT_OF_STOCK);
    }
    if quantity == 0 {
        return Notice::error("Select a quantity");
    }

    let in_cart = cart
        .items()
        .iter()
        .find(|item| item.product_id == product.id)
        .map_or(0, |item| item.quantity);
    if in_cart.saturating_add(quantity) > product.stock {
        return Notice::error(format!("Only {} left in stock", product.stock));
    }

    cart.add_item(product, quantity);
    add_breadcrumb(
        "cart",
        "Added to bag",
        Some(&[("product_id", product.id.as_str())]),
    );
    Notice::success(format!("{} added to bag!", product.name))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::navigation::NoticeLevel;
    use crate::services::cart::tests::product;
    use crate::store::MemoryStore;

    fn cart() -> CartHandle {
        CartHandle::load(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_add_to_bag_success_notice() {
        let cart = cart();
        let notice = add_to_bag(&cart, &product("a", 1000, None), 2);

        assert_eq!(notice, Notice::success("Saree a added to bag!"));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_out_of_stock_is_refused() {
        let cart = cart();
        let mut sold_out = product("a", 1000, None);
        sold_out.stock = 0;

        let notice = add_to_bag(&cart, &sold_out, 1);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_above_stock_is_refused() {
        let cart = cart();
        let mut scarce = product("a", 1000, None);
        scarce.stock = 3;

        assert_eq!(add_to_bag(&cart, &scarce, 2).level, NoticeLevel::Success);
        let notice = add_to_bag(&cart, &scarce, 2);
        assert_eq!(notice.message, "Only 3 left in stock");
        assert_eq!(cart.item_count(), 2);
    }
}
