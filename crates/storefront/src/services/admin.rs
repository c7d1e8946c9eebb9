//! Back-office list filters.

use avira_vastra_core::OrderStatus;

use crate::models::{CustomerSummary, Order};

/// Orders in `status`, or every order when `status` is `None`.
#[must_use]
pub fn filter_orders(orders: &[Order], status: Option<OrderStatus>) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| status.is_none_or(|s| order.order_status == s))
        .collect()
}

/// Customers matching a free-text search on name, email or phone.
#[must_use]
pub fn search_customers<'a>(
    customers: &'a [CustomerSummary],
    term: &str,
) -> Vec<&'a CustomerSummary> {
    customers.iter().filter(|c| c.matches(term)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: &str, status: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "totalAmount": 1000,
            "orderStatus": status
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_orders_by_status() {
        let orders = vec![
            order("1", "PLACED"),
            order("2", "SHIPPED"),
            order("3", "PLACED"),
        ];

        let placed = filter_orders(&orders, Some(OrderStatus::Placed));
        assert_eq!(placed.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), ["1", "3"]);
        assert_eq!(filter_orders(&orders, None).len(), 3);
        assert!(filter_orders(&orders, Some(OrderStatus::Cancelled)).is_empty());
    }

    #[test]
    fn test_search_customers() {
        let customers: Vec<CustomerSummary> = serde_json::from_value(serde_json::json!([
            { "_id": "c1", "name": "Anita Desai", "email": "anita@example.in", "phone": "9812345678" },
            { "_id": "c2", "name": "Rahul Mehta", "email": "rahul@example.in" }
        ]))
        .unwrap();

        assert_eq!(search_customers(&customers, "mehta").len(), 1);
        assert_eq!(search_customers(&customers, "example.in").len(), 2);
        assert_eq!(search_customers(&customers, "98123").len(), 1);
    }
}
