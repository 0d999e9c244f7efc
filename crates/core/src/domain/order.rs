use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        items: Vec<OrderItem>,
        currency: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let total = items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        Self { id: id.into(), items, total, currency: currency.into(), created_at }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{Order, OrderItem};

    #[test]
    fn total_is_sum_of_line_totals() {
        let order = Order::new(
            "order-1",
            vec![
                OrderItem {
                    product_id: "espresso".to_owned(),
                    name: "Espresso Beans".to_owned(),
                    quantity: 2,
                    price: Decimal::new(1_250, 2),
                },
                OrderItem {
                    product_id: "filter".to_owned(),
                    name: "Paper Filters".to_owned(),
                    quantity: 1,
                    price: Decimal::new(499, 2),
                },
            ],
            "INR",
            Utc::now(),
        );

        assert_eq!(order.total, Decimal::new(2_999, 2));
    }
}
