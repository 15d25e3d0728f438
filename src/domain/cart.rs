use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;

/// Upper bound for a single cart line, after merging repeated adds.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

pub fn check_line_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(DomainError::field(
            "quantity",
            format!("Ensure this value is less than or equal to {}.", MAX_LINE_QUANTITY),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: Option<String>,
    pub price_at_purchase: BigDecimal,
    pub quantity: i32,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub subtotal: BigDecimal,
}

impl Cart {
    pub fn new(id: Uuid, user_id: Uuid, items: Vec<CartItem>) -> Self {
        let subtotal = items
            .iter()
            .fold(BigDecimal::zero(), |acc, item| acc + &item.total_price);
        Self {
            id,
            user_id,
            items,
            subtotal,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
