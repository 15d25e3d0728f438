use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// Payment data recorded on an order once the provider confirms the charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub order_id: Uuid,
    pub payment_id: String,
    pub payment_method: Option<String>,
    pub transaction_reference: Option<String>,
    pub receipt_url: Option<String>,
}

/// Verified provider event, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    Succeeded(PaymentDetails),
    Failed { order_id: Uuid },
    /// Unhandled event type or an event without a usable order reference.
    Ignored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Applied,
    /// Order missing or no longer pending.
    Skipped,
}

/// Converts an order total to the provider's smallest currency unit.
pub fn amount_in_cents(total: &BigDecimal) -> Result<i64, DomainError> {
    if *total <= BigDecimal::zero() {
        return Err(DomainError::InvalidInput(
            "Order total must be greater than zero".to_string(),
        ));
    }
    (total * BigDecimal::from(100))
        .round(0)
        .to_i64()
        .ok_or_else(|| DomainError::InvalidInput("Order total is out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn converts_dollars_to_cents() {
        let total = BigDecimal::from_str("39.98").unwrap();
        assert_eq!(amount_in_cents(&total).unwrap(), 3998);
    }

    #[test]
    fn zero_total_is_rejected() {
        assert!(matches!(
            amount_in_cents(&BigDecimal::zero()),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
