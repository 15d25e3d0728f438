use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::domain::payment::{amount_in_cents, PaymentEvent, PaymentIntent, Reconciliation};
use crate::domain::ports::{OrderRepository, PaymentGateway};

#[derive(Clone)]
pub struct PaymentService {
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(orders: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { orders, gateway }
    }

    /// Asks the provider for an intent covering the caller's order total.
    /// Only pending orders can still be paid.
    pub fn create_intent(&self, user_id: Uuid, order_id: Uuid) -> Result<PaymentIntent, DomainError> {
        let order = self
            .orders
            .find(order_id)?
            .filter(|o| o.user_id == user_id)
            .ok_or(DomainError::NotFound("Order"))?;
        if order.status != OrderStatus::Pending {
            return Err(DomainError::InvalidInput(format!(
                "Order is {} and can no longer be paid",
                order.status
            )));
        }
        let cents = amount_in_cents(&order.total_price)?;
        self.gateway.create_payment_intent(order.id, cents)
    }

    /// Applies a verified provider event. Repeated or late deliveries are
    /// no-ops because only pending orders are touched.
    pub fn reconcile(&self, event: PaymentEvent) -> Result<Reconciliation, DomainError> {
        let outcome = match &event {
            PaymentEvent::Succeeded(details) => self.orders.record_payment_success(details)?,
            PaymentEvent::Failed { order_id } => self.orders.record_payment_failure(*order_id)?,
            PaymentEvent::Ignored(reason) => {
                log::info!("Ignoring payment event: {}", reason);
                return Ok(Reconciliation::Skipped);
            }
        };
        match (&event, outcome) {
            (PaymentEvent::Succeeded(d), Reconciliation::Applied) => {
                log::info!("Order {} paid ({})", d.order_id, d.payment_id)
            }
            (PaymentEvent::Failed { order_id }, Reconciliation::Applied) => {
                log::info!("Order {} cancelled after failed payment", order_id)
            }
            (_, Reconciliation::Skipped) => {
                log::info!("Payment event for unknown or settled order skipped: {:?}", event)
            }
            _ => {}
        }
        Ok(outcome)
    }
}
