use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::OutgoingEmail;
use crate::domain::order::{
    Order, OrderFilter, OrderStatus, PlacedOrder, ShippingAddressInput, StatusChange,
};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{Mailer, OrderRepository};
use crate::domain::role::Permission;
use crate::domain::user::Caller;

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    mailer: Arc<dyn Mailer>,
}

fn confirmation_email(placed: &PlacedOrder) -> OutgoingEmail {
    OutgoingEmail {
        to: placed.buyer_email.clone(),
        subject: "Order Confirmation".to_string(),
        body: format!(
            "Your order #{} has been placed successfully! We will update you once it's shipped.",
            placed.order_id
        ),
    }
}

fn status_email(change: &StatusChange) -> OutgoingEmail {
    let name = change.buyer_first_name.as_deref().unwrap_or("customer");
    let body = if change.current == OrderStatus::Cancelled {
        format!(
            "Dear {},\n\nWe regret to inform you that your order #{} has been cancelled.\nIf you have any questions, please contact support.",
            name, change.order_id
        )
    } else {
        format!(
            "Dear {},\n\nYour order #{} status has been updated to {}.",
            name, change.order_id, change.current
        )
    };
    OutgoingEmail {
        to: change.buyer_email.clone(),
        subject: format!("Order #{} Update", change.order_id),
        body,
    }
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, mailer: Arc<dyn Mailer>) -> Self {
        Self { repo, mailer }
    }

    fn send(&self, email: OutgoingEmail) {
        if let Err(e) = self.mailer.send(&email) {
            log::warn!("Sending '{}' to {} failed: {}", email.subject, email.to, e);
        }
    }

    /// Turns the caller's cart into a pending order. Stock is reserved only
    /// once the payment is confirmed.
    pub fn place(&self, user_id: Uuid, address: ShippingAddressInput) -> Result<PlacedOrder, DomainError> {
        let address = address.validate()?;
        let placed = self.repo.place(user_id, address)?;
        log::info!(
            "Order {} placed by {} for {}",
            placed.order_id,
            user_id,
            placed.total_price
        );
        self.send(confirmation_email(&placed));
        Ok(placed)
    }

    pub fn list_mine(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.repo.list_for_user(user_id)
    }

    /// Owners and order managers only; anyone else gets a 404.
    pub fn get(&self, caller: &Caller, id: Uuid) -> Result<Order, DomainError> {
        match self.repo.find(id)? {
            Some(order) if order.user_id == caller.id || caller.role.allows(Permission::ManageOrders) => {
                Ok(order)
            }
            _ => Err(DomainError::NotFound("Order")),
        }
    }

    pub fn list_all(
        &self,
        caller: &Caller,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        caller.require(Permission::ManageOrders)?;
        self.repo.list_all(filter, page)
    }

    pub fn update_status(&self, caller: &Caller, id: Uuid, status: OrderStatus) -> Result<StatusChange, DomainError> {
        caller.require(Permission::ManageOrders)?;
        let change = self.repo.update_status(id, status)?;
        log::info!(
            "Order {} moved from {} to {} by {}",
            change.order_id,
            change.previous,
            change.current,
            caller.id
        );
        if change.current.notifies_buyer() && change.previous != change.current {
            self.send(status_email(&change));
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::domain::order::ShippingAddress;
    use crate::domain::payment::{PaymentDetails, Reconciliation};
    use crate::domain::role::Role;

    struct OneOrder {
        order: Order,
        next: Mutex<OrderStatus>,
    }

    impl OrderRepository for OneOrder {
        fn place(&self, _: Uuid, _: ShippingAddress) -> Result<PlacedOrder, DomainError> {
            Ok(PlacedOrder {
                order_id: self.order.id,
                total_price: self.order.total_price.clone(),
                buyer_email: self.order.user_email.clone(),
                buyer_first_name: None,
            })
        }
        fn list_for_user(&self, _: Uuid) -> Result<Vec<Order>, DomainError> {
            Ok(vec![self.order.clone()])
        }
        fn find(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
            Ok(Some(self.order.clone()).filter(|o| o.id == id))
        }
        fn list_all(&self, _: &OrderFilter, page: PageRequest) -> Result<Page<Order>, DomainError> {
            Ok(Page::new(vec![self.order.clone()], 1, page))
        }
        fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<StatusChange, DomainError> {
            let mut current = self.next.lock().unwrap();
            let previous = *current;
            *current = previous.transition_to(status)?;
            Ok(StatusChange {
                order_id: id,
                previous,
                current: status,
                buyer_email: self.order.user_email.clone(),
                buyer_first_name: Some("Ana".into()),
            })
        }
        fn record_payment_success(&self, _: &PaymentDetails) -> Result<Reconciliation, DomainError> {
            Ok(Reconciliation::Skipped)
        }
        fn record_payment_failure(&self, _: Uuid) -> Result<Reconciliation, DomainError> {
            Ok(Reconciliation::Skipped)
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn order(owner: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: owner,
            user_email: "ana@example.com".into(),
            total_price: BigDecimal::from(40),
            status: OrderStatus::Pending,
            payment_method: None,
            payment_status: None,
            payment_id: None,
            transaction_reference: None,
            receipt_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: Vec::new(),
            shipping_address: None,
        }
    }

    fn service(owner: Uuid) -> (OrderService, Arc<RecordingMailer>, Uuid) {
        let order = order(owner);
        let id = order.id;
        let recorder = Arc::new(RecordingMailer::default());
        let repo = Arc::new(OneOrder {
            order,
            next: Mutex::new(OrderStatus::Pending),
        });
        (OrderService::new(repo, recorder.clone()), recorder, id)
    }

    #[test]
    fn strangers_cannot_see_an_order() {
        let owner = Uuid::new_v4();
        let (svc, _, id) = service(owner);
        assert!(svc.get(&Caller::new(owner, Role::Athlete), id).is_ok());
        assert!(svc.get(&Caller::new(Uuid::new_v4(), Role::SuperAdmin), id).is_ok());
        assert!(matches!(
            svc.get(&Caller::new(Uuid::new_v4(), Role::Coach), id),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn placing_validates_address_and_sends_confirmation() {
        let owner = Uuid::new_v4();
        let (svc, recorder, id) = service(owner);
        assert!(matches!(
            svc.place(owner, ShippingAddressInput::default()),
            Err(DomainError::Validation(_))
        ));

        let address = ShippingAddressInput {
            first_name: Some("Ana".into()),
            last_name: Some("Lopez".into()),
            country: Some("US".into()),
            state: Some("TX".into()),
            city: Some("Austin".into()),
            street_address: Some("1 Main St".into()),
            zip_code: Some("73301".into()),
            phone_number: Some("5551234567".into()),
        };
        svc.place(owner, address).unwrap();
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Order Confirmation");
        assert!(sent[0].body.contains(&id.to_string()));
    }

    #[test]
    fn status_changes_need_admin_and_mail_the_buyer() {
        let (svc, recorder, id) = service(Uuid::new_v4());
        let admin = Caller::new(Uuid::new_v4(), Role::SuperAdmin);
        assert!(matches!(
            svc.update_status(&Caller::new(Uuid::new_v4(), Role::Coach), id, OrderStatus::Shipped),
            Err(DomainError::Forbidden(_))
        ));

        svc.update_status(&admin, id, OrderStatus::Processing).unwrap();
        assert!(recorder.sent.lock().unwrap().is_empty());
        svc.update_status(&admin, id, OrderStatus::Cancelled).unwrap();
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("has been cancelled"));
        assert!(sent[0].body.starts_with("Dear Ana"));
    }
}
