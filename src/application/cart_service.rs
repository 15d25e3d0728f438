use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cart::{check_line_quantity, Cart};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

#[derive(Clone)]
pub struct CartService {
    repo: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>) -> Self {
        Self { repo }
    }

    pub fn get(&self, user_id: Uuid) -> Result<Cart, DomainError> {
        self.repo.get(user_id)
    }

    pub fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<Cart, DomainError> {
        if quantity < 1 {
            return Err(DomainError::field(
                "quantity",
                "Ensure this value is greater than or equal to 1.",
            ));
        }
        check_line_quantity(quantity)?;
        self.repo.add_item(user_id, product_id, quantity)
    }

    /// A quantity of zero or less removes the line.
    pub fn update_item(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> Result<Cart, DomainError> {
        check_line_quantity(quantity)?;
        self.repo.update_item(user_id, item_id, quantity)
    }

    pub fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Cart, DomainError> {
        self.repo.remove_item(user_id, item_id)
    }

    pub fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.repo.clear(user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::cart::MAX_LINE_QUANTITY;

    #[derive(Default)]
    struct Calls(Mutex<usize>);

    impl CartRepository for Calls {
        fn get(&self, user_id: Uuid) -> Result<Cart, DomainError> {
            Ok(Cart::new(Uuid::new_v4(), user_id, Vec::new()))
        }
        fn add_item(&self, user_id: Uuid, _: Uuid, _: i32) -> Result<Cart, DomainError> {
            *self.0.lock().unwrap() += 1;
            self.get(user_id)
        }
        fn update_item(&self, user_id: Uuid, _: Uuid, _: i32) -> Result<Cart, DomainError> {
            *self.0.lock().unwrap() += 1;
            self.get(user_id)
        }
        fn remove_item(&self, user_id: Uuid, _: Uuid) -> Result<Cart, DomainError> {
            self.get(user_id)
        }
        fn clear(&self, _: Uuid) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[test]
    fn out_of_range_quantities_never_reach_the_store() {
        let repo = Arc::new(Calls::default());
        let svc = CartService::new(repo.clone());
        let (user, product) = (Uuid::new_v4(), Uuid::new_v4());

        for quantity in [0, -3, i32::MAX, MAX_LINE_QUANTITY + 1] {
            assert!(matches!(
                svc.add(user, product, quantity),
                Err(DomainError::Validation(_))
            ));
        }
        assert!(matches!(
            svc.update_item(user, product, i32::MAX),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(*repo.0.lock().unwrap(), 0);

        svc.add(user, product, MAX_LINE_QUANTITY).unwrap();
        svc.update_item(user, product, 0).unwrap();
        assert_eq!(*repo.0.lock().unwrap(), 2);
    }
}
