use std::collections::HashMap;

use chrono::{Days, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, NotificationKind};
use crate::domain::order::{
    check_stock, order_total, CheckoutLine, Order, OrderFilter, OrderItem, OrderSortField,
    OrderStatus, PlacedOrder, ShippingAddress, StatusChange, TimeBound, PAYMENT_FAILED,
    PAYMENT_SUCCEEDED,
};
use crate::domain::page::{Page, PageRequest};
use crate::domain::payment::{PaymentDetails, Reconciliation};
use crate::domain::ports::OrderRepository;
use crate::models::order::{
    NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, PaymentChangeset, ShippingAddressRow,
};
use crate::models::product::{CartItemRow, ProductRow};
use crate::schema::{cart_items, carts, order_items, orders, products, shipping_addresses, users};

use super::cart_repo::cart_id_for;
use super::notification_repo::insert_notification;
use super::support::{contains_pattern, parse_stored};

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn buyer(conn: &mut PgConnection, user_id: Uuid) -> Result<(String, Option<String>), DomainError> {
    users::table
        .find(user_id)
        .select((users::email, users::first_name))
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("User"))
}

/// Attaches items, shipping address and buyer e-mail to order rows.
fn assemble(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let user_ids: Vec<Uuid> = rows.iter().map(|o| o.user_id).collect();

    let item_rows: Vec<(OrderItemRow, String)> = order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq_any(&order_ids))
        .select((OrderItemRow::as_select(), products::name))
        .load(conn)?;
    let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for (item, product_name) in item_rows {
        items.entry(item.order_id).or_default().push(OrderItem {
            id: item.id,
            product_id: item.product_id,
            product_name,
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        });
    }

    let mut addresses: HashMap<Uuid, ShippingAddress> = shipping_addresses::table
        .filter(shipping_addresses::order_id.eq_any(&order_ids))
        .select(ShippingAddressRow::as_select())
        .load::<ShippingAddressRow>(conn)?
        .into_iter()
        .map(|a| {
            (
                a.order_id,
                ShippingAddress {
                    first_name: a.first_name,
                    last_name: a.last_name,
                    country: a.country,
                    state: a.state,
                    city: a.city,
                    street_address: a.street_address,
                    zip_code: a.zip_code,
                    phone_number: a.phone_number,
                },
            )
        })
        .collect();

    let emails: HashMap<Uuid, String> = users::table
        .filter(users::id.eq_any(&user_ids))
        .select((users::id, users::email))
        .load::<(Uuid, String)>(conn)?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|row| {
            Ok(Order {
                status: parse_stored(&row.status)?,
                items: items.remove(&row.id).unwrap_or_default(),
                shipping_address: addresses.remove(&row.id),
                user_email: emails.get(&row.user_id).cloned().unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                total_price: row.total_price,
                payment_method: row.payment_method,
                payment_status: row.payment_status,
                payment_id: row.payment_id,
                transaction_reference: row.transaction_reference,
                receipt_url: row.receipt_url,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
        })
        .collect()
}

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    if let Some(email) = filter.email.as_deref().filter(|e| !e.trim().is_empty()) {
        query = query.filter(
            orders::user_id.eq_any(
                users::table
                    .filter(users::email.eq(email.trim().to_string()))
                    .select(users::id),
            ),
        );
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        query = query.filter(
            orders::user_id.eq_any(
                users::table
                    .filter(users::email.ilike(contains_pattern(term)))
                    .select(users::id),
            ),
        );
    }
    if let Some(price) = &filter.total_price {
        query = query.filter(orders::total_price.eq(price.clone()));
    }
    if let Some(lt) = &filter.total_price_lt {
        query = query.filter(orders::total_price.lt(lt.clone()));
    }
    if let Some(gt) = &filter.total_price_gt {
        query = query.filter(orders::total_price.gt(gt.clone()));
    }
    match filter.created_at {
        Some(TimeBound::Date(day)) => {
            let start = TimeBound::Date(day).instant();
            query = query.filter(orders::created_at.ge(start));
            if let Some(end) = start.checked_add_days(Days::new(1)) {
                query = query.filter(orders::created_at.lt(end));
            }
        }
        Some(TimeBound::Instant(at)) => query = query.filter(orders::created_at.eq(at)),
        None => {}
    }
    if let Some(bound) = filter.created_at_lt {
        query = query.filter(orders::created_at.lt(bound.instant()));
    }
    if let Some(bound) = filter.created_at_gt {
        query = query.filter(orders::created_at.gt(bound.instant()));
    }
    query
}

fn lock_order(conn: &mut PgConnection, id: Uuid) -> Result<Option<OrderRow>, DomainError> {
    let row = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .optional()?;
    Ok(row)
}

impl OrderRepository for DieselOrderRepository {
    fn place(&self, user_id: Uuid, address: ShippingAddress) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let (buyer_email, buyer_first_name) = buyer(conn, user_id)?;
            let cart_id = cart_id_for(conn, user_id)?;

            // 1. Lock the cart lines and their products for the rest of checkout
            let lines: Vec<(CartItemRow, ProductRow)> = cart_items::table
                .inner_join(products::table)
                .filter(cart_items::cart_id.eq(cart_id))
                .select((CartItemRow::as_select(), ProductRow::as_select()))
                .for_update()
                .load(conn)?;
            if lines.is_empty() {
                return Err(DomainError::InvalidInput("Cart is empty".to_string()));
            }

            let checkout: Vec<CheckoutLine> = lines
                .into_iter()
                .map(|(item, product)| CheckoutLine {
                    product_id: product.id,
                    product_name: product.name,
                    quantity: item.quantity,
                    unit_price: product.price,
                    stock: product.stock,
                })
                .collect();

            // 2. Every line must be coverable; stock itself is untouched until payment
            check_stock(&checkout)?;
            let total_price = order_total(&checkout);

            // 3. Order, items and address
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    total_price: total_price.clone(),
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .execute(conn)?;

            let new_items: Vec<NewOrderItemRow> = checkout
                .iter()
                .map(|l| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price_at_purchase: l.unit_price.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            diesel::insert_into(shipping_addresses::table)
                .values(&ShippingAddressRow {
                    id: Uuid::new_v4(),
                    order_id,
                    first_name: address.first_name,
                    last_name: address.last_name,
                    country: address.country,
                    state: address.state,
                    city: address.city,
                    street_address: address.street_address,
                    zip_code: address.zip_code,
                    phone_number: address.phone_number,
                })
                .execute(conn)?;

            // 4. In-app notification, committed with the order
            insert_notification(
                conn,
                &NewNotification {
                    recipient_id: user_id,
                    sender_id: None,
                    title: "Order placed".to_string(),
                    kind: NotificationKind::Order,
                    message: Some(format!(
                        "Your order {} for ${} has been placed.",
                        order_id, total_price
                    )),
                    link: Some(format!("/orders/{}", order_id)),
                },
            )?;

            Ok(PlacedOrder {
                order_id,
                total_price,
                buyer_email,
                buyer_first_name,
            })
        })
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        assemble(&mut conn, rows)
    }

    fn find(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };
        Ok(assemble(&mut conn, vec![order])?.pop())
    }

    fn list_all(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let query = filtered(filter).select(OrderRow::as_select());
            let query = match (filter.sort.field, filter.sort.descending) {
                (OrderSortField::CreatedAt, false) => query.order(orders::created_at.asc()),
                (OrderSortField::CreatedAt, true) => query.order(orders::created_at.desc()),
                (OrderSortField::TotalPrice, false) => query.order(orders::total_price.asc()),
                (OrderSortField::TotalPrice, true) => query.order(orders::total_price.desc()),
                (OrderSortField::Status, false) => query.order(orders::status.asc()),
                (OrderSortField::Status, true) => query.order(orders::status.desc()),
            };
            let rows = query
                .then_order_by(orders::id.asc())
                .limit(page.page_size)
                .offset(page.offset())
                .load(conn)?;

            Ok(Page::new(assemble(conn, rows)?, total, page))
        })
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<StatusChange, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = lock_order(conn, id)?.ok_or(DomainError::NotFound("Order"))?;
            let previous: OrderStatus = parse_stored(&row.status)?;
            let current = previous.transition_to(status)?;

            if previous.restores_stock(current) {
                let items = order_items::table
                    .filter(order_items::order_id.eq(id))
                    .select(OrderItemRow::as_select())
                    .load(conn)?;
                for item in items {
                    diesel::update(products::table.find(item.product_id))
                        .set(products::stock.eq(products::stock + item.quantity))
                        .execute(conn)?;
                }
            }

            diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(current.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            let (buyer_email, buyer_first_name) = buyer(conn, row.user_id)?;
            Ok(StatusChange {
                order_id: id,
                previous,
                current,
                buyer_email,
                buyer_first_name,
            })
        })
    }

    fn record_payment_success(&self, details: &PaymentDetails) -> Result<Reconciliation, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let Some(row) = lock_order(conn, details.order_id)? else {
                log::warn!("Payment succeeded for unknown order {}", details.order_id);
                return Ok(Reconciliation::Skipped);
            };
            if parse_stored::<OrderStatus>(&row.status)? != OrderStatus::Pending {
                log::info!(
                    "Order {} already {}, ignoring repeated payment success",
                    row.id,
                    row.status
                );
                return Ok(Reconciliation::Skipped);
            }

            diesel::update(orders::table.find(row.id))
                .set(&PaymentChangeset {
                    status: OrderStatus::Processing.as_str(),
                    payment_status: PAYMENT_SUCCEEDED,
                    payment_method: details.payment_method.as_deref(),
                    payment_id: Some(details.payment_id.as_str()),
                    transaction_reference: details.transaction_reference.as_deref(),
                    receipt_url: details.receipt_url.as_deref(),
                    updated_at: Utc::now(),
                })
                .execute(conn)?;

            let items = order_items::table
                .filter(order_items::order_id.eq(row.id))
                .select(OrderItemRow::as_select())
                .load(conn)?;
            for item in items {
                let updated = diesel::update(
                    products::table
                        .filter(products::id.eq(item.product_id))
                        .filter(products::stock.ge(item.quantity)),
                )
                .set(products::stock.eq(products::stock - item.quantity))
                .execute(conn)?;
                if updated == 0 {
                    log::warn!(
                        "Insufficient stock for product {} on paid order {}; skipped decrement",
                        item.product_id,
                        row.id
                    );
                }
            }

            diesel::delete(
                cart_items::table.filter(
                    cart_items::cart_id.eq_any(
                        carts::table
                            .filter(carts::user_id.eq(row.user_id))
                            .select(carts::id),
                    ),
                ),
            )
            .execute(conn)?;

            Ok(Reconciliation::Applied)
        })
    }

    fn record_payment_failure(&self, order_id: Uuid) -> Result<Reconciliation, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let Some(row) = lock_order(conn, order_id)? else {
                log::warn!("Payment failed for unknown order {}", order_id);
                return Ok(Reconciliation::Skipped);
            };
            if parse_stored::<OrderStatus>(&row.status)? != OrderStatus::Pending {
                return Ok(Reconciliation::Skipped);
            }
            diesel::update(orders::table.find(row.id))
                .set((
                    orders::status.eq(OrderStatus::Cancelled.as_str()),
                    orders::payment_status.eq(PAYMENT_FAILED),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            Ok(Reconciliation::Applied)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, TimeZone, Utc};
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::db::DbPool;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{OrderFilter, OrderStatus, ShippingAddress, TimeBound};
    use crate::domain::page::PageRequest;
    use crate::domain::payment::{PaymentDetails, Reconciliation};
    use crate::domain::ports::{CartRepository, OrderRepository};
    use crate::domain::role::Role;
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::testing::{product_stock, seed_product, seed_user, setup_db};
    use crate::schema::{notifications, order_items, orders, shipping_addresses};

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ana".into(),
            last_name: "Lopez".into(),
            country: "US".into(),
            state: "TX".into(),
            city: "Austin".into(),
            street_address: "1 Main St".into(),
            zip_code: "73301".into(),
            phone_number: "5551234567".into(),
        }
    }

    fn paid(order_id: Uuid) -> PaymentDetails {
        PaymentDetails {
            order_id,
            payment_id: "pi_123".into(),
            payment_method: Some("card".into()),
            transaction_reference: Some("ch_123".into()),
            receipt_url: Some("https://pay.example.com/r/1".into()),
        }
    }

    fn count_rows(pool: &DbPool) -> (i64, i64, i64) {
        let mut conn = pool.get().unwrap();
        (
            orders::table.count().get_result(&mut conn).unwrap(),
            order_items::table.count().get_result(&mut conn).unwrap(),
            shipping_addresses::table.count().get_result(&mut conn).unwrap(),
        )
    }

    #[tokio::test]
    async fn placing_an_order_keeps_stock_and_cart_until_payment() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let product = seed_product(&pool, "Ball", "19.99", 5);
        carts.add_item(user, product, 2).unwrap();

        let placed = repo.place(user, address()).expect("place failed");

        assert_eq!(placed.total_price, BigDecimal::from_str("39.98").unwrap());
        assert_eq!(product_stock(&pool, product), 5);
        assert_eq!(carts.get(user).unwrap().items.len(), 1);

        let order = repo.find(placed.order_id).unwrap().expect("order exists");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.shipping_address, Some(address()));

        let mut conn = pool.get().unwrap();
        let notes: i64 = notifications::table
            .filter(notifications::recipient_id.eq(user))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(notes, 1);
    }

    #[tokio::test]
    async fn insufficient_stock_rolls_back_everything() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let plenty = seed_product(&pool, "Cone", "2.00", 50);
        let scarce = seed_product(&pool, "Bat", "40.00", 2);
        carts.add_item(user, plenty, 1).unwrap();
        carts.add_item(user, scarce, 10).unwrap();

        match repo.place(user, address()) {
            Err(DomainError::InsufficientStock(names)) => assert_eq!(names, vec!["Bat".to_string()]),
            other => panic!("expected insufficient stock, got {:?}", other.map(|p| p.order_id)),
        }
        assert_eq!(count_rows(&pool), (0, 0, 0));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");

        assert!(matches!(
            repo.place(user, address()),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn payment_success_is_applied_exactly_once() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let product = seed_product(&pool, "Ball", "10.00", 5);
        carts.add_item(user, product, 2).unwrap();
        let placed = repo.place(user, address()).unwrap();

        assert_eq!(
            repo.record_payment_success(&paid(placed.order_id)).unwrap(),
            Reconciliation::Applied
        );
        assert_eq!(
            repo.record_payment_success(&paid(placed.order_id)).unwrap(),
            Reconciliation::Skipped
        );

        assert_eq!(product_stock(&pool, product), 3);
        assert!(carts.get(user).unwrap().is_empty());
        let order = repo.find(placed.order_id).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_status.as_deref(), Some("succeeded"));
        assert_eq!(order.payment_id.as_deref(), Some("pi_123"));
        assert_eq!(order.transaction_reference.as_deref(), Some("ch_123"));
    }

    #[tokio::test]
    async fn payment_for_unknown_order_is_a_no_op() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        assert_eq!(
            repo.record_payment_success(&paid(Uuid::new_v4())).unwrap(),
            Reconciliation::Skipped
        );
        assert_eq!(
            repo.record_payment_failure(Uuid::new_v4()).unwrap(),
            Reconciliation::Skipped
        );
    }

    #[tokio::test]
    async fn payment_failure_cancels_without_touching_stock() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let product = seed_product(&pool, "Ball", "10.00", 5);
        carts.add_item(user, product, 2).unwrap();
        let placed = repo.place(user, address()).unwrap();

        repo.record_payment_failure(placed.order_id).unwrap();

        let order = repo.find(placed.order_id).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.payment_status.as_deref(), Some("failed"));
        assert_eq!(product_stock(&pool, product), 5);
    }

    #[tokio::test]
    async fn cancelling_a_processing_order_restores_ordered_quantities() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let product = seed_product(&pool, "Ball", "10.00", 5);
        carts.add_item(user, product, 2).unwrap();
        let placed = repo.place(user, address()).unwrap();
        repo.record_payment_success(&paid(placed.order_id)).unwrap();
        assert_eq!(product_stock(&pool, product), 3);

        let change = repo
            .update_status(placed.order_id, OrderStatus::Cancelled)
            .unwrap();

        assert_eq!(change.previous, OrderStatus::Processing);
        assert_eq!(change.current, OrderStatus::Cancelled);
        assert_eq!(product_stock(&pool, product), 5);
        assert!(matches!(
            repo.update_status(placed.order_id, OrderStatus::Processing),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn admin_listing_filters_by_status_and_email() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let first = seed_user(&pool, Role::Athlete, "Ana");
        let second = seed_user(&pool, Role::Coach, "Ben");
        let product = seed_product(&pool, "Ball", "10.00", 50);

        carts.add_item(first, product, 1).unwrap();
        let a = repo.place(first, address()).unwrap();
        carts.add_item(second, product, 3).unwrap();
        repo.place(second, address()).unwrap();
        repo.record_payment_success(&paid(a.order_id)).unwrap();

        let all = repo.list_all(&OrderFilter::default(), PageRequest::default()).unwrap();
        assert_eq!(all.count, 2);

        let processing = OrderFilter {
            status: Some(OrderStatus::Processing),
            ..Default::default()
        };
        let page = repo.list_all(&processing, PageRequest::default()).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, a.order_id);

        let by_email = OrderFilter {
            email: Some(a.buyer_email.clone()),
            ..Default::default()
        };
        let page = repo.list_all(&by_email, PageRequest::default()).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].user_id, first);
    }

    #[tokio::test]
    async fn cancelling_a_pending_order_adds_its_quantities_back() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let product = seed_product(&pool, "Ball", "10.00", 5);
        carts.add_item(user, product, 2).unwrap();
        let placed = repo.place(user, address()).unwrap();
        assert_eq!(product_stock(&pool, product), 5);

        let change = repo
            .update_status(placed.order_id, OrderStatus::Cancelled)
            .unwrap();

        assert_eq!(change.previous, OrderStatus::Pending);
        assert_eq!(product_stock(&pool, product), 7);
    }

    #[tokio::test]
    async fn cancelling_a_shipped_order_leaves_stock_alone() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let user = seed_user(&pool, Role::Athlete, "Ana");
        let product = seed_product(&pool, "Ball", "10.00", 5);
        carts.add_item(user, product, 2).unwrap();
        let placed = repo.place(user, address()).unwrap();
        repo.record_payment_success(&paid(placed.order_id)).unwrap();
        repo.update_status(placed.order_id, OrderStatus::Shipped).unwrap();
        assert_eq!(product_stock(&pool, product), 3);

        let change = repo
            .update_status(placed.order_id, OrderStatus::Cancelled)
            .unwrap();

        assert_eq!(change.previous, OrderStatus::Shipped);
        assert_eq!(change.current, OrderStatus::Cancelled);
        assert_eq!(product_stock(&pool, product), 3);
    }

    #[tokio::test]
    async fn admin_listing_filters_by_date_and_price() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());

        let mut placed = Vec::new();
        for (name, price, at) in [
            ("Cap", "10.00", Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()),
            ("Bat", "30.00", Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap()),
            ("Net", "50.00", Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap()),
        ] {
            let user = seed_user(&pool, Role::Athlete, name);
            let product = seed_product(&pool, name, price, 10);
            carts.add_item(user, product, 1).unwrap();
            let order = repo.place(user, address()).unwrap();
            let mut conn = pool.get().unwrap();
            diesel::update(orders::table.find(order.order_id))
                .set(orders::created_at.eq(at))
                .execute(&mut conn)
                .unwrap();
            placed.push(order.order_id);
        }
        let ids = |filter: OrderFilter| -> Vec<Uuid> {
            let mut ids: Vec<Uuid> = repo
                .list_all(&filter, PageRequest::default())
                .unwrap()
                .results
                .into_iter()
                .map(|o| o.id)
                .collect();
            ids.sort();
            ids
        };
        let sorted = |mut v: Vec<Uuid>| {
            v.sort();
            v
        };
        let march_first = TimeBound::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let march_second = TimeBound::Date(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());

        // After midnight of the 1st: the rest of that day counts.
        let after = OrderFilter {
            created_at_gt: Some(march_first),
            ..Default::default()
        };
        assert_eq!(ids(after), sorted(vec![placed[1], placed[2]]));

        let before = OrderFilter {
            created_at_lt: Some(march_second),
            ..Default::default()
        };
        assert_eq!(ids(before), sorted(vec![placed[0], placed[1]]));

        let on_day = OrderFilter {
            created_at: Some(march_first),
            ..Default::default()
        };
        assert_eq!(ids(on_day), sorted(vec![placed[0], placed[1]]));

        let at_instant = OrderFilter {
            created_at: Some(TimeBound::Instant(
                Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap(),
            )),
            ..Default::default()
        };
        assert_eq!(ids(at_instant), vec![placed[1]]);

        let mid_priced = OrderFilter {
            total_price_gt: Some(BigDecimal::from(20)),
            total_price_lt: Some(BigDecimal::from(40)),
            ..Default::default()
        };
        assert_eq!(ids(mid_priced), vec![placed[1]]);

        let exact_price = OrderFilter {
            total_price: Some(BigDecimal::from_str("50.00").unwrap()),
            ..Default::default()
        };
        assert_eq!(ids(exact_price), vec![placed[2]]);
    }
}
