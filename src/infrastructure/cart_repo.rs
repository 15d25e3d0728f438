use diesel::pg::upsert::excluded;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{check_line_quantity, Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::models::product::{CartItemRow, CartRow, NewCartItemRow, NewCartRow};
use crate::schema::{cart_items, carts, products};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn cart_id_for(conn: &mut PgConnection, user_id: Uuid) -> Result<Uuid, DomainError> {
    diesel::insert_into(carts::table)
        .values(&NewCartRow {
            id: Uuid::new_v4(),
            user_id,
        })
        .on_conflict(carts::user_id)
        .do_nothing()
        .execute(conn)?;
    let id = carts::table
        .filter(carts::user_id.eq(user_id))
        .select(carts::id)
        .first(conn)?;
    Ok(id)
}

fn load_cart(conn: &mut PgConnection, user_id: Uuid) -> Result<Cart, DomainError> {
    let cart_id = cart_id_for(conn, user_id)?;
    let rows: Vec<(CartItemRow, String, Vec<String>)> = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::cart_id.eq(cart_id))
        .order(products::name.asc())
        .select((CartItemRow::as_select(), products::name, products::images))
        .load(conn)?;

    let items = rows
        .into_iter()
        .map(|(item, name, images)| CartItem {
            id: item.id,
            product_id: item.product_id,
            product_name: name,
            product_image: images.into_iter().next(),
            total_price: &item.price_at_purchase * bigdecimal::BigDecimal::from(item.quantity),
            price_at_purchase: item.price_at_purchase,
            quantity: item.quantity,
        })
        .collect();
    Ok(Cart::new(cart_id, user_id, items))
}

impl CartRepository for DieselCartRepository {
    fn get(&self, user_id: Uuid) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        load_cart(&mut conn, user_id)
    }

    fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let price = products::table
                .find(product_id)
                .select(products::price)
                .first::<bigdecimal::BigDecimal>(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Product"))?;
            let cart_id = cart_id_for(conn, user_id)?;

            let existing: i32 = cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .filter(cart_items::product_id.eq(product_id))
                .select(cart_items::quantity)
                .for_update()
                .first(conn)
                .optional()?
                .unwrap_or(0);
            check_line_quantity(existing.saturating_add(quantity))?;

            // The snapshot price from the first add is kept on conflict.
            diesel::insert_into(cart_items::table)
                .values(&NewCartItemRow {
                    id: Uuid::new_v4(),
                    cart_id,
                    product_id,
                    quantity,
                    price_at_purchase: price,
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
                .execute(conn)?;

            load_cart(conn, user_id)
        })
    }

    fn update_item(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id = cart_id_for(conn, user_id)?;
            let target = cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq(cart_id));
            let affected = if quantity <= 0 {
                diesel::delete(target).execute(conn)?
            } else {
                diesel::update(target)
                    .set(cart_items::quantity.eq(quantity))
                    .execute(conn)?
            };
            if affected == 0 {
                return Err(DomainError::NotFound("Cart item"));
            }
            load_cart(conn, user_id)
        })
    }

    fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id = cart_id_for(conn, user_id)?;
            let deleted = diesel::delete(
                cart_items::table
                    .filter(cart_items::id.eq(item_id))
                    .filter(cart_items::cart_id.eq(cart_id)),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(DomainError::NotFound("Cart item"));
            }
            load_cart(conn, user_id)
        })
    }

    fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let cart_id = cart_id_for(&mut conn, user_id)?;
        diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
            .execute(&mut conn)?;
        Ok(())
    }
}
