use std::collections::HashMap;

use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::domain::page::Sort;
use crate::domain::ports::ReviewRepository;
use crate::domain::review::{RatingStats, Review, ReviewSortField};
use crate::models::engagement::{NewReviewRow, ReviewRow};
use crate::schema::{order_items, orders, products, reviews};

use super::product_repo::rating_stats;
use super::support::{load_summaries, summary_from};

pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_reviews(conn: &mut PgConnection, rows: Vec<ReviewRow>) -> Result<Vec<Review>, DomainError> {
    let user_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let authors = load_summaries(conn, &user_ids)?;
    let names: HashMap<Uuid, String> = products::table
        .filter(products::id.eq_any(&product_ids))
        .select((products::id, products::name))
        .load::<(Uuid, String)>(conn)?
        .into_iter()
        .collect();
    rows.into_iter()
        .map(|row| {
            Ok(Review {
                user: summary_from(&authors, row.user_id)?,
                product_name: names.get(&row.product_id).cloned().unwrap_or_default(),
                id: row.id,
                product_id: row.product_id,
                order_id: row.order_id,
                rating: row.rating,
                review_text: row.review_text,
                created_at: row.created_at,
            })
        })
        .collect()
}

fn single(conn: &mut PgConnection, row: ReviewRow) -> Result<Review, DomainError> {
    to_reviews(conn, vec![row])?
        .pop()
        .ok_or(DomainError::NotFound("Review"))
}

/// Most recent order by the user that contains the product and has been paid for.
fn paid_order_with(
    conn: &mut PgConnection,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<Option<Uuid>, DomainError> {
    let paid: Vec<&'static str> = OrderStatus::ALL
        .iter()
        .filter(|s| s.is_paid())
        .map(|s| s.as_str())
        .collect();
    let order_id = orders::table
        .inner_join(order_items::table)
        .filter(orders::user_id.eq(user_id))
        .filter(order_items::product_id.eq(product_id))
        .filter(orders::status.eq_any(paid))
        .order(orders::created_at.desc())
        .select(orders::id)
        .first::<Uuid>(conn)
        .optional()?;
    Ok(order_id)
}

fn sorted(
    query: reviews::BoxedQuery<'static, Pg>,
    sort: Sort<ReviewSortField>,
) -> reviews::BoxedQuery<'static, Pg> {
    let query = match (sort.field, sort.descending) {
        (ReviewSortField::Rating, false) => query.order(reviews::rating.asc()),
        (ReviewSortField::Rating, true) => query.order(reviews::rating.desc()),
        (ReviewSortField::CreatedAt, false) => query.order(reviews::created_at.asc()),
        (ReviewSortField::CreatedAt, true) => query.order(reviews::created_at.desc()),
    };
    query.then_order_by(reviews::id.asc())
}

impl ReviewRepository for DieselReviewRepository {
    fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        rating: i32,
        review_text: Option<String>,
    ) -> Result<(Review, bool), DomainError> {
        let mut conn = self.pool.get()?;
        let (row, created) = conn.transaction::<_, DomainError, _>(|conn| {
            let product_exists: bool = diesel::select(diesel::dsl::exists(
                products::table.find(product_id),
            ))
            .get_result(conn)?;
            if !product_exists {
                return Err(DomainError::NotFound("Product"));
            }

            let existing = reviews::table
                .filter(reviews::user_id.eq(user_id))
                .filter(reviews::product_id.eq(product_id))
                .select(ReviewRow::as_select())
                .for_update()
                .first(conn)
                .optional()?;

            if let Some(existing) = existing {
                let row = diesel::update(reviews::table.find(existing.id))
                    .set((
                        reviews::rating.eq(rating),
                        reviews::review_text.eq(review_text),
                    ))
                    .returning(ReviewRow::as_returning())
                    .get_result(conn)?;
                return Ok((row, false));
            }

            let order_id = paid_order_with(conn, user_id, product_id)?.ok_or_else(|| {
                DomainError::InvalidInput(
                    "You can only review products you have purchased.".to_string(),
                )
            })?;
            let row = diesel::insert_into(reviews::table)
                .values(&NewReviewRow {
                    id: Uuid::new_v4(),
                    user_id,
                    product_id,
                    order_id,
                    rating,
                    review_text,
                })
                .returning(ReviewRow::as_returning())
                .get_result(conn)?;
            Ok((row, true))
        })?;
        Ok((single(&mut conn, row)?, created))
    }

    fn find(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(|row| single(&mut conn, row)).transpose()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(reviews::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn for_product(
        &self,
        product_id: Uuid,
        sort: Sort<ReviewSortField>,
    ) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let query = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .into_boxed();
        let rows = sorted(query, sort)
            .select(ReviewRow::as_select())
            .load(&mut conn)?;
        to_reviews(&mut conn, rows)
    }

    fn for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.desc(), reviews::id.asc()))
            .load(&mut conn)?;
        to_reviews(&mut conn, rows)
    }

    fn stats(&self, product_id: Uuid) -> Result<RatingStats, DomainError> {
        let mut conn = self.pool.get()?;
        let stats = rating_stats(&mut conn, &[product_id])?;
        Ok(stats
            .get(&product_id)
            .copied()
            .unwrap_or_else(|| RatingStats::from_totals(0, 0)))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselReviewRepository;
    use crate::db::DbPool;
    use crate::domain::errors::DomainError;
    use crate::domain::order::ShippingAddress;
    use crate::domain::page::Sort;
    use crate::domain::payment::PaymentDetails;
    use crate::domain::ports::{CartRepository, OrderRepository, ReviewRepository};
    use crate::domain::review::ReviewSortField;
    use crate::domain::role::Role;
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::order_repo::DieselOrderRepository;
    use crate::infrastructure::testing::{seed_product, seed_user, setup_db};

    fn buy(pool: &DbPool, user: Uuid, product: Uuid, pay: bool) {
        DieselCartRepository::new(pool.clone())
            .add_item(user, product, 1)
            .unwrap();
        let orders = DieselOrderRepository::new(pool.clone());
        let placed = orders
            .place(
                user,
                ShippingAddress {
                    first_name: "Rae".into(),
                    last_name: "Kim".into(),
                    country: "US".into(),
                    state: "WA".into(),
                    city: "Seattle".into(),
                    street_address: "9 Pine St".into(),
                    zip_code: "98101".into(),
                    phone_number: "5559876543".into(),
                },
            )
            .unwrap();
        if pay {
            orders
                .record_payment_success(&PaymentDetails {
                    order_id: placed.order_id,
                    payment_id: format!("pi_{}", placed.order_id.simple()),
                    payment_method: None,
                    transaction_reference: None,
                    receipt_url: None,
                })
                .unwrap();
        }
    }

    #[tokio::test]
    async fn only_buyers_with_paid_orders_can_review() {
        let (_container, pool) = setup_db().await;
        let repo = DieselReviewRepository::new(pool.clone());
        let product = seed_product(&pool, "Shin Guards", "15.00", 10);
        let browser = seed_user(&pool, Role::GeneralUser, "Browser");
        let unpaid = seed_user(&pool, Role::Athlete, "Unpaid");
        buy(&pool, unpaid, product, false);

        for user in [browser, unpaid] {
            match repo.upsert(user, product, 5, None) {
                Err(DomainError::InvalidInput(msg)) => assert!(msg.contains("purchased")),
                other => panic!("expected InvalidInput, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn second_review_updates_the_first() {
        let (_container, pool) = setup_db().await;
        let repo = DieselReviewRepository::new(pool.clone());
        let product = seed_product(&pool, "Cleats", "80.00", 10);
        let first = seed_user(&pool, Role::Athlete, "First");
        let second = seed_user(&pool, Role::Athlete, "Second");
        buy(&pool, first, product, true);
        buy(&pool, second, product, true);

        let (review, created) = repo.upsert(first, product, 3, Some("ok".into())).unwrap();
        assert!(created);
        assert_eq!(review.product_name, "Cleats");
        let (updated, created) = repo.upsert(first, product, 5, Some("great".into())).unwrap();
        assert!(!created);
        assert_eq!(updated.id, review.id);
        assert_eq!(updated.rating, 5);
        repo.upsert(second, product, 4, None).unwrap();

        let stats = repo.stats(product).unwrap();
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.average_rating, 4.5);

        let by_rating = repo
            .for_product(product, Sort::asc(ReviewSortField::Rating))
            .unwrap();
        assert_eq!(by_rating[0].rating, 4);
        assert_eq!(repo.for_user(first).unwrap().len(), 1);

        assert!(repo.delete(review.id).unwrap());
        assert_eq!(repo.stats(product).unwrap().total_reviews, 1);
    }
}
