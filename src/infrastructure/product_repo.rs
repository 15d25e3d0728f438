use std::collections::HashMap;

use chrono::Utc;
use diesel::dsl::{count, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{
    NewProduct, Product, ProductFilter, ProductPatch, ProductSortField, RatedProduct,
};
use crate::domain::review::RatingStats;
use crate::models::product::{NewProductRow, ProductChangeset, ProductRow};
use crate::schema::{products, reviews};

use super::support::{contains_pattern, escape_like, is_unique_violation};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn to_product(row: ProductRow) -> Product {
    Product {
        id: row.id,
        name: row.name,
        description: row.description,
        price: row.price,
        stock: row.stock,
        images: row.images,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn name_conflict(e: diesel::result::Error) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::field("name", "A product with this name already exists.")
    } else {
        e.into()
    }
}

/// Review aggregates for the given products, keyed by product id.
pub(crate) fn rating_stats(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, RatingStats>, DomainError> {
    let rows: Vec<(Uuid, Option<i64>, i64)> = reviews::table
        .filter(reviews::product_id.eq_any(product_ids))
        .group_by(reviews::product_id)
        .select((reviews::product_id, sum(reviews::rating), count(reviews::id)))
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, total, n)| (id, RatingStats::from_totals(total.unwrap_or(0), n)))
        .collect())
}

fn with_ratings(
    conn: &mut PgConnection,
    rows: Vec<ProductRow>,
) -> Result<Vec<RatedProduct>, DomainError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let stats = rating_stats(conn, &ids)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let rating = stats
                .get(&row.id)
                .copied()
                .unwrap_or_else(|| RatingStats::from_totals(0, 0));
            RatedProduct {
                product: to_product(row),
                average_rating: rating.average_rating,
                total_reviews: rating.total_reviews,
            }
        })
        .collect())
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        query = query.filter(products::name.ilike(contains_pattern(term)));
    }
    if let Some(lt) = &filter.price_lt {
        query = query.filter(products::price.lt(lt.clone()));
    }
    if let Some(gt) = &filter.price_gt {
        query = query.filter(products::price.gt(gt.clone()));
    }
    if let Some(lt) = filter.stock_lt {
        query = query.filter(products::stock.lt(lt));
    }
    if let Some(gt) = filter.stock_gt {
        query = query.filter(products::stock.gt(gt));
    }
    query
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name.trim().to_string(),
                description: product.description,
                price: product.price,
                stock: product.stock,
                images: product.images,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .map_err(name_conflict)?;
        Ok(to_product(row))
    }

    fn find(&self, id: Uuid) -> Result<Option<RatedProduct>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(with_ratings(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn list(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<RatedProduct>, DomainError> {
        let mut conn = self.pool.get()?;
        let total: i64 = filtered(filter).count().get_result(&mut conn)?;

        let query = filtered(filter).select(ProductRow::as_select());
        let query = match (filter.sort.field, filter.sort.descending) {
            (ProductSortField::Name, false) => query.order(products::name.asc()),
            (ProductSortField::Name, true) => query.order(products::name.desc()),
            (ProductSortField::Price, false) => query.order(products::price.asc()),
            (ProductSortField::Price, true) => query.order(products::price.desc()),
            (ProductSortField::Stock, false) => query.order(products::stock.asc()),
            (ProductSortField::Stock, true) => query.order(products::stock.desc()),
            (ProductSortField::CreatedAt, false) => query.order(products::created_at.asc()),
            (ProductSortField::CreatedAt, true) => query.order(products::created_at.desc()),
        };
        let rows = query
            .then_order_by(products::id.asc())
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;

        let results = with_ratings(&mut conn, rows)?;
        Ok(Page::new(results, total, page))
    }

    fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let changes = ProductChangeset {
            name: patch.name.map(|n| n.trim().to_string()),
            description: patch.description,
            price: patch.price,
            stock: patch.stock,
            images: patch.images,
            updated_at: Utc::now(),
        };
        let row = diesel::update(products::table.find(id))
            .set(&changes)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(name_conflict)?;
        Ok(row.map(to_product))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn name_exists(&self, name: &str, except: Option<Uuid>) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = products::table
            .filter(products::name.ilike(escape_like(name)))
            .into_boxed();
        if let Some(except) = except {
            query = query.filter(products::id.ne(except));
        }
        let matches: i64 = query.count().get_result(&mut conn)?;
        Ok(matches > 0)
    }
}
