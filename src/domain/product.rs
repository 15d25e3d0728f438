use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::FieldErrors;
use super::page::Sort;

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub average_rating: f64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub images: Vec<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), super::errors::DomainError> {
        let mut errors = FieldErrors::new();
        check_fields(&mut errors, Some(&self.name), Some(&self.price), Some(self.stock));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn validate(&self) -> Result<(), super::errors::DomainError> {
        let mut errors = FieldErrors::new();
        check_fields(
            &mut errors,
            self.name.as_deref(),
            self.price.as_ref(),
            self.stock,
        );
        errors.into_result()
    }
}

fn check_fields(
    errors: &mut FieldErrors,
    name: Option<&str>,
    price: Option<&BigDecimal>,
    stock: Option<i32>,
) {
    if let Some(name) = name {
        if name.trim().is_empty() {
            errors.add("name", "This field may not be blank.");
        }
    }
    if let Some(price) = price {
        if *price < BigDecimal::zero() {
            errors.add("price", "Price must be a positive number.");
        }
    }
    if let Some(stock) = stock {
        if stock < 0 {
            errors.add("stock", "Stock must be a positive number.");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortField {
    Name,
    Price,
    Stock,
    CreatedAt,
}

impl FromStr for ProductSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            "created_at" => Ok(Self::CreatedAt),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub price_lt: Option<BigDecimal>,
    pub price_gt: Option<BigDecimal>,
    pub stock_lt: Option<i32>,
    pub stock_gt: Option<i32>,
    pub sort: Sort<ProductSortField>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            search: None,
            price_lt: None,
            price_gt: None,
            stock_lt: None,
            stock_gt: None,
            sort: Sort::desc(ProductSortField::CreatedAt),
        }
    }
}
