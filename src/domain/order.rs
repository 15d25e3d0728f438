use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{DomainError, FieldErrors};
use super::page::Sort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Payment has been confirmed for orders in these states.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
        )
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.is_terminal() && next != self {
            return Err(DomainError::InvalidInput(format!(
                "Cannot change status of a {} order",
                self
            )));
        }
        Ok(next)
    }

    /// Whether moving from `self` to `next` must put the ordered quantities back.
    pub fn restores_stock(self, next: OrderStatus) -> bool {
        next == OrderStatus::Cancelled
            && matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    /// Status changes the buyer is told about by e-mail.
    pub fn notifies_buyer(&self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Shipped | OrderStatus::Delivered
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput("Invalid status".to_string()))
    }
}

pub const PAYMENT_SUCCEEDED: &str = "succeeded";
pub const PAYMENT_FAILED: &str = "failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub street_address: String,
    pub zip_code: String,
    pub phone_number: String,
}

/// Raw shipping payload; every field is required.
#[derive(Debug, Clone, Default)]
pub struct ShippingAddressInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street_address: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
}

impl ShippingAddressInput {
    pub fn validate(self) -> Result<ShippingAddress, DomainError> {
        let mut errors = FieldErrors::new();
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("country", &self.country),
            ("state", &self.state),
            ("city", &self.city),
            ("street_address", &self.street_address),
            ("zip_code", &self.zip_code),
            ("phone_number", &self.phone_number),
        ];
        for (name, value) in fields {
            errors.require(name, value.as_deref());
        }
        errors.into_result()?;

        let take = |v: Option<String>| v.unwrap_or_default().trim().to_string();
        Ok(ShippingAddress {
            first_name: take(self.first_name),
            last_name: take(self.last_name),
            country: take(self.country),
            state: take(self.state),
            city: take(self.city),
            street_address: take(self.street_address),
            zip_code: take(self.zip_code),
            phone_number: take(self.phone_number),
        })
    }
}

/// A cart line joined with the product's live price and stock.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub stock: i32,
}

/// Fails with every product whose stock cannot cover its line.
pub fn check_stock(lines: &[CheckoutLine]) -> Result<(), DomainError> {
    let short: Vec<String> = lines
        .iter()
        .filter(|l| l.quantity > l.stock)
        .map(|l| l.product_name.clone())
        .collect();
    if short.is_empty() {
        Ok(())
    } else {
        Err(DomainError::InsufficientStock(short))
    }
}

pub fn order_total(lines: &[CheckoutLine]) -> BigDecimal {
    lines.iter().fold(BigDecimal::zero(), |acc, l| {
        acc + &l.unit_price * BigDecimal::from(l.quantity)
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_purchase: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub total_price: BigDecimal,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub payment_id: Option<String>,
    pub transaction_reference: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
}

/// Result of a committed checkout, used for the confirmation e-mail.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub total_price: BigDecimal,
    pub buyer_email: String,
    pub buyer_first_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order_id: Uuid,
    pub previous: OrderStatus,
    pub current: OrderStatus,
    pub buyer_email: String,
    pub buyer_first_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortField {
    CreatedAt,
    TotalPrice,
    Status,
}

impl FromStr for OrderSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "total_price" => Ok(Self::TotalPrice),
            "status" => Ok(Self::Status),
            _ => Err(()),
        }
    }
}

/// A `created_at` filter value: a bare `YYYY-MM-DD` (midnight UTC) or a
/// full timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
}

impl TimeBound {
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            TimeBound::Date(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            TimeBound::Instant(at) => *at,
        }
    }
}

impl FromStr for TimeBound {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            return Ok(TimeBound::Instant(at.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(TimeBound::Instant(Utc.from_utc_datetime(&naive)));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(TimeBound::Date)
            .map_err(|_| ())
    }
}

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub email: Option<String>,
    pub search: Option<String>,
    pub total_price: Option<BigDecimal>,
    pub total_price_lt: Option<BigDecimal>,
    pub total_price_gt: Option<BigDecimal>,
    /// A bare date matches the whole day.
    pub created_at: Option<TimeBound>,
    pub created_at_lt: Option<TimeBound>,
    pub created_at_gt: Option<TimeBound>,
    pub sort: Sort<OrderSortField>,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            email: None,
            search: None,
            total_price: None,
            total_price_lt: None,
            total_price_gt: None,
            created_at: None,
            created_at_lt: None,
            created_at_gt: None,
            sort: Sort::desc(OrderSortField::CreatedAt),
        }
    }
}
