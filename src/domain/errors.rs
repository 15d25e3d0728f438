use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Field-level validation messages, keyed by request field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn require(&mut self, field: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(field, "This field is required.");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded, otherwise a `Validation` error.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Insufficient stock for {}", .0.join(", "))]
    InsufficientStock(Vec<String>),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Payment provider error: {0}")]
    Payment(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        DomainError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn require_flags_missing_and_blank_values() {
        let mut errors = FieldErrors::new();
        errors.require("city", None);
        errors.require("state", Some("   "));
        errors.require("country", Some("US"));

        assert!(errors.contains("city"));
        assert!(errors.contains("state"));
        assert!(!errors.contains("country"));
        assert!(matches!(
            errors.into_result(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn insufficient_stock_lists_every_product() {
        let err = DomainError::InsufficientStock(vec!["Ball".into(), "Bat".into()]);
        assert_eq!(err.to_string(), "Insufficient stock for Ball, Bat");
    }

    #[test]
    fn field_errors_serialize_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.add("email", "already registered");
        let json = serde_json::to_value(&errors).expect("serializable");
        assert_eq!(json, serde_json::json!({ "email": ["already registered"] }));
    }
}
