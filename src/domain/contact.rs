use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{DomainError, FieldErrors};
use super::user::{looks_like_email, normalize_email};

pub const MAX_NAME_LEN: usize = 255;

/// A message left through the public contact form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContactMessage {
    /// Trims every field and reports all problems at once.
    pub fn validated(self) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();
        errors.require("name", Some(self.name.as_str()));
        errors.require("email", Some(self.email.as_str()));
        errors.require("message", Some(self.message.as_str()));

        let name = self.name.trim().to_string();
        if name.chars().count() > MAX_NAME_LEN {
            errors.add(
                "name",
                format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN),
            );
        }
        let email = normalize_email(&self.email);
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        errors.into_result()?;

        Ok(Self {
            name,
            email,
            message: self.message.trim().to_string(),
        })
    }
}
