use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;
use super::role::{Permission, Role};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Identity and credential data used for login and token checks.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub password_hash: String,
    pub password_changed_at: DateTime<Utc>,
    pub fcm_token: Option<String>,
    pub notify_on_like: bool,
    pub notify_on_comment: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub full_name: String,
    pub role: Role,
    pub mobile_number: Option<String>,
    pub profile_picture: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height: Option<BigDecimal>,
    pub weight: Option<BigDecimal>,
    pub high_school: Option<String>,
    pub college: Option<String>,
    pub division: Option<String>,
    pub school_year: Option<String>,
    pub years_left_to_play: Option<i32>,
    pub sport: Option<NamedRef>,
    pub position: Option<NamedRef>,
    pub fcm_token: Option<String>,
    pub is_online: bool,
    pub notify_on_like: bool,
    pub notify_on_comment: bool,
    pub notify_on_chat: bool,
}

/// Compact user representation embedded in other resources.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub full_name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub mobile_number: Option<String>,
    pub profile_picture: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub fcm_token: Option<String>,
    pub is_online: Option<bool>,
    pub notify_on_like: Option<bool>,
    pub notify_on_comment: Option<bool>,
    pub notify_on_chat: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AthleteProfileUpdate {
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height: Option<BigDecimal>,
    pub weight: Option<BigDecimal>,
    pub high_school: Option<String>,
    pub college: Option<String>,
    pub division: Option<String>,
    pub school_year: Option<String>,
    pub years_left_to_play: Option<i32>,
    pub sport_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserSearch {
    pub role: Role,
    pub name: Option<String>,
    pub weight: Option<BigDecimal>,
    pub height: Option<BigDecimal>,
    pub sport_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub division: Option<String>,
    /// Minimum remaining years of eligibility.
    pub eligibility: Option<i32>,
}

impl UserSearch {
    /// Athlete-only filters are dropped for other roles.
    pub fn normalized(mut self) -> Self {
        if self.role != Role::Athlete {
            self.weight = None;
            self.height = None;
            self.sport_id = None;
            self.position_id = None;
            self.division = None;
            self.eligibility = None;
        }
        self
    }
}

/// Authenticated caller, as seen by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn require(&self, permission: Permission) -> Result<(), DomainError> {
        self.role.require(permission)
    }

    /// Only the owner may act, whatever their role.
    pub fn require_owner(&self, owner_id: Uuid) -> Result<(), DomainError> {
        if self.id == owner_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Only the author can edit this.".to_string(),
            ))
        }
    }

    /// The owner may act on their own resource; others need the permission.
    pub fn require_owner_or(&self, owner_id: Uuid, permission: Permission) -> Result<(), DomainError> {
        if self.id == owner_id || self.role.allows(permission) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ))
        }
    }
}

pub fn full_name(first: Option<&str>, middle: Option<&str>, last: Option<&str>) -> String {
    [first, middle, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Username derived from the e-mail local part plus a random suffix.
pub fn generate_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut slug = String::with_capacity(local.len());
    for ch in local.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let suffix = &Uuid::new_v4().simple().to_string()[..6];
    if slug.is_empty() {
        format!("user-{}", suffix)
    } else {
        format!("{}-{}", slug, suffix)
    }
}

pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => email.to_string(),
    }
}

pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
