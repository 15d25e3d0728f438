use std::collections::HashMap;
use std::str::FromStr;

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::user::{full_name, UserSummary};
use crate::models::user::UserSummaryRow;
use crate::schema::users;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &diesel::result::Error) -> bool {
    matches!(
        e,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Parses an enum column; a bad stored value is a data-integrity problem.
pub(crate) fn parse_stored<T>(value: &str) -> Result<T, DomainError>
where
    T: FromStr,
{
    value
        .parse::<T>()
        .map_err(|_| DomainError::Internal(format!("Unexpected stored value '{}'", value)))
}

/// Escapes LIKE wildcards so the term only matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    term.trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

pub(crate) fn to_summary(row: UserSummaryRow) -> Result<UserSummary, DomainError> {
    Ok(UserSummary {
        full_name: full_name(
            row.first_name.as_deref(),
            row.middle_name.as_deref(),
            row.last_name.as_deref(),
        ),
        id: row.id,
        email: row.email,
        username: row.username,
        role: parse_stored(&row.role)?,
        profile_picture: row.profile_picture,
    })
}

pub(crate) fn load_summaries(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserSummary>, DomainError> {
    let rows = users::table
        .filter(users::id.eq_any(ids))
        .select(UserSummaryRow::as_select())
        .load(conn)?;
    rows.into_iter()
        .map(|r| to_summary(r).map(|s| (s.id, s)))
        .collect()
}

pub(crate) fn summary_from(
    summaries: &HashMap<Uuid, UserSummary>,
    id: Uuid,
) -> Result<UserSummary, DomainError> {
    summaries
        .get(&id)
        .cloned()
        .ok_or_else(|| DomainError::Internal(format!("User {} missing", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" 50%_off "), "%50\\%\\_off%");
    }

    #[test]
    fn bad_stored_value_is_internal() {
        let err = parse_stored::<crate::domain::role::Role>("wizard").unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
