use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{positions, sports, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
    pub profile_picture: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub height: Option<BigDecimal>,
    pub weight: Option<BigDecimal>,
    pub high_school: Option<String>,
    pub college: Option<String>,
    pub division: Option<String>,
    pub school_year: Option<String>,
    pub years_left_to_play: Option<i32>,
    pub sport_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub fcm_token: Option<String>,
    pub is_online: bool,
    pub notify_on_like: bool,
    pub notify_on_comment: bool,
    pub notify_on_chat: bool,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Narrow projection used wherever a user is embedded in another resource.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserSummaryRow {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub role: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct ProfileChangeset {
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
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct AthleteChangeset {
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
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SportRow {
    pub id: Uuid,
    pub name: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sports)]
pub struct NewSportRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub gender: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable)]
#[diesel(table_name = positions)]
#[diesel(belongs_to(SportRow, foreign_key = sport_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PositionRow {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub name: String,
}
