use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{
    notifications, podcast_comments, podcast_reactions, podcasts, reviews, session_requests,
};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = session_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRequestRow {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub coach_id: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = session_requests)]
pub struct NewSessionRequestRow {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub coach_id: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub notes: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub title: String,
    pub notification_type: String,
    pub message: Option<String>,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub title: String,
    pub notification_type: String,
    pub message: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = podcasts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PodcastRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub cover_image: Option<String>,
    pub uploaded_by: Uuid,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = podcasts)]
pub struct NewPodcastRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub cover_image: Option<String>,
    pub uploaded_by: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = podcasts)]
pub struct PodcastChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = podcast_reactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PodcastReactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub podcast_id: Uuid,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = podcast_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PodcastCommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub podcast_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = podcast_comments)]
pub struct NewPodcastCommentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub podcast_id: Uuid,
    pub content: &'a str,
}
