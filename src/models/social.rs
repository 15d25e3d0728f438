use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{chats, follows, post_comments, post_likes, posts};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: Option<String>,
    pub media_urls: Vec<String>,
    pub post_type: String,
    pub location: Option<String>,
    pub music: Option<String>,
    pub privacy: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: Option<String>,
    pub media_urls: Vec<String>,
    pub post_type: String,
    pub location: Option<String>,
    pub music: Option<String>,
    pub privacy: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = posts)]
pub struct PostChangeset {
    pub caption: Option<String>,
    pub media_urls: Option<Vec<String>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = post_likes)]
pub struct NewPostLikeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = post_comments)]
#[diesel(belongs_to(PostRow, foreign_key = post_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = post_comments)]
pub struct NewCommentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub content: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FollowRow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollowRow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followed_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatRow {
    pub id: Uuid,
    pub participant_1: Uuid,
    pub participant_2: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chats)]
pub struct NewChatRow {
    pub id: Uuid,
    pub participant_1: Uuid,
    pub participant_2: Uuid,
}
