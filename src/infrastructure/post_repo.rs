use std::collections::{HashMap, HashSet};

use diesel::dsl::count;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::PostRepository;
use crate::domain::social::{
    Comment, LikeToggle, NewPost, Post, PostDetail, PostFilter, PostOwner, PostPatch, Privacy,
};
use crate::models::social::{
    CommentRow, NewCommentRow, NewPostLikeRow, NewPostRow, PostChangeset, PostRow,
};
use crate::schema::{post_comments, post_likes, posts, users};

use super::support::{load_summaries, parse_stored, summary_from};

pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn counts_by_post<T>(rows: Vec<(Uuid, T)>) -> HashMap<Uuid, T> {
    rows.into_iter().collect()
}

/// Adds author, like/comment counts and the viewer's like flag.
fn decorate(conn: &mut PgConnection, viewer: Uuid, rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
    let post_ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
    let author_ids: Vec<Uuid> = rows.iter().map(|p| p.user_id).collect();
    let authors = load_summaries(conn, &author_ids)?;

    let likes = counts_by_post(
        post_likes::table
            .filter(post_likes::post_id.eq_any(&post_ids))
            .group_by(post_likes::post_id)
            .select((post_likes::post_id, count(post_likes::id)))
            .load::<(Uuid, i64)>(conn)?,
    );
    let comments = counts_by_post(
        post_comments::table
            .filter(post_comments::post_id.eq_any(&post_ids))
            .group_by(post_comments::post_id)
            .select((post_comments::post_id, count(post_comments::id)))
            .load::<(Uuid, i64)>(conn)?,
    );
    let liked: HashSet<Uuid> = post_likes::table
        .filter(post_likes::post_id.eq_any(&post_ids))
        .filter(post_likes::user_id.eq(viewer))
        .select(post_likes::post_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|row| {
            Ok(Post {
                author: summary_from(&authors, row.user_id)?,
                post_type: parse_stored(&row.post_type)?,
                privacy: parse_stored(&row.privacy)?,
                likes_count: likes.get(&row.id).copied().unwrap_or(0),
                comments_count: comments.get(&row.id).copied().unwrap_or(0),
                is_liked: liked.contains(&row.id),
                id: row.id,
                caption: row.caption,
                media_urls: row.media_urls,
                location: row.location,
                music: row.music,
                created_at: row.created_at,
            })
        })
        .collect()
}

fn to_comments(conn: &mut PgConnection, rows: Vec<CommentRow>) -> Result<Vec<Comment>, DomainError> {
    let author_ids: Vec<Uuid> = rows.iter().map(|c| c.user_id).collect();
    let authors = load_summaries(conn, &author_ids)?;
    rows.into_iter()
        .map(|row| {
            Ok(Comment {
                author: summary_from(&authors, row.user_id)?,
                id: row.id,
                post_id: row.post_id,
                content: row.content,
                created_at: row.created_at,
            })
        })
        .collect()
}

fn feed_query(viewer: Uuid, filter: &PostFilter) -> posts::BoxedQuery<'static, Pg> {
    let mut query = posts::table
        .filter(
            posts::privacy
                .eq(Privacy::Public.as_str())
                .or(posts::user_id.eq(viewer)),
        )
        .into_boxed();
    query = match filter.user {
        Some(author) => query.filter(posts::user_id.eq(author)),
        None => query.filter(posts::user_id.ne(viewer)),
    };
    if let Some(post_type) = filter.post_type {
        query = query.filter(posts::post_type.eq(post_type.as_str()));
    }
    query
}

impl PostRepository for DieselPostRepository {
    fn feed(&self, viewer: Uuid, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, DomainError> {
        let mut conn = self.pool.get()?;
        let total: i64 = feed_query(viewer, filter).count().get_result(&mut conn)?;
        let rows = feed_query(viewer, filter)
            .select(PostRow::as_select())
            .order((posts::created_at.desc(), posts::id.asc()))
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;
        let results = decorate(&mut conn, viewer, rows)?;
        Ok(Page::new(results, total, page))
    }

    fn create(&self, author: Uuid, post: NewPost) -> Result<Post, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(posts::table)
            .values(&NewPostRow {
                id: Uuid::new_v4(),
                user_id: author,
                caption: post.caption,
                media_urls: post.media_urls,
                post_type: post.post_type.as_str().to_string(),
                location: post.location,
                music: post.music,
                privacy: post.privacy.as_str().to_string(),
            })
            .returning(PostRow::as_returning())
            .get_result(&mut conn)?;
        decorate(&mut conn, author, vec![row])?
            .pop()
            .ok_or_else(|| DomainError::Internal("Created post vanished".to_string()))
    }

    fn find(&self, viewer: Uuid, id: Uuid) -> Result<Option<PostDetail>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = posts::table
            .find(id)
            .filter(
                posts::privacy
                    .eq(Privacy::Public.as_str())
                    .or(posts::user_id.eq(viewer)),
            )
            .select(PostRow::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let comment_rows = post_comments::table
            .filter(post_comments::post_id.eq(id))
            .select(CommentRow::as_select())
            .order(post_comments::created_at.asc())
            .load(&mut conn)?;
        let comments = to_comments(&mut conn, comment_rows)?;
        let post = decorate(&mut conn, viewer, vec![row])?.pop();
        Ok(post.map(|post| PostDetail { post, comments }))
    }

    fn owner(&self, id: Uuid) -> Result<Option<PostOwner>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = posts::table
            .inner_join(users::table)
            .filter(posts::id.eq(id))
            .select((
                posts::id,
                posts::user_id,
                users::fcm_token,
                users::notify_on_like,
                users::notify_on_comment,
            ))
            .first::<(Uuid, Uuid, Option<String>, bool, bool)>(&mut conn)
            .optional()?;
        Ok(row.map(
            |(post_id, author_id, fcm_token, notify_on_like, notify_on_comment)| PostOwner {
                post_id,
                author_id,
                fcm_token,
                notify_on_like,
                notify_on_comment,
            },
        ))
    }

    fn update(&self, id: Uuid, patch: &PostPatch) -> Result<Option<Post>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = if patch.is_empty() {
            posts::table
                .find(id)
                .select(PostRow::as_select())
                .first(&mut conn)
                .optional()?
        } else {
            diesel::update(posts::table.find(id))
                .set(&PostChangeset {
                    caption: patch.caption.clone(),
                    media_urls: patch.media_urls.clone(),
                })
                .returning(PostRow::as_returning())
                .get_result(&mut conn)
                .optional()?
        };
        let Some(row) = row else {
            return Ok(None);
        };
        let author = row.user_id;
        Ok(decorate(&mut conn, author, vec![row])?.pop())
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(posts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn comments(&self, post_id: Uuid, page: PageRequest) -> Result<Page<Comment>, DomainError> {
        let mut conn = self.pool.get()?;
        let total: i64 = post_comments::table
            .filter(post_comments::post_id.eq(post_id))
            .count()
            .get_result(&mut conn)?;
        let rows = post_comments::table
            .filter(post_comments::post_id.eq(post_id))
            .select(CommentRow::as_select())
            .order((post_comments::created_at.desc(), post_comments::id.asc()))
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;
        let results = to_comments(&mut conn, rows)?;
        Ok(Page::new(results, total, page))
    }

    fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeToggle, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let removed = diesel::delete(
                post_likes::table
                    .filter(post_likes::user_id.eq(user_id))
                    .filter(post_likes::post_id.eq(post_id)),
            )
            .execute(conn)?;
            if removed > 0 {
                return Ok(LikeToggle::Unliked);
            }
            diesel::insert_into(post_likes::table)
                .values(&NewPostLikeRow {
                    id: Uuid::new_v4(),
                    user_id,
                    post_id,
                })
                .on_conflict_do_nothing()
                .execute(conn)?;
            Ok(LikeToggle::Liked)
        })
    }

    fn add_comment(&self, user_id: Uuid, post_id: Uuid, content: &str) -> Result<Comment, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(post_comments::table)
            .values(&NewCommentRow {
                id: Uuid::new_v4(),
                user_id,
                post_id,
                content,
            })
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)?;
        to_comments(&mut conn, vec![row])?
            .pop()
            .ok_or_else(|| DomainError::Internal("Created comment vanished".to_string()))
    }

    fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = post_comments::table
            .find(id)
            .select(CommentRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(to_comments(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(post_comments::table.find(id))
            .set(post_comments::content.eq(content))
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(to_comments(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(post_comments::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
