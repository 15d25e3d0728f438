use std::collections::HashMap;

use diesel::dsl::count;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::podcast::{
    NewPodcast, Podcast, PodcastComment, PodcastFilter, PodcastPatch, PodcastSortField,
    ReactionChange,
};
use crate::domain::ports::PodcastRepository;
use crate::models::engagement::{
    NewPodcastCommentRow, NewPodcastRow, PodcastChangeset, PodcastCommentRow, PodcastReactionRow,
    PodcastRow,
};
use crate::schema::{podcast_comments, podcast_reactions, podcasts};

use super::support::{contains_pattern, load_summaries, summary_from};

pub struct DieselPodcastRepository {
    pool: DbPool,
}

impl DieselPodcastRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Attaches like and dislike counts.
fn with_reactions(conn: &mut PgConnection, rows: Vec<PodcastRow>) -> Result<Vec<Podcast>, DomainError> {
    let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
    let tallies: HashMap<(Uuid, bool), i64> = podcast_reactions::table
        .filter(podcast_reactions::podcast_id.eq_any(&ids))
        .group_by((podcast_reactions::podcast_id, podcast_reactions::is_liked))
        .select((
            podcast_reactions::podcast_id,
            podcast_reactions::is_liked,
            count(podcast_reactions::id),
        ))
        .load::<(Uuid, bool, i64)>(conn)?
        .into_iter()
        .map(|(id, liked, n)| ((id, liked), n))
        .collect();
    Ok(rows
        .into_iter()
        .map(|row| Podcast {
            likes: tallies.get(&(row.id, true)).copied().unwrap_or(0),
            dislikes: tallies.get(&(row.id, false)).copied().unwrap_or(0),
            id: row.id,
            title: row.title,
            description: row.description,
            media_url: row.media_url,
            cover_image: row.cover_image,
            uploaded_by: row.uploaded_by,
            views: row.views,
            created_at: row.created_at,
        })
        .collect())
}

fn single(conn: &mut PgConnection, row: PodcastRow) -> Result<Podcast, DomainError> {
    with_reactions(conn, vec![row])?
        .pop()
        .ok_or(DomainError::NotFound("Podcast"))
}

fn filtered(filter: &PodcastFilter) -> podcasts::BoxedQuery<'static, Pg> {
    let mut query = podcasts::table.into_boxed();
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = contains_pattern(term);
        query = query.filter(
            podcasts::title
                .ilike(pattern.clone())
                .or(podcasts::description.ilike(pattern)),
        );
    }
    query
}

fn to_comments(
    conn: &mut PgConnection,
    rows: Vec<PodcastCommentRow>,
) -> Result<Vec<PodcastComment>, DomainError> {
    let ids: Vec<Uuid> = rows.iter().map(|c| c.user_id).collect();
    let authors = load_summaries(conn, &ids)?;
    rows.into_iter()
        .map(|row| {
            Ok(PodcastComment {
                author: summary_from(&authors, row.user_id)?,
                id: row.id,
                podcast_id: row.podcast_id,
                content: row.content,
                created_at: row.created_at,
            })
        })
        .collect()
}

impl PodcastRepository for DieselPodcastRepository {
    fn create(&self, uploaded_by: Uuid, podcast: NewPodcast) -> Result<Podcast, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(podcasts::table)
            .values(&NewPodcastRow {
                id: Uuid::new_v4(),
                title: podcast.title.trim().to_string(),
                description: podcast.description,
                media_url: podcast.media_url.trim().to_string(),
                cover_image: podcast.cover_image,
                uploaded_by,
            })
            .returning(PodcastRow::as_returning())
            .get_result(&mut conn)?;
        single(&mut conn, row)
    }

    fn list(&self, filter: &PodcastFilter, page: PageRequest) -> Result<Page<Podcast>, DomainError> {
        let mut conn = self.pool.get()?;
        let total: i64 = filtered(filter).count().get_result(&mut conn)?;

        let query = filtered(filter);
        let query = match (filter.sort.field, filter.sort.descending) {
            (PodcastSortField::Title, false) => query.order(podcasts::title.asc()),
            (PodcastSortField::Title, true) => query.order(podcasts::title.desc()),
            (PodcastSortField::Views, false) => query.order(podcasts::views.asc()),
            (PodcastSortField::Views, true) => query.order(podcasts::views.desc()),
            (PodcastSortField::CreatedAt, false) => query.order(podcasts::created_at.asc()),
            (PodcastSortField::CreatedAt, true) => query.order(podcasts::created_at.desc()),
        };
        let rows = query
            .then_order_by(podcasts::id.asc())
            .select(PodcastRow::as_select())
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;
        Ok(Page::new(with_reactions(&mut conn, rows)?, total, page))
    }

    fn view(&self, id: Uuid) -> Result<Option<Podcast>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(podcasts::table.find(id))
            .set(podcasts::views.eq(podcasts::views + 1))
            .returning(PodcastRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        row.map(|row| single(&mut conn, row)).transpose()
    }

    fn update(&self, id: Uuid, patch: PodcastPatch) -> Result<Option<Podcast>, DomainError> {
        let mut conn = self.pool.get()?;
        let changes = PodcastChangeset {
            title: patch.title.map(|t| t.trim().to_string()),
            description: patch.description,
            media_url: patch.media_url.map(|u| u.trim().to_string()),
            cover_image: patch.cover_image,
        };
        let nothing_to_change = changes.title.is_none()
            && changes.description.is_none()
            && changes.media_url.is_none()
            && changes.cover_image.is_none();

        let row = if nothing_to_change {
            podcasts::table
                .find(id)
                .select(PodcastRow::as_select())
                .first(&mut conn)
                .optional()?
        } else {
            diesel::update(podcasts::table.find(id))
                .set(&changes)
                .returning(PodcastRow::as_returning())
                .get_result(&mut conn)
                .optional()?
        };
        row.map(|row| single(&mut conn, row)).transpose()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(podcasts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn react(&self, user_id: Uuid, podcast_id: Uuid, is_liked: bool) -> Result<ReactionChange, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let exists: bool = diesel::select(diesel::dsl::exists(podcasts::table.find(podcast_id)))
                .get_result(conn)?;
            if !exists {
                return Err(DomainError::NotFound("Podcast"));
            }

            let existing = podcast_reactions::table
                .filter(podcast_reactions::user_id.eq(user_id))
                .filter(podcast_reactions::podcast_id.eq(podcast_id))
                .select(PodcastReactionRow::as_select())
                .for_update()
                .first(conn)
                .optional()?;

            let change = ReactionChange::decide(existing.as_ref().map(|r| r.is_liked), is_liked);
            match (change, existing) {
                (ReactionChange::Removed, Some(row)) => {
                    diesel::delete(podcast_reactions::table.find(row.id)).execute(conn)?;
                }
                (ReactionChange::Switched, Some(row)) => {
                    diesel::update(podcast_reactions::table.find(row.id))
                        .set(podcast_reactions::is_liked.eq(is_liked))
                        .execute(conn)?;
                }
                _ => {
                    diesel::insert_into(podcast_reactions::table)
                        .values(&PodcastReactionRow {
                            id: Uuid::new_v4(),
                            user_id,
                            podcast_id,
                            is_liked,
                        })
                        .execute(conn)?;
                }
            }
            Ok(change)
        })
    }

    fn comments(&self, podcast_id: Uuid) -> Result<Vec<PodcastComment>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = podcast_comments::table
            .filter(podcast_comments::podcast_id.eq(podcast_id))
            .select(PodcastCommentRow::as_select())
            .order((podcast_comments::created_at.desc(), podcast_comments::id.asc()))
            .load(&mut conn)?;
        to_comments(&mut conn, rows)
    }

    fn add_comment(&self, user_id: Uuid, podcast_id: Uuid, content: &str) -> Result<PodcastComment, DomainError> {
        let mut conn = self.pool.get()?;
        let exists: bool = diesel::select(diesel::dsl::exists(podcasts::table.find(podcast_id)))
            .get_result(&mut conn)?;
        if !exists {
            return Err(DomainError::NotFound("Podcast"));
        }
        let row = diesel::insert_into(podcast_comments::table)
            .values(&NewPodcastCommentRow {
                id: Uuid::new_v4(),
                user_id,
                podcast_id,
                content,
            })
            .returning(PodcastCommentRow::as_returning())
            .get_result(&mut conn)?;
        to_comments(&mut conn, vec![row])?
            .pop()
            .ok_or(DomainError::NotFound("Comment"))
    }

    fn find_comment(&self, id: Uuid) -> Result<Option<PodcastComment>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = podcast_comments::table
            .find(id)
            .select(PodcastCommentRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(to_comments(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(podcast_comments::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
