use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::FollowRepository;
use crate::domain::social::FollowEntry;
use crate::models::social::{FollowRow, NewFollowRow};
use crate::schema::follows;

use super::support::{load_summaries, summary_from};

pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Followers,
    Following,
}

impl DieselFollowRepository {
    fn page(&self, user_id: Uuid, side: Side, page: PageRequest) -> Result<Page<FollowEntry>, DomainError> {
        let mut conn = self.pool.get()?;
        let base = match side {
            Side::Followers => follows::table
                .filter(follows::followed_id.eq(user_id))
                .into_boxed(),
            Side::Following => follows::table
                .filter(follows::follower_id.eq(user_id))
                .into_boxed(),
        };
        let total: i64 = base.count().get_result(&mut conn)?;

        let query = match side {
            Side::Followers => follows::table
                .filter(follows::followed_id.eq(user_id))
                .into_boxed(),
            Side::Following => follows::table
                .filter(follows::follower_id.eq(user_id))
                .into_boxed(),
        };
        let rows: Vec<FollowRow> = query
            .select(FollowRow::as_select())
            .order((follows::created_at.desc(), follows::id.asc()))
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;

        let other = |row: &FollowRow| match side {
            Side::Followers => row.follower_id,
            Side::Following => row.followed_id,
        };
        let ids: Vec<Uuid> = rows.iter().map(other).collect();
        let summaries = load_summaries(&mut conn, &ids)?;
        let results = rows
            .iter()
            .map(|row| {
                Ok(FollowEntry {
                    user: summary_from(&summaries, other(row))?,
                    since: row.created_at,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Page::new(results, total, page))
    }
}

impl FollowRepository for DieselFollowRepository {
    fn follow(&self, follower: Uuid, followed: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let inserted = diesel::insert_into(follows::table)
            .values(&NewFollowRow {
                id: Uuid::new_v4(),
                follower_id: follower,
                followed_id: followed,
            })
            .on_conflict((follows::follower_id, follows::followed_id))
            .do_nothing()
            .execute(&mut conn)?;
        Ok(inserted > 0)
    }

    fn unfollow(&self, follower: Uuid, followed: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower))
                .filter(follows::followed_id.eq(followed)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn is_following(&self, follower: Uuid, followed: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let exists = diesel::select(diesel::dsl::exists(
            follows::table
                .filter(follows::follower_id.eq(follower))
                .filter(follows::followed_id.eq(followed)),
        ))
        .get_result(&mut conn)?;
        Ok(exists)
    }

    fn followers(&self, user_id: Uuid, page: PageRequest) -> Result<Page<FollowEntry>, DomainError> {
        self.page(user_id, Side::Followers, page)
    }

    fn following(&self, user_id: Uuid, page: PageRequest) -> Result<Page<FollowEntry>, DomainError> {
        self.page(user_id, Side::Following, page)
    }
}

#[cfg(test)]
mod tests {
    use super::DieselFollowRepository;
    use crate::domain::page::PageRequest;
    use crate::domain::ports::FollowRepository;
    use crate::domain::role::Role;
    use crate::infrastructure::testing::{seed_user, setup_db};

    #[tokio::test]
    async fn follow_is_idempotent_and_listed_on_both_sides() {
        let (_container, pool) = setup_db().await;
        let repo = DieselFollowRepository::new(pool.clone());
        let fan = seed_user(&pool, Role::Athlete, "Fan");
        let star = seed_user(&pool, Role::Athlete, "Star");

        assert!(repo.follow(fan, star).unwrap());
        assert!(!repo.follow(fan, star).unwrap());
        assert!(repo.is_following(fan, star).unwrap());
        assert!(!repo.is_following(star, fan).unwrap());

        let followers = repo.followers(star, PageRequest::default()).unwrap();
        assert_eq!(followers.count, 1);
        assert_eq!(followers.results[0].user.id, fan);
        let following = repo.following(fan, PageRequest::default()).unwrap();
        assert_eq!(following.results[0].user.id, star);

        assert!(repo.unfollow(fan, star).unwrap());
        assert!(!repo.unfollow(fan, star).unwrap());
    }
}
