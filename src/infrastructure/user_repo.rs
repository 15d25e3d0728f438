use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::UserRepository;
use crate::domain::user::{
    full_name, Account, AthleteProfileUpdate, NamedRef, NewUser, ProfileUpdate, UserProfile,
    UserSearch, UserSummary,
};
use crate::models::user::{
    AthleteChangeset, NewUserRow, ProfileChangeset, UserRow, UserSummaryRow,
};
use crate::schema::{positions, sports, users};

use super::support::{contains_pattern, is_unique_violation, parse_stored, to_summary};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_account(row: UserRow) -> Result<Account, DomainError> {
    Ok(Account {
        id: row.id,
        role: parse_stored(&row.role)?,
        email: row.email,
        first_name: row.first_name,
        password_hash: row.password_hash,
        password_changed_at: row.password_changed_at,
        fcm_token: row.fcm_token,
        notify_on_like: row.notify_on_like,
        notify_on_comment: row.notify_on_comment,
    })
}

/// Builds profiles, resolving sport and position names in two lookups.
fn to_profiles(conn: &mut PgConnection, rows: Vec<UserRow>) -> Result<Vec<UserProfile>, DomainError> {
    let sport_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.sport_id).collect();
    let position_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.position_id).collect();

    let sport_names: Vec<(Uuid, String)> = sports::table
        .filter(sports::id.eq_any(&sport_ids))
        .select((sports::id, sports::name))
        .load(conn)?;
    let position_names: Vec<(Uuid, String)> = positions::table
        .filter(positions::id.eq_any(&position_ids))
        .select((positions::id, positions::name))
        .load(conn)?;

    let lookup = |names: &[(Uuid, String)], id: Option<Uuid>| -> Option<NamedRef> {
        let id = id?;
        names
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(id, name)| NamedRef {
                id: *id,
                name: name.clone(),
            })
    };

    rows.into_iter()
        .map(|row| {
            Ok(UserProfile {
                full_name: full_name(
                    row.first_name.as_deref(),
                    row.middle_name.as_deref(),
                    row.last_name.as_deref(),
                ),
                role: parse_stored(&row.role)?,
                sport: lookup(&sport_names, row.sport_id),
                position: lookup(&position_names, row.position_id),
                id: row.id,
                email: row.email,
                username: row.username,
                mobile_number: row.mobile_number,
                profile_picture: row.profile_picture,
                first_name: row.first_name,
                middle_name: row.middle_name,
                last_name: row.last_name,
                dob: row.dob,
                gender: row.gender,
                height: row.height,
                weight: row.weight,
                high_school: row.high_school,
                college: row.college,
                division: row.division,
                school_year: row.school_year,
                years_left_to_play: row.years_left_to_play,
                fcm_token: row.fcm_token,
                is_online: row.is_online,
                notify_on_like: row.notify_on_like,
                notify_on_comment: row.notify_on_comment,
                notify_on_chat: row.notify_on_chat,
            })
        })
        .collect()
}

fn load_profile(conn: &mut PgConnection, id: Uuid) -> Result<Option<UserProfile>, DomainError> {
    let row = users::table
        .find(id)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;
    match row {
        Some(row) => Ok(to_profiles(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn search_query(search: &UserSearch) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table
        .filter(users::role.eq(search.role.as_str()))
        .into_boxed();

    if let Some(name) = search.name.as_deref().filter(|n| !n.trim().is_empty()) {
        let pattern = contains_pattern(name);
        query = query.filter(
            users::first_name
                .ilike(pattern.clone())
                .or(users::middle_name.ilike(pattern.clone()))
                .or(users::last_name.ilike(pattern)),
        );
    }
    if let Some(weight) = &search.weight {
        query = query.filter(users::weight.eq(weight.clone()));
    }
    if let Some(height) = &search.height {
        query = query.filter(users::height.eq(height.clone()));
    }
    if let Some(sport_id) = search.sport_id {
        query = query.filter(users::sport_id.eq(sport_id));
    }
    if let Some(position_id) = search.position_id {
        query = query.filter(users::position_id.eq(position_id));
    }
    if let Some(division) = search.division.as_deref().filter(|d| !d.trim().is_empty()) {
        query = query.filter(users::division.ilike(contains_pattern(division)));
    }
    if let Some(years) = search.eligibility {
        query = query.filter(users::years_left_to_play.ge(years));
    }
    query
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser) -> Result<Account, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                email: user.email,
                username: user.username,
                password_hash: user.password_hash,
                role: user.role.as_str().to_string(),
                first_name: user.first_name,
                middle_name: user.middle_name,
                last_name: user.last_name,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::field("email", "A user with this email already exists.")
                } else {
                    e.into()
                }
            })?;
        to_account(row)
    }

    fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let exists = diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(&mut conn)?;
        Ok(exists)
    }

    fn username_taken(&self, username: &str, except: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let exists = diesel::select(diesel::dsl::exists(
            users::table
                .filter(users::username.eq(username))
                .filter(users::id.ne(except)),
        ))
        .get_result(&mut conn)?;
        Ok(exists)
    }

    fn mobile_taken(&self, mobile_number: &str, except: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let exists = diesel::select(diesel::dsl::exists(
            users::table
                .filter(users::mobile_number.eq(mobile_number))
                .filter(users::id.ne(except)),
        ))
        .get_result(&mut conn)?;
        Ok(exists)
    }

    fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_account)
            .transpose()
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_account)
            .transpose()
    }

    fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let mut conn = self.pool.get()?;
        load_profile(&mut conn, id)
    }

    fn find_summary(&self, id: Uuid) -> Result<Option<UserSummary>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .find(id)
            .select(UserSummaryRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_summary)
            .transpose()
    }

    fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<UserProfile, DomainError> {
        let mut conn = self.pool.get()?;
        let changes = ProfileChangeset {
            username: update.username,
            mobile_number: update.mobile_number,
            profile_picture: update.profile_picture,
            first_name: update.first_name,
            middle_name: update.middle_name,
            last_name: update.last_name,
            fcm_token: update.fcm_token,
            is_online: update.is_online,
            notify_on_like: update.notify_on_like,
            notify_on_comment: update.notify_on_comment,
            notify_on_chat: update.notify_on_chat,
            updated_at: Utc::now(),
        };
        let updated = diesel::update(users::table.find(id))
            .set(&changes)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("User"));
        }
        load_profile(&mut conn, id)?.ok_or(DomainError::NotFound("User"))
    }

    fn update_athlete_profile(
        &self,
        id: Uuid,
        update: AthleteProfileUpdate,
    ) -> Result<UserProfile, DomainError> {
        let mut conn = self.pool.get()?;
        let changes = AthleteChangeset {
            dob: update.dob,
            gender: update.gender,
            height: update.height,
            weight: update.weight,
            high_school: update.high_school,
            college: update.college,
            division: update.division,
            school_year: update.school_year,
            years_left_to_play: update.years_left_to_play,
            sport_id: update.sport_id,
            position_id: update.position_id,
            profile_picture: update.profile_picture,
            updated_at: Utc::now(),
        };
        let updated = diesel::update(users::table.find(id))
            .set(&changes)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("User"));
        }
        load_profile(&mut conn, id)?.ok_or(DomainError::NotFound("User"))
    }

    fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();
        let updated = diesel::update(users::table.find(id))
            .set((
                users::password_hash.eq(password_hash),
                users::password_changed_at.eq(now),
                users::updated_at.eq(now),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("User"));
        }
        Ok(())
    }

    fn search(&self, search: &UserSearch, page: PageRequest) -> Result<Page<UserProfile>, DomainError> {
        let mut conn = self.pool.get()?;
        let count: i64 = search_query(search).count().get_result(&mut conn)?;
        let rows = search_query(search)
            .select(UserRow::as_select())
            .order(users::id.asc())
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;
        let profiles = to_profiles(&mut conn, rows)?;
        Ok(Page::new(profiles, count, page))
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    use super::DieselUserRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::page::PageRequest;
    use crate::domain::ports::UserRepository;
    use crate::domain::role::Role;
    use crate::domain::user::{NewUser, ProfileUpdate, UserSearch};
    use crate::infrastructure::testing::{seed_user, setup_db};
    use crate::schema::users;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: format!("{}-name", email.replace('@', "-")),
            password_hash: "hash".to_string(),
            role,
            first_name: Some("Jordan".to_string()),
            middle_name: None,
            last_name: Some("Reyes".to_string()),
        }
    }

    fn search(role: Role) -> UserSearch {
        UserSearch {
            role,
            name: None,
            weight: None,
            height: None,
            sport_id: None,
            position_id: None,
            division: None,
            eligibility: None,
        }
    }

    #[tokio::test]
    async fn create_then_lookup_by_email() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);

        let account = repo
            .create(new_user("jordan@example.com", Role::Athlete))
            .expect("create failed");
        assert_eq!(account.role, Role::Athlete);

        let found = repo
            .find_account_by_email("jordan@example.com")
            .expect("lookup failed")
            .expect("account should exist");
        assert_eq!(found.id, account.id);
        assert!(repo.email_exists("jordan@example.com").unwrap());
        assert!(!repo.email_exists("nobody@example.com").unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);
        repo.create(new_user("dup@example.com", Role::Coach))
            .expect("first create failed");

        let mut second = new_user("dup@example.com", Role::Coach);
        second.username = "another-name".to_string();
        match repo.create(second) {
            Err(DomainError::Validation(errors)) => assert!(errors.contains("email")),
            other => panic!("expected validation error, got {:?}", other.map(|a| a.id)),
        }
    }

    #[tokio::test]
    async fn set_password_moves_password_changed_at_forward() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);
        let account = repo
            .create(new_user("pw@example.com", Role::Athlete))
            .expect("create failed");

        repo.set_password(account.id, "new-hash").expect("set failed");

        let reloaded = repo.find_account(account.id).unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");
        assert!(reloaded.password_changed_at >= account.password_changed_at);
    }

    #[tokio::test]
    async fn partial_profile_update_keeps_other_fields() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool.clone());
        let id = seed_user(&pool, Role::Athlete, "Casey");

        let profile = repo
            .update_profile(
                id,
                ProfileUpdate {
                    mobile_number: Some("5550001111".into()),
                    notify_on_like: Some(false),
                    ..Default::default()
                },
            )
            .expect("update failed");

        assert_eq!(profile.first_name.as_deref(), Some("Casey"));
        assert_eq!(profile.mobile_number.as_deref(), Some("5550001111"));
        assert!(!profile.notify_on_like);
        assert!(profile.notify_on_comment);
    }

    #[tokio::test]
    async fn search_filters_by_role_name_and_eligibility() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool.clone());
        let riley = seed_user(&pool, Role::Athlete, "Riley");
        seed_user(&pool, Role::Athlete, "Morgan");
        seed_user(&pool, Role::Coach, "Riley");

        {
            let mut conn = pool.get().unwrap();
            diesel::update(users::table.find(riley))
                .set(users::years_left_to_play.eq(3))
                .execute(&mut conn)
                .unwrap();
        }

        let mut by_name = search(Role::Athlete);
        by_name.name = Some("ril".into());
        let page = repo.search(&by_name, PageRequest::default()).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, riley);

        let mut eligible = search(Role::Athlete);
        eligible.eligibility = Some(2);
        let page = repo.search(&eligible, PageRequest::default()).unwrap();
        assert_eq!(page.count, 1);

        let coaches = repo
            .search(&search(Role::Coach), PageRequest::default())
            .unwrap();
        assert_eq!(coaches.count, 1);
        assert_eq!(coaches.results[0].role, Role::Coach);
    }
}
