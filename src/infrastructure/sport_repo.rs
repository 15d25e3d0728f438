use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::SportRepository;
use crate::domain::sport::{Position, Sport, SportGender};
use crate::models::user::{NewSportRow, PositionRow, SportRow};
use crate::schema::{positions, sports};

use super::support::{is_unique_violation, parse_stored};

pub struct DieselSportRepository {
    pool: DbPool,
}

impl DieselSportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_sport(row: SportRow) -> Result<Sport, DomainError> {
    Ok(Sport {
        id: row.id,
        gender: parse_stored(&row.gender)?,
        name: row.name,
    })
}

fn duplicate_sport(e: diesel::result::Error) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::field("name", "This sport already exists for that gender.")
    } else {
        e.into()
    }
}

fn duplicate_position(e: diesel::result::Error) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::field("name", "This position already exists for the sport.")
    } else {
        e.into()
    }
}

fn to_position(row: PositionRow) -> Position {
    Position {
        id: row.id,
        sport_id: row.sport_id,
        name: row.name,
    }
}

impl SportRepository for DieselSportRepository {
    fn list(&self) -> Result<Vec<Sport>, DomainError> {
        let mut conn = self.pool.get()?;
        sports::table
            .select(SportRow::as_select())
            .order((sports::name.asc(), sports::gender.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(to_sport)
            .collect()
    }

    fn create(&self, name: &str, gender: SportGender) -> Result<Sport, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(sports::table)
            .values(&NewSportRow {
                id: Uuid::new_v4(),
                name,
                gender: gender.as_str(),
            })
            .returning(SportRow::as_returning())
            .get_result(&mut conn)
            .map_err(duplicate_sport)?;
        to_sport(row)
    }

    fn find(&self, id: Uuid) -> Result<Option<Sport>, DomainError> {
        let mut conn = self.pool.get()?;
        sports::table
            .find(id)
            .select(SportRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_sport)
            .transpose()
    }

    fn update(&self, id: Uuid, name: &str, gender: SportGender) -> Result<Option<Sport>, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(sports::table.find(id))
            .set((sports::name.eq(name), sports::gender.eq(gender.as_str())))
            .returning(SportRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(duplicate_sport)?
            .map(to_sport)
            .transpose()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(sports::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn positions(&self, sport_id: Uuid) -> Result<Vec<Position>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = positions::table
            .filter(positions::sport_id.eq(sport_id))
            .select(PositionRow::as_select())
            .order(positions::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(to_position).collect())
    }

    fn create_position(&self, sport_id: Uuid, name: &str) -> Result<Position, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(positions::table)
            .values(&PositionRow {
                id: Uuid::new_v4(),
                sport_id,
                name: name.to_string(),
            })
            .returning(PositionRow::as_returning())
            .get_result(&mut conn)
            .map_err(duplicate_position)?;
        Ok(to_position(row))
    }

    fn find_position(&self, id: Uuid) -> Result<Option<Position>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = positions::table
            .find(id)
            .select(PositionRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(to_position))
    }

    fn update_position(&self, id: Uuid, name: &str) -> Result<Option<Position>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(positions::table.find(id))
            .set(positions::name.eq(name))
            .returning(PositionRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(duplicate_position)?;
        Ok(row.map(to_position))
    }

    fn delete_position(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(positions::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselSportRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::SportRepository;
    use crate::domain::sport::SportGender;
    use crate::infrastructure::testing::setup_db;

    #[tokio::test]
    async fn same_name_allowed_once_per_gender() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSportRepository::new(pool);

        repo.create("Soccer", SportGender::Male).expect("male soccer");
        repo.create("Soccer", SportGender::Female).expect("female soccer");
        assert!(matches!(
            repo.create("Soccer", SportGender::Male),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(repo.list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn positions_belong_to_their_sport_and_cascade() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSportRepository::new(pool);
        let sport = repo.create("Basketball", SportGender::Female).unwrap();

        let guard = repo.create_position(sport.id, "Point Guard").unwrap();
        repo.create_position(sport.id, "Center").unwrap();

        let names: Vec<String> = repo
            .positions(sport.id)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Center".to_string(), "Point Guard".to_string()]);

        assert!(repo.delete(sport.id).unwrap());
        assert!(repo.find_position(guard.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn renaming_respects_the_name_gender_pair() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSportRepository::new(pool);
        let track = repo.create("Track", SportGender::Male).unwrap();
        repo.create("Rowing", SportGender::Male).unwrap();

        let renamed = repo
            .update(track.id, "Track and Field", SportGender::Female)
            .unwrap()
            .expect("sport exists");
        assert_eq!(renamed.name, "Track and Field");
        assert_eq!(renamed.gender, SportGender::Female);

        assert!(matches!(
            repo.update(track.id, "Rowing", SportGender::Male),
            Err(DomainError::Validation(_))
        ));
        assert!(repo
            .update(Uuid::new_v4(), "Golf", SportGender::Male)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn positions_can_be_renamed_and_removed() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSportRepository::new(pool);
        let sport = repo.create("Soccer", SportGender::Female).unwrap();
        let keeper = repo.create_position(sport.id, "Keeper").unwrap();
        repo.create_position(sport.id, "Striker").unwrap();

        let renamed = repo
            .update_position(keeper.id, "Goalkeeper")
            .unwrap()
            .expect("position exists");
        assert_eq!(renamed.name, "Goalkeeper");
        assert_eq!(renamed.sport_id, sport.id);
        assert!(matches!(
            repo.update_position(keeper.id, "Striker"),
            Err(DomainError::Validation(_))
        ));

        assert!(repo.delete_position(keeper.id).unwrap());
        assert!(!repo.delete_position(keeper.id).unwrap());
        assert_eq!(repo.positions(sport.id).unwrap().len(), 1);
    }
}
