use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::coaching::{NewSessionRequest, SessionRequest, SessionStatus};
use crate::domain::errors::DomainError;
use crate::domain::ports::SessionRepository;
use crate::models::engagement::{NewSessionRequestRow, SessionRequestRow};
use crate::schema::session_requests;

use super::support::{load_summaries, parse_stored, summary_from};

pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_requests(
    conn: &mut PgConnection,
    rows: Vec<SessionRequestRow>,
) -> Result<Vec<SessionRequest>, DomainError> {
    let ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|r| [r.athlete_id, r.coach_id])
        .collect();
    let people = load_summaries(conn, &ids)?;
    rows.into_iter()
        .map(|row| {
            Ok(SessionRequest {
                athlete: summary_from(&people, row.athlete_id)?,
                coach: summary_from(&people, row.coach_id)?,
                status: parse_stored(&row.status)?,
                id: row.id,
                session_date: row.session_date,
                session_time: row.session_time,
                notes: row.notes,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
        })
        .collect()
}

fn single(conn: &mut PgConnection, row: SessionRequestRow) -> Result<SessionRequest, DomainError> {
    to_requests(conn, vec![row])?
        .pop()
        .ok_or(DomainError::NotFound("Session request"))
}

impl SessionRepository for DieselSessionRepository {
    fn create(&self, request: NewSessionRequest) -> Result<SessionRequest, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(session_requests::table)
            .values(&NewSessionRequestRow {
                id: Uuid::new_v4(),
                athlete_id: request.athlete_id,
                coach_id: request.coach_id,
                session_date: request.session_date,
                session_time: request.session_time,
                notes: request.notes,
                status: SessionStatus::Pending.as_str().to_string(),
            })
            .returning(SessionRequestRow::as_returning())
            .get_result(&mut conn)?;
        single(&mut conn, row)
    }

    fn list_for_coach(&self, coach_id: Uuid) -> Result<Vec<SessionRequest>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = session_requests::table
            .filter(session_requests::coach_id.eq(coach_id))
            .select(SessionRequestRow::as_select())
            .order(session_requests::created_at.desc())
            .load(&mut conn)?;
        to_requests(&mut conn, rows)
    }

    fn list_for_athlete(&self, athlete_id: Uuid) -> Result<Vec<SessionRequest>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = session_requests::table
            .filter(session_requests::athlete_id.eq(athlete_id))
            .select(SessionRequestRow::as_select())
            .order(session_requests::created_at.desc())
            .load(&mut conn)?;
        to_requests(&mut conn, rows)
    }

    fn find(&self, id: Uuid) -> Result<Option<SessionRequest>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = session_requests::table
            .find(id)
            .select(SessionRequestRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(|row| single(&mut conn, row)).transpose()
    }

    fn set_status(&self, id: Uuid, status: SessionStatus) -> Result<SessionRequest, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(session_requests::table.find(id))
            .set((
                session_requests::status.eq(status.as_str()),
                session_requests::updated_at.eq(Utc::now()),
            ))
            .returning(SessionRequestRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Session request"))?;
        single(&mut conn, row)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(session_requests::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::DieselSessionRepository;
    use crate::domain::coaching::{NewSessionRequest, SessionStatus};
    use crate::domain::ports::SessionRepository;
    use crate::domain::role::Role;
    use crate::infrastructure::testing::{seed_user, setup_db};

    #[tokio::test]
    async fn requests_are_listed_for_both_parties() {
        let (_container, pool) = setup_db().await;
        let repo = DieselSessionRepository::new(pool.clone());
        let athlete = seed_user(&pool, Role::Athlete, "Jordan");
        let coach = seed_user(&pool, Role::Coach, "Casey");

        let created = repo
            .create(NewSessionRequest {
                athlete_id: athlete,
                coach_id: coach,
                session_date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
                session_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
                notes: Some("Footwork".into()),
            })
            .unwrap();
        assert_eq!(created.status, SessionStatus::Pending);
        assert_eq!(created.coach.full_name, "Casey Tester");

        assert_eq!(repo.list_for_coach(coach).unwrap().len(), 1);
        assert_eq!(repo.list_for_athlete(athlete).unwrap().len(), 1);
        assert!(repo.list_for_coach(athlete).unwrap().is_empty());

        let accepted = repo.set_status(created.id, SessionStatus::Accepted).unwrap();
        assert_eq!(accepted.status, SessionStatus::Accepted);
        assert!(accepted.updated_at >= created.updated_at);

        assert!(repo.delete(created.id).unwrap());
        assert!(repo.find(created.id).unwrap().is_none());
    }
}
