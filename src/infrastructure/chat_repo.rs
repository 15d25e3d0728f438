use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::chat::{Chat, ChatParticipant};
use crate::domain::errors::DomainError;
use crate::domain::ports::ChatRepository;
use crate::models::social::{ChatRow, NewChatRow};
use crate::schema::chats;

use super::support::load_summaries;

pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_chats(conn: &mut PgConnection, rows: Vec<ChatRow>) -> Result<Vec<Chat>, DomainError> {
    let ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|c| [c.participant_1, c.participant_2])
        .collect();
    let people = load_summaries(conn, &ids)?;
    let participant = |id: Uuid| ChatParticipant {
        id,
        full_name: people
            .get(&id)
            .map(|p| p.full_name.clone())
            .unwrap_or_default(),
    };
    Ok(rows
        .into_iter()
        .map(|row| Chat {
            id: row.id,
            participants: vec![participant(row.participant_1), participant(row.participant_2)],
            created_at: row.created_at,
        })
        .collect())
}

impl ChatRepository for DieselChatRepository {
    fn list_for(&self, user_id: Uuid) -> Result<Vec<Chat>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = chats::table
            .filter(
                chats::participant_1
                    .eq(user_id)
                    .or(chats::participant_2.eq(user_id)),
            )
            .select(ChatRow::as_select())
            .order(chats::created_at.desc())
            .load(&mut conn)?;
        to_chats(&mut conn, rows)
    }

    fn find_or_create(&self, pair: (Uuid, Uuid)) -> Result<(Chat, bool), DomainError> {
        let mut conn = self.pool.get()?;
        let (first, second) = pair;
        let inserted = diesel::insert_into(chats::table)
            .values(&NewChatRow {
                id: Uuid::new_v4(),
                participant_1: first,
                participant_2: second,
            })
            .on_conflict((chats::participant_1, chats::participant_2))
            .do_nothing()
            .execute(&mut conn)?;
        let row = chats::table
            .filter(chats::participant_1.eq(first))
            .filter(chats::participant_2.eq(second))
            .select(ChatRow::as_select())
            .first(&mut conn)?;
        let chat = to_chats(&mut conn, vec![row])?
            .pop()
            .ok_or_else(|| DomainError::Internal("Chat vanished".to_string()))?;
        Ok((chat, inserted > 0))
    }

    fn find(&self, id: Uuid) -> Result<Option<Chat>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = chats::table
            .find(id)
            .select(ChatRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(to_chats(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }
}
