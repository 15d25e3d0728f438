use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::contact::{ContactMessage, NewContactMessage};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContactRepository;
use crate::models::contact::{ContactMessageRow, NewContactMessageRow};
use crate::schema::contact_messages;

pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ContactRepository for DieselContactRepository {
    fn save(&self, message: NewContactMessage) -> Result<ContactMessage, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(contact_messages::table)
            .values(&NewContactMessageRow {
                id: Uuid::new_v4(),
                name: &message.name,
                email: &message.email,
                message: &message.message,
            })
            .returning(ContactMessageRow::as_returning())
            .get_result(&mut conn)?;
        Ok(ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        })
    }
}
