use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Serialize)]
pub struct ChatParticipant {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chat {
    pub id: Uuid,
    pub participants: Vec<ChatParticipant>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.participants.iter().any(|p| p.id == user_id)
    }
}

/// Resolves the requested participants plus the caller to an ordered pair.
pub fn canonical_pair(caller: Uuid, requested: &[Uuid]) -> Result<(Uuid, Uuid), DomainError> {
    let mut ids: Vec<Uuid> = requested.to_vec();
    ids.push(caller);
    ids.sort();
    ids.dedup();
    match ids.as_slice() {
        [a, b] => Ok((*a, *b)),
        [_] => Err(DomainError::field(
            "participants",
            "A chat needs another participant.",
        )),
        _ => Err(DomainError::field(
            "participants",
            "A chat must have exactly two participants.",
        )),
    }
}
