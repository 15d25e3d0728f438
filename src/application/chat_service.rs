use std::sync::Arc;

use uuid::Uuid;

use crate::domain::chat::{canonical_pair, Chat};
use crate::domain::errors::DomainError;
use crate::domain::ports::{ChatRepository, UserRepository};

#[derive(Clone)]
pub struct ChatService {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
}

impl ChatService {
    pub fn new(chats: Arc<dyn ChatRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { chats, users }
    }

    pub fn list(&self, user_id: Uuid) -> Result<Vec<Chat>, DomainError> {
        self.chats.list_for(user_id)
    }

    /// Returns the existing one-to-one chat or creates it; `true` when created.
    pub fn start(&self, caller: Uuid, participants: &[Uuid]) -> Result<(Chat, bool), DomainError> {
        let pair = canonical_pair(caller, participants)?;
        let other = if pair.0 == caller { pair.1 } else { pair.0 };
        self.users
            .find_summary(other)?
            .ok_or(DomainError::NotFound("User"))?;
        self.chats.find_or_create(pair)
    }

    pub fn get(&self, caller: Uuid, id: Uuid) -> Result<Chat, DomainError> {
        let chat = self.chats.find(id)?.ok_or(DomainError::NotFound("Chat"))?;
        if !chat.includes(caller) {
            return Err(DomainError::Forbidden(
                "You are not a participant of this chat.".to_string(),
            ));
        }
        Ok(chat)
    }
}
