use std::sync::Arc;

use crate::domain::contact::{ContactMessage, NewContactMessage};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContactRepository;

#[derive(Clone)]
pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>) -> Self {
        Self { repo }
    }

    pub fn submit(&self, form: NewContactMessage) -> Result<ContactMessage, DomainError> {
        let message = self.repo.save(form.validated()?)?;
        log::info!("Contact message {} received from {}", message.id, message.email);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    struct Inbox(Mutex<Vec<NewContactMessage>>);

    impl ContactRepository for Inbox {
        fn save(&self, message: NewContactMessage) -> Result<ContactMessage, DomainError> {
            self.0.lock().unwrap().push(message.clone());
            Ok(ContactMessage {
                id: Uuid::new_v4(),
                name: message.name,
                email: message.email,
                message: message.message,
                created_at: Utc::now(),
            })
        }
    }

    #[test]
    fn invalid_forms_are_not_stored() {
        let inbox = Arc::new(Inbox::default());
        let service = ContactService::new(inbox.clone());

        let err = service
            .submit(NewContactMessage {
                name: "Jordan".into(),
                email: "jordan".into(),
                message: "hello".into(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref f) if f.contains("email")));
        assert!(inbox.0.lock().unwrap().is_empty());

        let saved = service
            .submit(NewContactMessage {
                name: " Jordan ".into(),
                email: "jordan@example.com".into(),
                message: "hello".into(),
            })
            .unwrap();
        assert_eq!(saved.name, "Jordan");
        assert_eq!(inbox.0.lock().unwrap().len(), 1);
    }
}
