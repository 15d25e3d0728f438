use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, Notification, PushMessage};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{NotificationRepository, PushNotifier};

#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    push: Arc<dyn PushNotifier>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>, push: Arc<dyn PushNotifier>) -> Self {
        Self { repo, push }
    }

    /// Stores the notification and, when a device token is given, pushes it.
    /// Push failures are logged and never fail the caller.
    pub fn notify(
        &self,
        notification: NewNotification,
        device_token: Option<&str>,
    ) -> Result<Notification, DomainError> {
        let stored = self.repo.create(notification.clone())?;
        if let Some(token) = device_token.filter(|t| !t.is_empty()) {
            let message = PushMessage::for_notification(token, &notification);
            if let Err(e) = self.push.push(&message) {
                log::warn!(
                    "Push for notification {} to user {} failed: {}",
                    stored.id,
                    stored.recipient_id,
                    e
                );
            }
        }
        Ok(stored)
    }

    pub fn list(&self, recipient_id: Uuid, page: PageRequest) -> Result<Page<Notification>, DomainError> {
        self.repo.list(recipient_id, page)
    }

    pub fn mark_all_read(&self, recipient_id: Uuid) -> Result<usize, DomainError> {
        self.repo.mark_all_read(recipient_id)
    }
}
