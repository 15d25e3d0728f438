use crate::domain::errors::DomainError;
use crate::domain::notification::OutgoingEmail;
use crate::domain::ports::Mailer;

/// Writes outgoing mail to the log instead of relaying it.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: &str) -> Self {
        Self {
            from: from.to_string(),
        }
    }
}

impl Mailer for LogMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
        if email.to.trim().is_empty() {
            return Err(DomainError::InvalidInput("Email recipient is missing".to_string()));
        }
        log::info!(
            "Mail from={} to={} subject={:?}\n{}",
            self.from,
            email.to,
            email.subject,
            email.body
        );
        Ok(())
    }
}
