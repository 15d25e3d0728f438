use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;
use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Accepted => "accepted",
            SessionStatus::Rejected => "rejected",
        }
    }

    /// A coach may only answer a pending request, and only with accept or reject.
    pub fn respond(self, answer: SessionStatus) -> Result<SessionStatus, DomainError> {
        if self != SessionStatus::Pending {
            return Err(DomainError::InvalidInput(format!(
                "This session request has already been {}",
                self
            )));
        }
        match answer {
            SessionStatus::Accepted | SessionStatus::Rejected => Ok(answer),
            SessionStatus::Pending => Err(DomainError::field(
                "status",
                "Status must be accepted or rejected.",
            )),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "accepted" => Ok(SessionStatus::Accepted),
            "rejected" => Ok(SessionStatus::Rejected),
            other => Err(DomainError::field(
                "status",
                format!("\"{}\" is not a valid choice.", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    pub id: Uuid,
    pub athlete: UserSummary,
    pub coach: UserSummary,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRequest {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.athlete.id == user_id || self.coach.id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewSessionRequest {
    pub athlete_id: Uuid,
    pub coach_id: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_accepted_or_rejected() {
        assert_eq!(
            SessionStatus::Pending.respond(SessionStatus::Accepted).unwrap(),
            SessionStatus::Accepted
        );
        assert_eq!(
            SessionStatus::Pending.respond(SessionStatus::Rejected).unwrap(),
            SessionStatus::Rejected
        );
    }

    #[test]
    fn answered_requests_are_final() {
        assert!(SessionStatus::Accepted
            .respond(SessionStatus::Rejected)
            .is_err());
        assert!(SessionStatus::Pending
            .respond(SessionStatus::Pending)
            .is_err());
    }
}
