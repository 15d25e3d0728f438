use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::notification_service::NotificationService;
use crate::domain::coaching::{NewSessionRequest, SessionRequest, SessionStatus};
use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, NotificationKind};
use crate::domain::ports::{SessionRepository, UserRepository};
use crate::domain::role::{Permission, Role};
use crate::domain::user::Caller;

#[derive(Debug, Clone)]
pub struct SessionBooking {
    pub coach_id: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct CoachingService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl CoachingService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            sessions,
            users,
            notifications,
        }
    }

    fn notify(&self, recipient: Uuid, sender: Uuid, title: &str, message: String, id: Uuid) -> Result<(), DomainError> {
        let token = self
            .users
            .find_account(recipient)?
            .and_then(|a| a.fcm_token);
        self.notifications.notify(
            NewNotification {
                recipient_id: recipient,
                sender_id: Some(sender),
                title: title.to_string(),
                kind: NotificationKind::Session,
                message: Some(message),
                link: Some(format!("/coachingsessions/{}", id)),
            },
            token.as_deref(),
        )?;
        Ok(())
    }

    pub fn request(&self, caller: &Caller, booking: SessionBooking) -> Result<SessionRequest, DomainError> {
        caller.require(Permission::RequestCoachingSession)?;
        let coach = self.users.find_account(booking.coach_id)?;
        if coach.map(|c| c.role) != Some(Role::Coach) {
            return Err(DomainError::field("coach", "Selected user is not a coach."));
        }
        let request = self.sessions.create(NewSessionRequest {
            athlete_id: caller.id,
            coach_id: booking.coach_id,
            session_date: booking.session_date,
            session_time: booking.session_time,
            notes: booking.notes.filter(|n| !n.trim().is_empty()),
        })?;
        self.notify(
            request.coach.id,
            caller.id,
            "New Session Request",
            format!(
                "{} requested a session on {} at {}",
                request.athlete.full_name, request.session_date, request.session_time
            ),
            request.id,
        )?;
        Ok(request)
    }

    /// Coaches see requests addressed to them; everyone else sees what they sent.
    pub fn list(&self, caller: &Caller) -> Result<Vec<SessionRequest>, DomainError> {
        if caller.role == Role::Coach {
            self.sessions.list_for_coach(caller.id)
        } else {
            self.sessions.list_for_athlete(caller.id)
        }
    }

    pub fn get(&self, caller: &Caller, id: Uuid) -> Result<SessionRequest, DomainError> {
        let request = self
            .sessions
            .find(id)?
            .ok_or(DomainError::NotFound("Session request"))?;
        if !request.involves(caller.id) {
            return Err(DomainError::Forbidden(
                "You are not part of this session request.".to_string(),
            ));
        }
        Ok(request)
    }

    pub fn respond(&self, caller: &Caller, id: Uuid, answer: SessionStatus) -> Result<SessionRequest, DomainError> {
        caller.require(Permission::RespondToCoachingSession)?;
        let request = self.get(caller, id)?;
        if request.coach.id != caller.id {
            return Err(DomainError::Forbidden(
                "Only the requested coach can respond.".to_string(),
            ));
        }
        let status = request.status.respond(answer)?;
        let updated = self.sessions.set_status(id, status)?;
        self.notify(
            updated.athlete.id,
            caller.id,
            "Session Request Update",
            format!(
                "{} {} your session request for {}",
                updated.coach.full_name, status, updated.session_date
            ),
            updated.id,
        )?;
        Ok(updated)
    }

    pub fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        self.get(caller, id)?;
        self.sessions.delete(id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::page::PageRequest;
    use crate::infrastructure::coaching_repo::DieselSessionRepository;
    use crate::infrastructure::notification_repo::DieselNotificationRepository;
    use crate::infrastructure::push::NoopNotifier;
    use crate::infrastructure::testing::{seed_user, setup_db};
    use crate::infrastructure::user_repo::DieselUserRepository;

    fn booking(coach_id: Uuid) -> SessionBooking {
        SessionBooking {
            coach_id,
            session_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            session_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            notes: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn coach_is_notified_and_answers_once() {
        let (_container, pool) = setup_db().await;
        let notifications = NotificationService::new(
            Arc::new(DieselNotificationRepository::new(pool.clone())),
            Arc::new(NoopNotifier),
        );
        let service = CoachingService::new(
            Arc::new(DieselSessionRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            notifications.clone(),
        );
        let athlete = Caller::new(seed_user(&pool, Role::Athlete, "Avery"), Role::Athlete);
        let coach = Caller::new(seed_user(&pool, Role::Coach, "Casey"), Role::Coach);
        let stranger = Caller::new(seed_user(&pool, Role::Athlete, "Sam"), Role::Athlete);

        let err = service.request(&athlete, booking(stranger.id)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref f) if f.contains("coach")));

        let request = service.request(&athlete, booking(coach.id)).unwrap();
        assert_eq!(request.notes, None);
        let inbox = notifications.list(coach.id, PageRequest::default()).unwrap();
        assert_eq!(inbox.count, 1);

        assert_eq!(service.list(&coach).unwrap().len(), 1);
        assert_eq!(service.list(&athlete).unwrap().len(), 1);
        assert!(matches!(
            service.get(&stranger, request.id),
            Err(DomainError::Forbidden(_))
        ));
        assert!(service.respond(&athlete, request.id, SessionStatus::Accepted).is_err());

        let accepted = service
            .respond(&coach, request.id, SessionStatus::Accepted)
            .unwrap();
        assert_eq!(accepted.status, SessionStatus::Accepted);
        assert!(service
            .respond(&coach, request.id, SessionStatus::Rejected)
            .is_err());
        assert_eq!(
            notifications.list(athlete.id, PageRequest::default()).unwrap().count,
            1
        );

        service.delete(&athlete, request.id).unwrap();
        assert!(matches!(
            service.get(&athlete, request.id),
            Err(DomainError::NotFound(_))
        ));
    }
}
