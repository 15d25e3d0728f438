use std::sync::Arc;

use uuid::Uuid;

use crate::auth::token::TokenService;
use crate::domain::errors::{DomainError, FieldErrors};
use crate::domain::notification::OutgoingEmail;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{Mailer, PasswordHasher, SportRepository, UserRepository};
use crate::domain::role::Role;
use crate::domain::user::{
    generate_username, looks_like_email, normalize_email, Account, AthleteProfileUpdate, NewUser,
    ProfileUpdate, UserProfile, UserSearch, MIN_PASSWORD_LEN,
};

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

/// Account plus a freshly issued access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub access: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sports: Arc<dyn SportRepository>,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenService,
    frontend_url: String,
}

fn check_password(field: &str, password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::field(
            field,
            format!(
                "Ensure this field has at least {} characters.",
                MIN_PASSWORD_LEN
            ),
        ));
    }
    Ok(())
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sports: Arc<dyn SportRepository>,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenService,
        frontend_url: &str,
    ) -> Self {
        Self {
            users,
            sports,
            hasher,
            mailer,
            tokens,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn register(&self, registration: Registration) -> Result<Session, DomainError> {
        let email = normalize_email(&registration.email);
        let mut errors = FieldErrors::new();
        if !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Ensure this field has at least {} characters.", MIN_PASSWORD_LEN),
            );
        }
        if !registration.role.self_assignable() {
            errors.add("role", "This role cannot be chosen at registration.");
        }
        errors.into_result()?;

        if self.users.email_exists(&email)? {
            return Err(DomainError::field(
                "email",
                "A user with this email already exists.",
            ));
        }

        let account = self.users.create(NewUser {
            username: generate_username(&email),
            password_hash: self.hasher.hash(&registration.password)?,
            email,
            role: registration.role,
            first_name: registration.first_name,
            middle_name: registration.middle_name,
            last_name: registration.last_name,
        })?;
        log::info!("Registered user {} as {}", account.id, account.role);
        let access = self.tokens.issue_access(account.id)?;
        Ok(Session { account, access })
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());
        let account = self
            .users
            .find_account_by_email(&normalize_email(email))?
            .ok_or_else(invalid)?;
        if !self.hasher.verify(password, &account.password_hash)? {
            return Err(invalid());
        }
        let access = self.tokens.issue_access(account.id)?;
        Ok(Session { account, access })
    }

    /// Emails a reset link; the send itself is fire-and-forget.
    pub fn request_password_reset(&self, email: &str) -> Result<(), DomainError> {
        let account = self
            .users
            .find_account_by_email(&normalize_email(email))?
            .ok_or(DomainError::NotFound("User"))?;
        let token = self.tokens.issue_password_reset(&account)?;
        let link = format!(
            "{}/reset-password/{}/{}/",
            self.frontend_url, account.id, token
        );
        let email = OutgoingEmail {
            to: account.email.clone(),
            subject: "Reset Your Password".to_string(),
            body: format!("Click the link to reset your password: {}", link),
        };
        if let Err(e) = self.mailer.send(&email) {
            log::warn!("Password reset mail for user {} failed: {}", account.id, e);
        }
        Ok(())
    }

    pub fn reset_password(&self, user_id: Uuid, token: &str, password: &str) -> Result<(), DomainError> {
        let invalid = || DomainError::InvalidInput("Invalid or expired token".to_string());
        let account = self.users.find_account(user_id)?.ok_or_else(invalid)?;
        self.tokens.verify_password_reset(token, &account)?;
        check_password("password", password)?;
        self.users.set_password(account.id, &self.hasher.hash(password)?)
    }

    pub fn change_password(&self, user_id: Uuid, current: &str, new: &str) -> Result<(), DomainError> {
        let account = self
            .users
            .find_account(user_id)?
            .ok_or(DomainError::NotFound("User"))?;
        if !self.hasher.verify(current, &account.password_hash)? {
            return Err(DomainError::field(
                "current_password",
                "Current password is incorrect.",
            ));
        }
        check_password("new_password", new)?;
        self.users.set_password(account.id, &self.hasher.hash(new)?)
    }

    /// Token subject lookup used by the request extractor.
    pub fn account(&self, user_id: Uuid) -> Result<Option<Account>, DomainError> {
        self.users.find_account(user_id)
    }

    pub fn profile(&self, user_id: Uuid) -> Result<UserProfile, DomainError> {
        self.users
            .find_profile(user_id)?
            .ok_or(DomainError::NotFound("User"))
    }

    pub fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<UserProfile, DomainError> {
        let mut errors = FieldErrors::new();
        if let Some(username) = update.username.as_deref() {
            if username.trim().is_empty() {
                errors.add("username", "This field may not be blank.");
            } else if self.users.username_taken(username.trim(), user_id)? {
                errors.add("username", "This username is already taken.");
            }
        }
        if let Some(mobile) = update.mobile_number.as_deref().filter(|m| !m.trim().is_empty()) {
            if self.users.mobile_taken(mobile.trim(), user_id)? {
                errors.add("mobile_number", "This mobile number is already in use.");
            }
        }
        errors.into_result()?;

        let update = ProfileUpdate {
            username: update.username.map(|u| u.trim().to_string()),
            ..update
        };
        self.users.update_profile(user_id, update)
    }

    /// Athlete-only fields. A position must belong to the (new or stored) sport.
    pub fn update_athlete_profile(
        &self,
        account: &Account,
        update: AthleteProfileUpdate,
    ) -> Result<UserProfile, DomainError> {
        if account.role != Role::Athlete {
            return Err(DomainError::Forbidden(
                "Only athletes have an athlete profile.".to_string(),
            ));
        }

        let mut errors = FieldErrors::new();
        if let Some(sport_id) = update.sport_id {
            if self.sports.find(sport_id)?.is_none() {
                errors.add("sport", "Invalid sport.");
            }
        }
        if let Some(position_id) = update.position_id {
            let sport_id = match update.sport_id {
                Some(id) => Some(id),
                None => self.profile(account.id)?.sport.map(|s| s.id),
            };
            match (self.sports.find_position(position_id)?, sport_id) {
                (None, _) => errors.add("position", "Invalid position."),
                (Some(_), None) => errors.add("position", "Select a sport before a position."),
                (Some(position), Some(sport_id)) if position.sport_id != sport_id => {
                    errors.add("position", "This position does not belong to the selected sport.")
                }
                _ => {}
            }
        }
        if let Some(years) = update.years_left_to_play {
            if years < 0 {
                errors.add("years_left_to_play", "Ensure this value is greater than or equal to 0.");
            }
        }
        errors.into_result()?;

        self.users.update_athlete_profile(account.id, update)
    }

    /// Only athletes and coaches are searchable; other roles yield an empty page.
    pub fn search(&self, search: UserSearch, page: PageRequest) -> Result<Page<UserProfile>, DomainError> {
        if !search.role.searchable() {
            return Ok(Page::new(Vec::new(), 0, page));
        }
        self.users.search(&search.normalized(), page)
    }

    /// Creates the configured superadmin when no account holds that email yet.
    pub fn ensure_superadmin(&self, email: &str, password: &str) -> Result<(), DomainError> {
        let email = normalize_email(email);
        if self.users.find_account_by_email(&email)?.is_some() {
            return Ok(());
        }
        check_password("password", password)?;
        let account = self.users.create(NewUser {
            username: generate_username(&email),
            password_hash: self.hasher.hash(password)?,
            email,
            role: Role::SuperAdmin,
            first_name: Some("Super".to_string()),
            middle_name: None,
            last_name: Some("Admin".to_string()),
        })?;
        log::info!("Seeded superadmin account {}", account.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::domain::sport::{Position, Sport, SportGender};
    use crate::domain::user::UserSummary;

    #[derive(Default)]
    struct MemoryUsers {
        accounts: Mutex<Vec<Account>>,
    }

    impl UserRepository for MemoryUsers {
        fn create(&self, user: NewUser) -> Result<Account, DomainError> {
            let account = Account {
                id: Uuid::new_v4(),
                email: user.email,
                role: user.role,
                first_name: user.first_name,
                password_hash: user.password_hash,
                password_changed_at: Utc::now(),
                fcm_token: None,
                notify_on_like: true,
                notify_on_comment: true,
            };
            self.accounts.lock().unwrap().push(account.clone());
            Ok(account)
        }
        fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
            Ok(self.accounts.lock().unwrap().iter().any(|a| a.email == email))
        }
        fn username_taken(&self, _: &str, _: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
        fn mobile_taken(&self, _: &str, _: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
        fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
            Ok(self.accounts.lock().unwrap().iter().find(|a| a.id == id).cloned())
        }
        fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
            Ok(self.accounts.lock().unwrap().iter().find(|a| a.email == email).cloned())
        }
        fn find_profile(&self, _: Uuid) -> Result<Option<UserProfile>, DomainError> {
            Ok(None)
        }
        fn find_summary(&self, _: Uuid) -> Result<Option<UserSummary>, DomainError> {
            Ok(None)
        }
        fn update_profile(&self, _: Uuid, _: ProfileUpdate) -> Result<UserProfile, DomainError> {
            unimplemented!()
        }
        fn update_athlete_profile(&self, _: Uuid, _: AthleteProfileUpdate) -> Result<UserProfile, DomainError> {
            unimplemented!()
        }
        fn set_password(&self, id: Uuid, hash: &str) -> Result<(), DomainError> {
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts.iter_mut().find(|a| a.id == id).ok_or(DomainError::NotFound("User"))?;
            account.password_hash = hash.to_string();
            account.password_changed_at = Utc::now() + chrono::Duration::seconds(1);
            Ok(())
        }
        fn search(&self, _: &UserSearch, page: PageRequest) -> Result<Page<UserProfile>, DomainError> {
            Ok(Page::new(Vec::new(), 0, page))
        }
    }

    struct NoSports;

    impl SportRepository for NoSports {
        fn list(&self) -> Result<Vec<Sport>, DomainError> {
            Ok(Vec::new())
        }
        fn create(&self, _: &str, _: SportGender) -> Result<Sport, DomainError> {
            unimplemented!()
        }
        fn find(&self, _: Uuid) -> Result<Option<Sport>, DomainError> {
            Ok(None)
        }
        fn delete(&self, _: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
        fn positions(&self, _: Uuid) -> Result<Vec<Position>, DomainError> {
            Ok(Vec::new())
        }
        fn create_position(&self, _: Uuid, _: &str) -> Result<Position, DomainError> {
            unimplemented!()
        }
        fn find_position(&self, _: Uuid) -> Result<Option<Position>, DomainError> {
            Ok(None)
        }
        fn update(&self, _: Uuid, _: &str, _: SportGender) -> Result<Option<Sport>, DomainError> {
            Ok(None)
        }
        fn update_position(&self, _: Uuid, _: &str) -> Result<Option<Position>, DomainError> {
            Ok(None)
        }
        fn delete_position(&self, _: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    /// Reversible "hash" so tests do not pay for bcrypt.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("plain:{}", password))
        }
        fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
            Ok(hash == format!("plain:{}", password))
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn service(recorder: Arc<RecordingMailer>) -> AccountService {
        AccountService::new(
            Arc::new(MemoryUsers::default()),
            Arc::new(NoSports),
            Arc::new(PlainHasher),
            recorder,
            TokenService::new("test-secret"),
            "https://app.portalized.test/",
        )
    }

    fn registration(email: &str, password: &str, role: Role) -> Registration {
        Registration {
            email: email.into(),
            password: password.into(),
            role,
            first_name: Some("Sam".into()),
            middle_name: None,
            last_name: None,
        }
    }

    #[test]
    fn register_collects_field_errors() {
        let svc = service(Arc::default());
        match svc.register(registration("nope", "123", Role::SuperAdmin)) {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.contains("email"));
                assert!(errors.contains("password"));
                assert!(errors.contains("role"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_email_and_login() {
        let svc = service(Arc::default());
        svc.register(registration("sam@Example.com", "secret1", Role::Athlete)).unwrap();
        assert!(matches!(
            svc.register(registration("sam@example.com", "secret1", Role::Coach)),
            Err(DomainError::Validation(_))
        ));
        assert!(svc.login("sam@example.com", "secret1").is_ok());
        assert!(matches!(
            svc.login("sam@example.com", "wrong"),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn reset_link_points_at_frontend() {
        let recorder = Arc::new(RecordingMailer::default());
        let svc = service(recorder.clone());
        let session = svc.register(registration("ana@example.com", "secret1", Role::Athlete)).unwrap();
        svc.request_password_reset("ana@example.com").unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let prefix = format!("https://app.portalized.test/reset-password/{}/", session.account.id);
        assert!(sent[0].body.contains(&prefix), "{}", sent[0].body);
        assert!(matches!(
            svc.request_password_reset("ghost@example.com"),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn change_password_checks_current() {
        let svc = service(Arc::default());
        let session = svc.register(registration("kai@example.com", "secret1", Role::Coach)).unwrap();
        let id = session.account.id;
        match svc.change_password(id, "wrong", "secret2") {
            Err(DomainError::Validation(errors)) => assert!(errors.contains("current_password")),
            other => panic!("expected validation error, got {:?}", other),
        }
        svc.change_password(id, "secret1", "secret2").unwrap();
        assert!(svc.login("kai@example.com", "secret2").is_ok());
    }

    #[test]
    fn general_users_are_not_searchable() {
        let svc = service(Arc::default());
        let search = UserSearch {
            role: Role::GeneralUser,
            name: None,
            weight: None,
            height: None,
            sport_id: None,
            position_id: None,
            division: None,
            eligibility: None,
        };
        assert_eq!(svc.search(search, PageRequest::default()).unwrap().count, 0);
    }

    #[test]
    fn superadmin_is_seeded_once() {
        let svc = service(Arc::default());
        svc.ensure_superadmin("root@portalized.app", "changeme").unwrap();
        svc.ensure_superadmin("root@portalized.app", "changeme").unwrap();
        let session = svc.login("root@portalized.app", "changeme").unwrap();
        assert_eq!(session.account.role, Role::SuperAdmin);
    }
}
