use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::user::Account;

pub const ACCESS_TOKEN_LIFETIME_SECS: i64 = 60 * 60;
pub const RESET_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub purpose: TokenPurpose,
}

impl Claims {
    /// Tokens issued before the last password change are void.
    pub fn predates(&self, password_changed_at: DateTime<Utc>) -> bool {
        self.iat < password_changed_at.timestamp()
    }
}

/// HS256 bearer and password-reset tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn issue(&self, user_id: Uuid, purpose: TokenPurpose, lifetime: i64) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(lifetime)).timestamp(),
            purpose,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn decode(&self, token: &str) -> Option<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)
    }

    pub fn issue_access(&self, user_id: Uuid) -> Result<String, DomainError> {
        self.issue(user_id, TokenPurpose::Access, ACCESS_TOKEN_LIFETIME_SECS)
    }

    /// Signature, expiry and purpose checks; the caller still has to compare
    /// `iat` with the account's last password change.
    pub fn decode_access(&self, token: &str) -> Result<Claims, DomainError> {
        match self.decode(token) {
            Some(claims) if claims.purpose == TokenPurpose::Access => Ok(claims),
            _ => Err(DomainError::Unauthorized(
                "Given token not valid for any token type".to_string(),
            )),
        }
    }

    pub fn issue_password_reset(&self, account: &Account) -> Result<String, DomainError> {
        self.issue(account.id, TokenPurpose::PasswordReset, RESET_TOKEN_LIFETIME_SECS)
    }

    /// A reset token is single-use: changing the password voids it.
    pub fn verify_password_reset(&self, token: &str, account: &Account) -> Result<(), DomainError> {
        match self.decode(token) {
            Some(claims)
                if claims.purpose == TokenPurpose::PasswordReset
                    && claims.sub == account.id
                    && !claims.predates(account.password_changed_at) =>
            {
                Ok(())
            }
            _ => Err(DomainError::InvalidInput("Invalid or expired token".to_string())),
        }
    }
}
