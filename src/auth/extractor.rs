use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::role::Role;
use crate::domain::user::{Account, Caller};
use crate::errors::AppError;
use crate::state::AppState;

/// Authenticated user resolved from an `Authorization: Bearer <jwt>` header.
///
/// Rejects with 401 when the header is missing, the token does not verify,
/// the user no longer exists, or the token predates a password change.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub account: Account,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller::new(self.id, self.role)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return None;
    }
    Some(token.trim().to_string())
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| AppError::Internal("AppState is not registered".to_string()))?;
            let token = token.ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".to_string())
            })?;
            let claims = state.tokens.decode_access(&token)?;

            let accounts = state.accounts.clone();
            let user_id = claims.sub;
            let account = web::block(move || accounts.account(user_id))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;

            let Some(account) = account else {
                return Err(AppError::Unauthorized("User not found".to_string()));
            };
            if claims.predates(account.password_changed_at) {
                return Err(AppError::Unauthorized(
                    "Given token not valid for any token type".to_string(),
                ));
            }

            Ok(AuthUser {
                id: account.id,
                role: account.role,
                account,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn bearer_token_requires_the_scheme() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Token abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
