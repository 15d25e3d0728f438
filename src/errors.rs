use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::{DomainError, FieldErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Insufficient stock")]
    InsufficientStock(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(what) => AppError::NotFound(what.to_string()),
            DomainError::Validation(fields) => AppError::Validation(fields),
            DomainError::InvalidInput(msg) | DomainError::Payment(msg) => AppError::BadRequest(msg),
            DomainError::InsufficientStock(products) => AppError::InsufficientStock(products),
            DomainError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::InsufficientStock(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::Validation(fields) => builder.json(serde_json::json!({
                "error": self.to_string(),
                "fields": fields
            })),
            AppError::InsufficientStock(products) => builder.json(serde_json::json!({
                "error": format!("Insufficient stock for: {}", products.join(", ")),
                "products": products
            })),
            AppError::Internal(detail) => {
                log::error!("{}", detail);
                builder.json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
            _ => builder.json(serde_json::json!({
                "error": self.to_string()
            })),
        }
    }
}
