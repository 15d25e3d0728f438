use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::run;
use crate::domain::contact::NewContactMessage;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// POST /contact-us
///
/// Open to anonymous visitors.
pub async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    let ContactRequest { name, email, message } = body.into_inner();
    let form = NewContactMessage { name, email, message };
    let contact = state.contact.clone();
    run(move || contact.submit(form)).await?;
    Ok(HttpResponse::Created().json(json!({ "message": "Message sent successfully" })))
}
