use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    OrderFilter, OrderSortField, OrderStatus, ShippingAddressInput, TimeBound,
};
use crate::domain::page::{PageRequest, Sort};
use crate::errors::AppError;
use crate::infrastructure::stripe;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ShippingAddressRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street_address: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub shipping_address: ShippingAddressRequest,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Accepts both `total_price_lt` and the double-underscore lookup spelling
/// (`total_price__lt`, `user__email`) used by existing clients.
#[derive(Debug, Deserialize)]
pub struct ListAllOrdersParams {
    pub status: Option<String>,
    #[serde(alias = "user__email")]
    pub email: Option<String>,
    pub search: Option<String>,
    pub total_price: Option<BigDecimal>,
    #[serde(alias = "total_price__lt")]
    pub total_price_lt: Option<BigDecimal>,
    #[serde(alias = "total_price__gt")]
    pub total_price_gt: Option<BigDecimal>,
    pub created_at: Option<String>,
    #[serde(alias = "created_at__lt")]
    pub created_at_lt: Option<String>,
    #[serde(alias = "created_at__gt")]
    pub created_at_gt: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl From<ShippingAddressRequest> for ShippingAddressInput {
    fn from(r: ShippingAddressRequest) -> Self {
        ShippingAddressInput {
            first_name: r.first_name,
            last_name: r.last_name,
            country: r.country,
            state: r.state,
            city: r.city,
            street_address: r.street_address,
            zip_code: r.zip_code,
            phone_number: r.phone_number,
        }
    }
}

fn time_bound(field: &'static str, raw: Option<String>) -> Result<Option<TimeBound>, DomainError> {
    match raw.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| DomainError::field(field, "Enter a valid date/time.")),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Turns the caller's cart into a pending order. Stock is only reserved once
/// the payment provider confirms the charge.
pub async fn create_order(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let address = ShippingAddressInput::from(body.into_inner().shipping_address);
    let orders = state.orders.clone();
    let placed = run(move || orders.place(user.id, address)).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Order placed successfully",
        "order_id": placed.order_id
    })))
}

/// GET /orders
pub async fn list_orders(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let orders = state.orders.clone();
    let mine = run(move || orders.list_mine(user.id)).await?;
    Ok(HttpResponse::Ok().json(mine))
}

/// GET /orders/{id}
pub async fn get_order(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let orders = state.orders.clone();
    let order = run(move || orders.get(&user.caller(), order_id)).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// GET /orders/admin
pub async fn list_all_orders(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ListAllOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.page_size);
    let status = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<OrderStatus>()?),
        None => None,
    };
    let filter = OrderFilter {
        status,
        email: params.email.filter(|e| !e.trim().is_empty()),
        search: params.search.filter(|s| !s.trim().is_empty()),
        total_price: params.total_price,
        total_price_lt: params.total_price_lt,
        total_price_gt: params.total_price_gt,
        created_at: time_bound("created_at", params.created_at)?,
        created_at_lt: time_bound("created_at__lt", params.created_at_lt)?,
        created_at_gt: time_bound("created_at__gt", params.created_at_gt)?,
        sort: Sort::parse(
            params.ordering.as_deref(),
            Sort::desc(OrderSortField::CreatedAt),
        ),
    };
    let orders = state.orders.clone();
    let result = run(move || orders.list_all(&user.caller(), &filter, page)).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// PUT /orders/admin/{id}
pub async fn update_status(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status: OrderStatus = body.into_inner().status.trim().parse()?;
    let orders = state.orders.clone();
    let change = run(move || orders.update_status(&user.caller(), order_id, status)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Order status updated successfully",
        "status": change.current
    })))
}

/// POST /orders/payment-intent
pub async fn create_payment_intent(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<PaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = body
        .into_inner()
        .order_id
        .ok_or_else(|| AppError::BadRequest("Order ID is required".to_string()))?;
    let payments = state.payments.clone();
    let intent = run(move || payments.create_intent(user.id, order_id)).await?;
    Ok(HttpResponse::Ok().json(intent))
}

/// POST /orders/stripe/webhook
///
/// Signature and payload are checked before anything is touched; a verified
/// event for an unknown or already settled order is acknowledged as a no-op.
pub async fn stripe_webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    let Some(signature) = signature else {
        return Err(AppError::BadRequest(
            "Webhook secret or signature missing".to_string(),
        ));
    };
    state
        .webhook
        .verify(&payload, signature, Utc::now().timestamp())?;
    let event = stripe::parse_event(&payload)?;

    let payments = state.payments.clone();
    run(move || payments.reconcile(event)).await?;

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};

    use super::*;
    use crate::auth::token::TokenService;
    use crate::db::lazy_pool;
    use crate::handlers::{configure, json_config};
    use crate::infrastructure::mailer::LogMailer;
    use crate::infrastructure::password::BcryptHasher;
    use crate::infrastructure::push::NoopNotifier;
    use crate::infrastructure::stripe::{sign_payload, StripeGateway, WebhookVerifier};
    use crate::state::{AppState, Integrations};

    const SECRET: &str = "whsec_test";

    fn state(webhook_secret: &str) -> AppState {
        AppState::new(
            lazy_pool("postgres://nobody@127.0.0.1:1/none"),
            TokenService::new("jwt-secret"),
            WebhookVerifier::new(webhook_secret),
            "http://localhost:3000",
            Integrations {
                payments: Arc::new(StripeGateway::new("http://127.0.0.1:1", "")),
                mailer: Arc::new(LogMailer::new("shop@example.com")),
                push: Arc::new(NoopNotifier),
                hasher: Arc::new(BcryptHasher::new(4)),
            },
        )
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(json_config())
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn webhook_without_signature_is_rejected() {
        let app = app!(state(SECRET));
        let req = test::TestRequest::post()
            .uri("/orders/stripe/webhook")
            .set_payload("{}")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn webhook_with_forged_signature_is_rejected() {
        let app = app!(state(SECRET));
        let payload = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let header = sign_payload("whsec_other", payload, Utc::now().timestamp()).unwrap();
        let req = test::TestRequest::post()
            .uri("/orders/stripe/webhook")
            .insert_header((SIGNATURE_HEADER, header))
            .set_payload(payload.to_vec())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn webhook_without_configured_secret_is_rejected() {
        let app = app!(state(""));
        let payload = b"{}";
        let header = sign_payload(SECRET, payload, Utc::now().timestamp()).unwrap();
        let req = test::TestRequest::post()
            .uri("/orders/stripe/webhook")
            .insert_header((SIGNATURE_HEADER, header))
            .set_payload(payload.to_vec())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn signed_but_malformed_payload_is_rejected() {
        let app = app!(state(SECRET));
        let payload = b"not json";
        let header = sign_payload(SECRET, payload, Utc::now().timestamp()).unwrap();
        let req = test::TestRequest::post()
            .uri("/orders/stripe/webhook")
            .insert_header((SIGNATURE_HEADER, header))
            .set_payload(payload.to_vec())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn ignored_event_types_are_acknowledged() {
        let app = app!(state(SECRET));
        let payload = br#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
        let header = sign_payload(SECRET, payload, Utc::now().timestamp()).unwrap();
        let req = test::TestRequest::post()
            .uri("/orders/stripe/webhook")
            .insert_header((SIGNATURE_HEADER, header))
            .set_payload(payload.to_vec())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn order_endpoints_require_a_bearer_token() {
        let app = app!(state(SECRET));
        for req in [
            test::TestRequest::get().uri("/orders").to_request(),
            test::TestRequest::post()
                .uri("/orders")
                .set_json(json!({}))
                .to_request(),
            test::TestRequest::post()
                .uri("/orders/payment-intent")
                .insert_header(("Authorization", "Bearer not-a-jwt"))
                .set_json(json!({}))
                .to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[::core::prelude::v1::test]
    fn admin_filters_accept_lookup_spellings() {
        let query = web::Query::<ListAllOrdersParams>::from_query(
            "user__email=buyer%40example.com&total_price__gt=10.5&total_price__lt=99&created_at__gt=2025-03-01&created_at__lt=2025-03-02T12:00:00Z",
        )
        .unwrap()
        .into_inner();
        assert_eq!(query.email.as_deref(), Some("buyer@example.com"));
        assert_eq!(query.total_price_gt, Some("10.5".parse().unwrap()));
        assert_eq!(query.total_price_lt, Some(BigDecimal::from(99)));

        let after = time_bound("created_at__gt", query.created_at_gt).unwrap().unwrap();
        assert_eq!(after.instant().to_rfc3339(), "2025-03-01T00:00:00+00:00");
        let before = time_bound("created_at__lt", query.created_at_lt).unwrap().unwrap();
        assert_eq!(before.instant().to_rfc3339(), "2025-03-02T12:00:00+00:00");
    }

    #[::core::prelude::v1::test]
    fn unparseable_dates_are_field_errors() {
        match time_bound("created_at", Some("03/01/2025".into())) {
            Err(DomainError::Validation(errors)) => assert!(errors.contains("created_at")),
            other => panic!("expected a field error, got {:?}", other),
        }
        assert_eq!(time_bound("created_at", Some("  ".into())).unwrap(), None);
    }
}
