pub mod accounts;
pub mod cart;
pub mod chats;
pub mod coaching;
pub mod contact;
pub mod notifications;
pub mod orders;
pub mod podcasts;
pub mod products;
pub mod reviews;
pub mod social;
pub mod sports;

use actix_web::{error, web, HttpRequest};
use serde::Deserialize;

use crate::domain::errors::DomainError;
use crate::domain::page::PageRequest;
use crate::errors::AppError;

/// Runs synchronous service code on the blocking pool.
pub(crate) async fn run<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let result = web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(result)
}

/// `?page=&page_size=` for endpoints with no other query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Malformed JSON bodies become a 400 with the parser message.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(err.to_string()).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(accounts::register))
            .route("/login", web::post().to(accounts::login))
            .route("/password/reset", web::post().to(accounts::request_password_reset))
            .route(
                "/password/reset/{uid}/{token}",
                web::post().to(accounts::reset_password),
            )
            .route("/athlete/profile", web::put().to(accounts::update_athlete_profile)),
    )
    .service(
        web::scope("/users")
            .route("/profile", web::get().to(accounts::profile))
            .route("/profile/edit", web::put().to(accounts::update_profile))
            .route("/profile/update-password", web::post().to(accounts::change_password))
            .route("/search", web::get().to(accounts::search)),
    )
    .service(
        web::scope("/sports")
            .route("", web::get().to(sports::list_sports))
            .route("", web::post().to(sports::create_sport))
            .route("/positions/{id}", web::get().to(sports::get_position))
            .route("/positions/{id}", web::put().to(sports::update_position))
            .route("/positions/{id}", web::delete().to(sports::delete_position))
            .route("/{id}", web::get().to(sports::get_sport))
            .route("/{id}", web::put().to(sports::update_sport))
            .route("/{id}", web::delete().to(sports::delete_sport))
            .route("/{id}/positions", web::get().to(sports::list_positions))
            .route("/{id}/positions", web::post().to(sports::create_position)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("", web::post().to(products::create_product))
            .route("/check-name", web::get().to(products::check_name))
            .route("/{id}", web::get().to(products::get_product))
            .route("/{id}", web::put().to(products::update_product))
            .route("/{id}", web::delete().to(products::delete_product)),
    )
    .service(
        web::scope("/cart")
            .route("", web::get().to(cart::get_cart))
            .route("/add", web::post().to(cart::add_item))
            .route("/items/{id}", web::put().to(cart::update_item))
            .route("/items/{id}", web::delete().to(cart::remove_item))
            .route("/clear", web::delete().to(cart::clear_cart)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("", web::post().to(orders::create_order))
            .route("/admin", web::get().to(orders::list_all_orders))
            .route("/admin/{id}", web::put().to(orders::update_status))
            .route("/payment-intent", web::post().to(orders::create_payment_intent))
            .route("/stripe/webhook", web::post().to(orders::stripe_webhook))
            .route("/{id}", web::get().to(orders::get_order)),
    )
    .service(
        web::scope("/posts")
            .route("", web::get().to(social::feed))
            .route("", web::post().to(social::create_post))
            .route("/likes", web::post().to(social::toggle_like))
            .route("/comments", web::post().to(social::add_comment))
            .route("/comments/{id}", web::put().to(social::update_comment))
            .route("/comments/{id}", web::delete().to(social::delete_comment))
            .route("/{id}", web::get().to(social::get_post))
            .route("/{id}", web::put().to(social::update_post))
            .route("/{id}", web::delete().to(social::delete_post))
            .route("/{id}/comments", web::get().to(social::list_comments)),
    )
    .service(
        web::scope("/relationships")
            .route("/follow/{user_id}", web::post().to(social::follow))
            .route("/unfollow/{user_id}", web::post().to(social::unfollow))
            .route("/followers", web::get().to(social::followers))
            .route("/following", web::get().to(social::following))
            .route("/is-following/{user_id}", web::get().to(social::is_following)),
    )
    .service(
        web::scope("/chats")
            .route("", web::get().to(chats::list_chats))
            .route("", web::post().to(chats::start_chat))
            .route("/{id}", web::get().to(chats::get_chat)),
    )
    .service(
        web::scope("/coachingsessions")
            .route("", web::get().to(coaching::list_requests))
            .route("", web::post().to(coaching::request_session))
            .route("/{id}", web::get().to(coaching::get_request))
            .route("/{id}", web::put().to(coaching::respond))
            .route("/{id}", web::delete().to(coaching::delete_request)),
    )
    .service(
        web::scope("/reviews")
            .route("/add/{product_id}", web::put().to(reviews::upsert_review))
            .route("/delete/{id}", web::delete().to(reviews::delete_review))
            .route("/user", web::get().to(reviews::my_reviews))
            .route("/product/{product_id}", web::get().to(reviews::product_reviews))
            .route("/product/{product_id}/stats", web::get().to(reviews::product_stats)),
    )
    .service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::list_notifications))
            .route("/mark-as-read", web::post().to(notifications::mark_all_read)),
    )
    .service(
        web::scope("/podcasts")
            .route("", web::get().to(podcasts::list_podcasts))
            .route("", web::post().to(podcasts::create_podcast))
            .route("/comments/{id}", web::delete().to(podcasts::delete_comment))
            .route("/{id}", web::get().to(podcasts::get_podcast))
            .route("/{id}", web::put().to(podcasts::update_podcast))
            .route("/{id}", web::delete().to(podcasts::delete_podcast))
            .route("/{id}/like", web::post().to(podcasts::react))
            .route("/{id}/comments", web::get().to(podcasts::list_comments))
            .route("/{id}/comments", web::post().to(podcasts::add_comment)),
    )
    .route("/contact-us", web::post().to(contact::send_message));
}
