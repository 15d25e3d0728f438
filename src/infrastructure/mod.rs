pub mod cart_repo;
pub mod chat_repo;
pub mod coaching_repo;
pub mod contact_repo;
pub mod follow_repo;
pub mod mailer;
pub mod notification_repo;
pub mod order_repo;
pub mod password;
pub mod podcast_repo;
pub mod post_repo;
pub mod product_repo;
pub mod push;
pub mod review_repo;
pub mod sport_repo;
pub mod stripe;
pub mod support;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod testing;
