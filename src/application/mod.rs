pub mod account_service;
pub mod cart_service;
pub mod catalog_service;
pub mod chat_service;
pub mod coaching_service;
pub mod contact_service;
pub mod notification_service;
pub mod order_service;
pub mod payment_service;
pub mod podcast_service;
pub mod review_service;
pub mod social_service;
pub mod sport_service;
