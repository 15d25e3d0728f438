use std::sync::Arc;

use crate::application::account_service::AccountService;
use crate::application::cart_service::CartService;
use crate::application::catalog_service::CatalogService;
use crate::application::chat_service::ChatService;
use crate::application::coaching_service::CoachingService;
use crate::application::contact_service::ContactService;
use crate::application::notification_service::NotificationService;
use crate::application::order_service::OrderService;
use crate::application::payment_service::PaymentService;
use crate::application::podcast_service::PodcastService;
use crate::application::review_service::ReviewService;
use crate::application::social_service::SocialService;
use crate::application::sport_service::SportService;
use crate::auth::token::TokenService;
use crate::db::DbPool;
use crate::domain::ports::{Mailer, PasswordHasher, PaymentGateway, PushNotifier};
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::chat_repo::DieselChatRepository;
use crate::infrastructure::coaching_repo::DieselSessionRepository;
use crate::infrastructure::contact_repo::DieselContactRepository;
use crate::infrastructure::follow_repo::DieselFollowRepository;
use crate::infrastructure::notification_repo::DieselNotificationRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::podcast_repo::DieselPodcastRepository;
use crate::infrastructure::post_repo::DieselPostRepository;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::review_repo::DieselReviewRepository;
use crate::infrastructure::sport_repo::DieselSportRepository;
use crate::infrastructure::stripe::WebhookVerifier;
use crate::infrastructure::user_repo::DieselUserRepository;

/// Outbound clients handed to the services.
#[derive(Clone)]
pub struct Integrations {
    pub payments: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub push: Arc<dyn PushNotifier>,
    pub hasher: Arc<dyn PasswordHasher>,
}

/// Everything a handler needs, shared across workers through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub webhook: WebhookVerifier,
    pub accounts: AccountService,
    pub sports: SportService,
    pub catalog: CatalogService,
    pub cart: CartService,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub social: SocialService,
    pub chats: ChatService,
    pub coaching: CoachingService,
    pub reviews: ReviewService,
    pub notifications: NotificationService,
    pub podcasts: PodcastService,
    pub contact: ContactService,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        tokens: TokenService,
        webhook: WebhookVerifier,
        frontend_url: &str,
        integrations: Integrations,
    ) -> Self {
        let users = Arc::new(DieselUserRepository::new(pool.clone()));
        let sports = Arc::new(DieselSportRepository::new(pool.clone()));
        let products = Arc::new(DieselProductRepository::new(pool.clone()));
        let orders = Arc::new(DieselOrderRepository::new(pool.clone()));

        let notifications = NotificationService::new(
            Arc::new(DieselNotificationRepository::new(pool.clone())),
            integrations.push.clone(),
        );

        AppState {
            accounts: AccountService::new(
                users.clone(),
                sports.clone(),
                integrations.hasher.clone(),
                integrations.mailer.clone(),
                tokens.clone(),
                frontend_url,
            ),
            sports: SportService::new(sports),
            catalog: CatalogService::new(products.clone()),
            cart: CartService::new(Arc::new(DieselCartRepository::new(pool.clone()))),
            orders: OrderService::new(orders.clone(), integrations.mailer.clone()),
            payments: PaymentService::new(orders, integrations.payments.clone()),
            social: SocialService::new(
                Arc::new(DieselPostRepository::new(pool.clone())),
                Arc::new(DieselFollowRepository::new(pool.clone())),
                users.clone(),
                notifications.clone(),
            ),
            chats: ChatService::new(Arc::new(DieselChatRepository::new(pool.clone())), users.clone()),
            coaching: CoachingService::new(
                Arc::new(DieselSessionRepository::new(pool.clone())),
                users,
                notifications.clone(),
            ),
            reviews: ReviewService::new(Arc::new(DieselReviewRepository::new(pool.clone())), products),
            podcasts: PodcastService::new(Arc::new(DieselPodcastRepository::new(pool.clone()))),
            contact: ContactService::new(Arc::new(DieselContactRepository::new(pool))),
            notifications,
            tokens,
            webhook,
        }
    }
}
