use uuid::Uuid;

use super::cart::Cart;
use super::chat::Chat;
use super::coaching::{NewSessionRequest, SessionRequest, SessionStatus};
use super::contact::{ContactMessage, NewContactMessage};
use super::errors::DomainError;
use super::notification::{NewNotification, Notification, OutgoingEmail, PushMessage};
use super::order::{Order, OrderFilter, OrderStatus, PlacedOrder, ShippingAddress, StatusChange};
use super::page::{Page, PageRequest, Sort};
use super::payment::{PaymentDetails, PaymentIntent, Reconciliation};
use super::podcast::{
    NewPodcast, Podcast, PodcastComment, PodcastFilter, PodcastPatch, ReactionChange,
};
use super::product::{NewProduct, Product, ProductFilter, ProductPatch, RatedProduct};
use super::review::{RatingStats, Review, ReviewSortField};
use super::social::{
    Comment, FollowEntry, LikeToggle, NewPost, Post, PostDetail, PostFilter, PostOwner, PostPatch,
};
use super::sport::{Position, Sport, SportGender};
use super::user::{
    Account, AthleteProfileUpdate, NewUser, ProfileUpdate, UserProfile, UserSearch, UserSummary,
};

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<Account, DomainError>;
    fn email_exists(&self, email: &str) -> Result<bool, DomainError>;
    fn username_taken(&self, username: &str, except: Uuid) -> Result<bool, DomainError>;
    fn mobile_taken(&self, mobile_number: &str, except: Uuid) -> Result<bool, DomainError>;
    fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError>;
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;
    fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError>;
    fn find_summary(&self, id: Uuid) -> Result<Option<UserSummary>, DomainError>;
    fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<UserProfile, DomainError>;
    fn update_athlete_profile(
        &self,
        id: Uuid,
        update: AthleteProfileUpdate,
    ) -> Result<UserProfile, DomainError>;
    /// Stores a new hash and bumps `password_changed_at`.
    fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError>;
    fn search(&self, search: &UserSearch, page: PageRequest) -> Result<Page<UserProfile>, DomainError>;
}

pub trait SportRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Sport>, DomainError>;
    fn create(&self, name: &str, gender: SportGender) -> Result<Sport, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<Sport>, DomainError>;
    fn update(&self, id: Uuid, name: &str, gender: SportGender) -> Result<Option<Sport>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn positions(&self, sport_id: Uuid) -> Result<Vec<Position>, DomainError>;
    fn create_position(&self, sport_id: Uuid, name: &str) -> Result<Position, DomainError>;
    fn find_position(&self, id: Uuid) -> Result<Option<Position>, DomainError>;
    fn update_position(&self, id: Uuid, name: &str) -> Result<Option<Position>, DomainError>;
    fn delete_position(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<RatedProduct>, DomainError>;
    fn list(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<RatedProduct>, DomainError>;
    fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn name_exists(&self, name: &str, except: Option<Uuid>) -> Result<bool, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Returns the user's cart, creating an empty one on first use.
    fn get(&self, user_id: Uuid) -> Result<Cart, DomainError>;
    fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<Cart, DomainError>;
    fn update_item(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> Result<Cart, DomainError>;
    fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Cart, DomainError>;
    fn clear(&self, user_id: Uuid) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Converts the user's cart into a pending order in one transaction.
    fn place(&self, user_id: Uuid, address: ShippingAddress) -> Result<PlacedOrder, DomainError>;
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_all(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>, DomainError>;
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<StatusChange, DomainError>;
    fn record_payment_success(&self, details: &PaymentDetails) -> Result<Reconciliation, DomainError>;
    fn record_payment_failure(&self, order_id: Uuid) -> Result<Reconciliation, DomainError>;
}

pub trait PostRepository: Send + Sync + 'static {
    fn feed(&self, viewer: Uuid, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, DomainError>;
    fn create(&self, author: Uuid, post: NewPost) -> Result<Post, DomainError>;
    fn find(&self, viewer: Uuid, id: Uuid) -> Result<Option<PostDetail>, DomainError>;
    fn owner(&self, id: Uuid) -> Result<Option<PostOwner>, DomainError>;
    /// Returns the updated post as its author sees it.
    fn update(&self, id: Uuid, patch: &PostPatch) -> Result<Option<Post>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn comments(&self, post_id: Uuid, page: PageRequest) -> Result<Page<Comment>, DomainError>;
    fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeToggle, DomainError>;
    fn add_comment(&self, user_id: Uuid, post_id: Uuid, content: &str) -> Result<Comment, DomainError>;
    fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError>;
    fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>, DomainError>;
    fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait FollowRepository: Send + Sync + 'static {
    /// Returns `false` when the follow already exists.
    fn follow(&self, follower: Uuid, followed: Uuid) -> Result<bool, DomainError>;
    fn unfollow(&self, follower: Uuid, followed: Uuid) -> Result<bool, DomainError>;
    fn is_following(&self, follower: Uuid, followed: Uuid) -> Result<bool, DomainError>;
    fn followers(&self, user_id: Uuid, page: PageRequest) -> Result<Page<FollowEntry>, DomainError>;
    fn following(&self, user_id: Uuid, page: PageRequest) -> Result<Page<FollowEntry>, DomainError>;
}

pub trait ChatRepository: Send + Sync + 'static {
    fn list_for(&self, user_id: Uuid) -> Result<Vec<Chat>, DomainError>;
    /// Returns the chat for the ordered pair and whether it was just created.
    fn find_or_create(&self, pair: (Uuid, Uuid)) -> Result<(Chat, bool), DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<Chat>, DomainError>;
}

pub trait SessionRepository: Send + Sync + 'static {
    fn create(&self, request: NewSessionRequest) -> Result<SessionRequest, DomainError>;
    fn list_for_coach(&self, coach_id: Uuid) -> Result<Vec<SessionRequest>, DomainError>;
    fn list_for_athlete(&self, athlete_id: Uuid) -> Result<Vec<SessionRequest>, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<SessionRequest>, DomainError>;
    fn set_status(&self, id: Uuid, status: SessionStatus) -> Result<SessionRequest, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait ReviewRepository: Send + Sync + 'static {
    /// Updates the user's review of the product, or creates one when the user
    /// has a paid order containing it. The boolean is `true` on creation.
    fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        rating: i32,
        review_text: Option<String>,
    ) -> Result<(Review, bool), DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<Review>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn for_product(&self, product_id: Uuid, sort: Sort<ReviewSortField>) -> Result<Vec<Review>, DomainError>;
    fn for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError>;
    fn stats(&self, product_id: Uuid) -> Result<RatingStats, DomainError>;
}

pub trait NotificationRepository: Send + Sync + 'static {
    fn create(&self, notification: NewNotification) -> Result<Notification, DomainError>;
    fn list(&self, recipient_id: Uuid, page: PageRequest) -> Result<Page<Notification>, DomainError>;
    fn mark_all_read(&self, recipient_id: Uuid) -> Result<usize, DomainError>;
}

pub trait PodcastRepository: Send + Sync + 'static {
    fn create(&self, uploaded_by: Uuid, podcast: NewPodcast) -> Result<Podcast, DomainError>;
    fn list(&self, filter: &PodcastFilter, page: PageRequest) -> Result<Page<Podcast>, DomainError>;
    /// Loads the podcast and counts the view.
    fn view(&self, id: Uuid) -> Result<Option<Podcast>, DomainError>;
    fn update(&self, id: Uuid, patch: PodcastPatch) -> Result<Option<Podcast>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn react(&self, user_id: Uuid, podcast_id: Uuid, is_liked: bool) -> Result<ReactionChange, DomainError>;
    fn comments(&self, podcast_id: Uuid) -> Result<Vec<PodcastComment>, DomainError>;
    fn add_comment(&self, user_id: Uuid, podcast_id: Uuid, content: &str) -> Result<PodcastComment, DomainError>;
    fn find_comment(&self, id: Uuid) -> Result<Option<PodcastComment>, DomainError>;
    fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait ContactRepository: Send + Sync + 'static {
    fn save(&self, message: NewContactMessage) -> Result<ContactMessage, DomainError>;
}

pub trait PaymentGateway: Send + Sync + 'static {
    fn create_payment_intent(&self, order_id: Uuid, amount_cents: i64) -> Result<PaymentIntent, DomainError>;
}

pub trait Mailer: Send + Sync + 'static {
    fn send(&self, email: &OutgoingEmail) -> Result<(), DomainError>;
}

pub trait PushNotifier: Send + Sync + 'static {
    fn push(&self, message: &PushMessage) -> Result<(), DomainError>;
}

pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, DomainError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
