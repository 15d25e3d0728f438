use std::sync::Arc;

use uuid::Uuid;

use super::notification_service::NotificationService;
use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, NotificationKind};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{FollowRepository, PostRepository, UserRepository};
use crate::domain::role::Permission;
use crate::domain::social::{
    validate_comment, Comment, FollowEntry, LikeToggle, NewPost, Post, PostDetail, PostFilter,
    PostOwner, PostPatch,
};
use crate::domain::user::Caller;

/// Posts, likes, comments and follows.
#[derive(Clone)]
pub struct SocialService {
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl SocialService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        follows: Arc<dyn FollowRepository>,
        users: Arc<dyn UserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            posts,
            follows,
            users,
            notifications,
        }
    }

    fn owner(&self, post_id: Uuid) -> Result<PostOwner, DomainError> {
        self.posts.owner(post_id)?.ok_or(DomainError::NotFound("Post"))
    }

    /// Notifies the post author about someone else's activity.
    fn notify_author(
        &self,
        owner: &PostOwner,
        actor: Uuid,
        kind: NotificationKind,
        wants_push: bool,
    ) -> Result<(), DomainError> {
        if owner.author_id == actor {
            return Ok(());
        }
        let name = self
            .users
            .find_summary(actor)?
            .map(|s| s.full_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Someone".to_string());
        let (title, message) = match kind {
            NotificationKind::Like => ("New Like", format!("{} liked your post", name)),
            _ => ("New Comment", format!("{} commented on your post", name)),
        };
        let token = owner.fcm_token.as_deref().filter(|_| wants_push);
        self.notifications.notify(
            NewNotification {
                recipient_id: owner.author_id,
                sender_id: Some(actor),
                title: title.to_string(),
                kind,
                message: Some(message),
                link: Some(format!("/posts/{}", owner.post_id)),
            },
            token,
        )?;
        Ok(())
    }

    // ── Posts ────────────────────────────────────────────────────────────────

    pub fn feed(&self, viewer: Uuid, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, DomainError> {
        self.posts.feed(viewer, filter, page)
    }

    pub fn create_post(&self, author: Uuid, post: NewPost) -> Result<Post, DomainError> {
        post.validate()?;
        self.posts.create(author, post)
    }

    pub fn get_post(&self, viewer: Uuid, id: Uuid) -> Result<PostDetail, DomainError> {
        self.posts.find(viewer, id)?.ok_or(DomainError::NotFound("Post"))
    }

    /// Authors edit their own posts; moderators can only delete them.
    pub fn update_post(&self, caller: &Caller, id: Uuid, patch: PostPatch) -> Result<Post, DomainError> {
        let owner = self.owner(id)?;
        caller.require_owner(owner.author_id)?;
        let current = self.get_post(caller.id, id)?;
        patch.validate_against(&current.post)?;
        self.posts
            .update(id, &patch)?
            .ok_or(DomainError::NotFound("Post"))
    }

    pub fn delete_post(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        let owner = self.owner(id)?;
        caller.require_owner_or(owner.author_id, Permission::ModerateContent)?;
        self.posts.delete(id)?;
        Ok(())
    }

    pub fn comments(&self, post_id: Uuid, page: PageRequest) -> Result<Page<Comment>, DomainError> {
        self.owner(post_id)?;
        self.posts.comments(post_id, page)
    }

    pub fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeToggle, DomainError> {
        let owner = self.owner(post_id)?;
        let toggle = self.posts.toggle_like(user_id, post_id)?;
        if toggle == LikeToggle::Liked {
            self.notify_author(&owner, user_id, NotificationKind::Like, owner.notify_on_like)?;
        }
        Ok(toggle)
    }

    pub fn add_comment(&self, user_id: Uuid, post_id: Uuid, content: &str) -> Result<Comment, DomainError> {
        let content = validate_comment(content)?;
        let owner = self.owner(post_id)?;
        let comment = self.posts.add_comment(user_id, post_id, &content)?;
        self.notify_author(&owner, user_id, NotificationKind::Comment, owner.notify_on_comment)?;
        Ok(comment)
    }

    pub fn update_comment(&self, caller: &Caller, id: Uuid, content: &str) -> Result<Comment, DomainError> {
        let content = validate_comment(content)?;
        let comment = self
            .posts
            .find_comment(id)?
            .ok_or(DomainError::NotFound("Comment"))?;
        caller.require_owner(comment.author.id)?;
        self.posts
            .update_comment(id, &content)?
            .ok_or(DomainError::NotFound("Comment"))
    }

    pub fn delete_comment(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        let comment = self
            .posts
            .find_comment(id)?
            .ok_or(DomainError::NotFound("Comment"))?;
        caller.require_owner_or(comment.author.id, Permission::ModerateContent)?;
        self.posts.delete_comment(id)?;
        Ok(())
    }

    // ── Follows ──────────────────────────────────────────────────────────────

    pub fn follow(&self, follower: Uuid, target: Uuid) -> Result<(), DomainError> {
        if follower == target {
            return Err(DomainError::InvalidInput("You cannot follow yourself.".to_string()));
        }
        self.users
            .find_summary(target)?
            .ok_or(DomainError::NotFound("User"))?;
        if !self.follows.follow(follower, target)? {
            return Err(DomainError::InvalidInput(
                "You are already following this user.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn unfollow(&self, follower: Uuid, target: Uuid) -> Result<(), DomainError> {
        if !self.follows.unfollow(follower, target)? {
            return Err(DomainError::InvalidInput(
                "You are not following this user.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_following(&self, follower: Uuid, target: Uuid) -> Result<bool, DomainError> {
        self.follows.is_following(follower, target)
    }

    pub fn followers(&self, user_id: Uuid, page: PageRequest) -> Result<Page<FollowEntry>, DomainError> {
        self.follows.followers(user_id, page)
    }

    pub fn following(&self, user_id: Uuid, page: PageRequest) -> Result<Page<FollowEntry>, DomainError> {
        self.follows.following(user_id, page)
    }
}
