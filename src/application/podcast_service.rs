use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::podcast::{
    NewPodcast, Podcast, PodcastComment, PodcastFilter, PodcastPatch, ReactionChange,
};
use crate::domain::ports::PodcastRepository;
use crate::domain::role::Permission;
use crate::domain::social::validate_comment;
use crate::domain::user::Caller;

#[derive(Clone)]
pub struct PodcastService {
    repo: Arc<dyn PodcastRepository>,
}

impl PodcastService {
    pub fn new(repo: Arc<dyn PodcastRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, caller: &Caller, podcast: NewPodcast) -> Result<Podcast, DomainError> {
        caller.require(Permission::ManagePodcasts)?;
        podcast.validate()?;
        self.repo.create(caller.id, podcast)
    }

    pub fn list(&self, filter: &PodcastFilter, page: PageRequest) -> Result<Page<Podcast>, DomainError> {
        self.repo.list(filter, page)
    }

    /// Fetching a single podcast counts as a view.
    pub fn view(&self, id: Uuid) -> Result<Podcast, DomainError> {
        self.repo.view(id)?.ok_or(DomainError::NotFound("Podcast"))
    }

    pub fn update(&self, caller: &Caller, id: Uuid, patch: PodcastPatch) -> Result<Podcast, DomainError> {
        caller.require(Permission::ManagePodcasts)?;
        patch.validate()?;
        self.repo
            .update(id, patch)?
            .ok_or(DomainError::NotFound("Podcast"))
    }

    pub fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        caller.require(Permission::ManagePodcasts)?;
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Podcast"));
        }
        Ok(())
    }

    pub fn react(&self, user_id: Uuid, podcast_id: Uuid, is_liked: bool) -> Result<ReactionChange, DomainError> {
        self.repo.react(user_id, podcast_id, is_liked)
    }

    pub fn comments(&self, podcast_id: Uuid) -> Result<Vec<PodcastComment>, DomainError> {
        self.repo.comments(podcast_id)
    }

    pub fn add_comment(&self, user_id: Uuid, podcast_id: Uuid, content: &str) -> Result<PodcastComment, DomainError> {
        let content = validate_comment(content)?;
        self.repo.add_comment(user_id, podcast_id, &content)
    }

    pub fn delete_comment(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        let comment = self
            .repo
            .find_comment(id)?
            .ok_or(DomainError::NotFound("Comment"))?;
        caller.require_owner_or(comment.author.id, Permission::ModerateContent)?;
        self.repo.delete_comment(id)?;
        Ok(())
    }
}
