use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{DomainError, FieldErrors};
use super::page::Sort;
use super::user::UserSummary;

#[derive(Debug, Clone, Serialize)]
pub struct Podcast {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub cover_image: Option<String>,
    pub uploaded_by: Uuid,
    pub views: i32,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPodcast {
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub cover_image: Option<String>,
}

impl NewPodcast {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = FieldErrors::new();
        errors.require("title", Some(&self.title));
        errors.require("media_url", Some(&self.media_url));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PodcastPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub cover_image: Option<String>,
}

impl PodcastPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.require("title", Some(title));
        }
        if let Some(url) = &self.media_url {
            errors.require("media_url", Some(url));
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodcastSortField {
    Title,
    Views,
    CreatedAt,
}

impl FromStr for PodcastSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "views" => Ok(Self::Views),
            "created_at" => Ok(Self::CreatedAt),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PodcastFilter {
    pub search: Option<String>,
    pub sort: Sort<PodcastSortField>,
}

impl Default for PodcastFilter {
    fn default() -> Self {
        Self {
            search: None,
            sort: Sort::desc(PodcastSortField::CreatedAt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Removed,
    Switched,
}

impl ReactionChange {
    /// Repeating the stored reaction withdraws it; the opposite one replaces it.
    pub fn decide(existing: Option<bool>, is_liked: bool) -> Self {
        match existing {
            None => ReactionChange::Added,
            Some(current) if current == is_liked => ReactionChange::Removed,
            Some(_) => ReactionChange::Switched,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PodcastComment {
    pub id: Uuid,
    pub podcast_id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_toggle_rules() {
        assert_eq!(ReactionChange::decide(None, true), ReactionChange::Added);
        assert_eq!(ReactionChange::decide(Some(true), true), ReactionChange::Removed);
        assert_eq!(ReactionChange::decide(Some(false), true), ReactionChange::Switched);
    }

    #[test]
    fn podcast_needs_title_and_media() {
        let podcast = NewPodcast {
            title: " ".into(),
            description: None,
            media_url: String::new(),
            cover_image: None,
        };
        match podcast.validate() {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.contains("title"));
                assert!(errors.contains("media_url"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
