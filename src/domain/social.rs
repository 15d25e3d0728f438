use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Image,
    Reel,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Image => "image",
            PostType::Reel => "reel",
        }
    }
}

impl FromStr for PostType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(PostType::Text),
            "image" => Ok(PostType::Image),
            "reel" => Ok(PostType::Reel),
            other => Err(DomainError::field(
                "post_type",
                format!("\"{}\" is not a valid choice.", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl FromStr for Privacy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            other => Err(DomainError::field(
                "privacy",
                format!("\"{}\" is not a valid choice.", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub author: UserSummary,
    pub caption: Option<String>,
    pub media_urls: Vec<String>,
    pub post_type: PostType,
    pub location: Option<String>,
    pub music: Option<String>,
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub caption: Option<String>,
    pub media_urls: Vec<String>,
    pub post_type: PostType,
    pub location: Option<String>,
    pub music: Option<String>,
    pub privacy: Privacy,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), DomainError> {
        let has_caption = self
            .caption
            .as_deref()
            .map_or(false, |c| !c.trim().is_empty());
        if !has_caption && self.media_urls.is_empty() {
            return Err(DomainError::InvalidInput(
                "A post needs a caption or at least one media URL".to_string(),
            ));
        }
        if self.post_type != PostType::Text && self.media_urls.is_empty() {
            return Err(DomainError::field(
                "media_urls",
                format!("A {} post requires media.", self.post_type.as_str()),
            ));
        }
        Ok(())
    }
}

/// Author edits; `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub caption: Option<String>,
    pub media_urls: Option<Vec<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.media_urls.is_none()
    }

    /// The edited post must still satisfy the rules for a new one.
    pub fn validate_against(&self, current: &Post) -> Result<(), DomainError> {
        NewPost {
            caption: self.caption.clone().or_else(|| current.caption.clone()),
            media_urls: self
                .media_urls
                .clone()
                .unwrap_or_else(|| current.media_urls.clone()),
            post_type: current.post_type,
            location: None,
            music: None,
            privacy: current.privacy,
        }
        .validate()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Only this author's posts; when absent the viewer's own posts are hidden.
    pub user: Option<Uuid>,
    pub post_type: Option<PostType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}

/// Post owner details needed to notify them of activity.
#[derive(Debug, Clone)]
pub struct PostOwner {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub fcm_token: Option<String>,
    pub notify_on_like: bool,
    pub notify_on_comment: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowEntry {
    pub user: UserSummary,
    pub since: DateTime<Utc>,
}

pub fn validate_comment(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::field("content", "This field may not be blank."));
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(post_type: PostType, caption: Option<&str>, media: &[&str]) -> NewPost {
        NewPost {
            caption: caption.map(str::to_string),
            media_urls: media.iter().map(|m| m.to_string()).collect(),
            post_type,
            location: None,
            music: None,
            privacy: Privacy::Public,
        }
    }

    #[test]
    fn text_post_needs_caption() {
        assert!(post(PostType::Text, Some("hello"), &[]).validate().is_ok());
        assert!(post(PostType::Text, Some("  "), &[]).validate().is_err());
    }

    #[test]
    fn media_posts_need_media() {
        assert!(post(PostType::Reel, Some("watch"), &[]).validate().is_err());
        assert!(post(PostType::Image, None, &["https://cdn/x.png"])
            .validate()
            .is_ok());
    }

    #[test]
    fn edits_cannot_strip_a_post_bare() {
        let image = Post {
            id: Uuid::new_v4(),
            author: UserSummary {
                id: Uuid::new_v4(),
                email: "a@example.com".to_string(),
                username: None,
                full_name: "A".to_string(),
                role: crate::domain::role::Role::Athlete,
                profile_picture: None,
            },
            caption: Some("race day".to_string()),
            media_urls: vec!["https://cdn/x.png".to_string()],
            post_type: PostType::Image,
            location: None,
            music: None,
            privacy: Privacy::Public,
            created_at: Utc::now(),
            likes_count: 0,
            comments_count: 0,
            is_liked: false,
        };

        let recaption = PostPatch {
            caption: Some("finish line".to_string()),
            media_urls: None,
        };
        assert!(recaption.validate_against(&image).is_ok());

        let drop_media = PostPatch {
            caption: None,
            media_urls: Some(vec![]),
        };
        assert!(matches!(
            drop_media.validate_against(&image),
            Err(DomainError::Validation(_))
        ));
        assert!(PostPatch::default().is_empty());
    }

    #[test]
    fn blank_comment_is_rejected() {
        assert!(validate_comment("   ").is_err());
        assert_eq!(validate_comment(" nice ").unwrap(), "nice");
    }

    #[test]
    fn parses_choices() {
        assert_eq!("reel".parse::<PostType>().unwrap(), PostType::Reel);
        assert!("video".parse::<PostType>().is_err());
        assert_eq!("private".parse::<Privacy>().unwrap(), Privacy::Private);
    }
}
