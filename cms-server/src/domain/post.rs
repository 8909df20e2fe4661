use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
    Archived,
}

impl PostStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(PostStatus::Draft),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            _ => Err(DomainError::Validation {
                field: "status",
                message: "must be one of draft, scheduled, published, archived",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Visibility {
    #[default]
    Public,
    Private,
    Unlisted,
}

impl Visibility {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        }
    }
}

impl FromStr for Visibility {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            _ => Err(DomainError::Validation {
                field: "visibility",
                message: "must be one of public, private, unlisted",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeaturedImage {
    pub(crate) url: String,
    pub(crate) alt: Option<String>,
    pub(crate) caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeoMeta {
    pub(crate) meta_title: Option<String>,
    pub(crate) meta_description: Option<String>,
    #[serde(default)]
    pub(crate) keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Like {
    pub(crate) user_id: i64,
    pub(crate) liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) author_id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Vec<String>,
    pub(crate) featured_image: Option<FeaturedImage>,
    pub(crate) seo: Option<SeoMeta>,
    pub(crate) status: PostStatus,
    pub(crate) visibility: Visibility,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_for: Option<DateTime<Utc>>,
    pub(crate) view_count: u64,
    pub(crate) likes: Vec<Like>,
    pub(crate) read_time: u32,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub(crate) fn is_liked_by(&self, user_id: i64) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }

    pub(crate) fn is_draft(&self) -> bool {
        self.status == PostStatus::Draft
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Vec<String>,
    pub(crate) featured_image: Option<FeaturedImage>,
    pub(crate) seo: Option<SeoMeta>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) visibility: Option<Visibility>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            slug: self
                .slug
                .map(|slug| slug.trim().to_string())
                .filter(|slug| !slug.is_empty()),
            excerpt: normalize_optional_text(self.excerpt),
            tags: normalize_tags(self.tags),
            ..self
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) featured_image: Option<FeaturedImage>,
    pub(crate) seo: Option<SeoMeta>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) visibility: Option<Visibility>,
}

impl UpdatePostRequest {
    pub(crate) fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.category_id.is_none()
            && self.tags.is_none()
            && self.featured_image.is_none()
            && self.seo.is_none()
            && self.status.is_none()
            && self.visibility.is_none()
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::Validation {
                field: "body",
                message: "at least one field must be provided",
            });
        }

        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
            excerpt: self.excerpt.map(|excerpt| excerpt.trim().to_string()),
            tags: self.tags.map(normalize_tags),
            ..self
        })
    }
}

/// Estimated reading time in whole minutes.
pub(crate) fn read_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Lowercases, trims and de-duplicates tags while keeping first-seen order.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation {
            field: "title",
            message: "must not be empty",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
