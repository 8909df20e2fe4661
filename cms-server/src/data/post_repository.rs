use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{FeaturedImage, Post, PostStatus, SeoMeta, Visibility};
use crate::domain::query::{Page, PostQuery};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
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
    pub(crate) read_time: u32,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) read_time: Option<u32>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) featured_image: Option<FeaturedImage>,
    pub(crate) seo: Option<SeoMeta>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewCountOutcome {
    Incremented,
    PostMissing,
    StoreFailed,
}

/// Result of a guarded like/unlike.
///
/// `Unchanged` means the guard did not hold: the user already liked the post
/// (add) or had not liked it (remove). `PostMissing` covers a post removed
/// between the caller's existence check and the guarded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikeOutcome {
    Applied,
    Unchanged,
    PostMissing,
    StoreFailed,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;
    /// Never fails: store errors are logged and yield an empty page.
    async fn find_all(&self, query: &PostQuery) -> Page<Post>;
    async fn update_by_id(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    /// `false` when nothing was deleted, including on store errors.
    async fn delete_by_id(&self, id: i64) -> bool;
    async fn increment_view_count(&self, id: i64) -> ViewCountOutcome;
    async fn add_like(&self, post_id: i64, user_id: i64) -> LikeOutcome;
    async fn remove_like(&self, post_id: i64, user_id: i64) -> LikeOutcome;
    async fn schedule(
        &self,
        post_id: i64,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError>;
    /// Only applies to posts that are not already published; `None` otherwise.
    async fn publish(&self, post_id: i64) -> Result<Option<Post>, DomainError>;
    async fn archive(&self, post_id: i64) -> Result<Option<Post>, DomainError>;
}
