use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::data::post_repository::{LikeOutcome, NewPost, PostPatch, PostRepository, ViewCountOutcome};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, PostStatus, UpdatePostRequest, read_time_minutes};
use crate::domain::query::{Page, PostQuery, SortField, SortOrder};
use crate::domain::slug::slugify;

/// List parameters as supplied by a caller; unset values fall back to defaults.
#[derive(Debug, Clone, Default)]
pub(crate) struct ListPostsQuery {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) search: Option<String>,
    pub(crate) sort_by: Option<SortField>,
    pub(crate) sort_order: Option<SortOrder>,
    pub(crate) status: Option<PostStatus>,
}

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
    default_page_size: u32,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R, default_page_size: u32) -> Self {
        Self {
            repo,
            default_page_size: default_page_size.max(1),
        }
    }

    #[instrument(skip(self, req))]
    pub(crate) async fn create_post(
        &self,
        actor: Option<i64>,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let author_id = actor.ok_or(DomainError::Unauthorized)?;
        let req = req.validate()?;

        let slug = match req.slug {
            Some(slug) => slug,
            None => slugify(&req.title)?,
        };

        let new_post = NewPost {
            slug,
            read_time: read_time_minutes(&req.content),
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            author_id,
            category_id: req.category_id,
            tags: req.tags,
            featured_image: req.featured_image,
            seo: req.seo,
            status: req.status.unwrap_or_default(),
            visibility: req.visibility.unwrap_or_default(),
        };

        let post = self.repo.create_post(new_post).await.map_err(into_conflict)?;
        info!(post_id = post.id, slug = %post.slug, status = %post.status, "post created");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, id: i64, include_drafts: bool) -> Result<Post, DomainError> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;

        ensure_visible(post, include_drafts)
    }

    pub(crate) async fn get_post_by_slug(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<Post, DomainError> {
        let post = self
            .repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))?;

        ensure_visible(post, include_drafts)
    }

    pub(crate) async fn list_posts(&self, query: ListPostsQuery) -> Page<Post> {
        let mut resolved = PostQuery::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(self.default_page_size),
        );
        resolved.search = query.search.unwrap_or_default();
        resolved.sort_by = query.sort_by.unwrap_or_default();
        resolved.sort_order = query.sort_order.unwrap_or_default();
        resolved.status = query.status;

        self.repo.find_all(&resolved).await
    }

    #[instrument(skip(self, req))]
    pub(crate) async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let patch = PostPatch {
            read_time: req.content.as_deref().map(read_time_minutes),
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            category_id: req.category_id,
            tags: req.tags,
            featured_image: req.featured_image,
            seo: req.seo,
            status: req.status,
            visibility: req.visibility,
        };

        self.repo
            .update_by_id(id, patch)
            .await
            .map_err(into_conflict)?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    #[instrument(skip(self))]
    pub(crate) async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete_by_id(id).await {
            return Err(DomainError::post_not_found(id));
        }
        info!(post_id = id, "post deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn schedule_post(
        &self,
        id: i64,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        if scheduled_for <= Utc::now() {
            return Err(DomainError::Validation {
                field: "scheduledFor",
                message: "must be in the future",
            });
        }

        match self.repo.schedule(id, scheduled_for).await? {
            Some(post) => {
                info!(post_id = id, %scheduled_for, "post scheduled");
                Ok(post)
            }
            None => Err(self.rejected_transition(id).await),
        }
    }

    #[instrument(skip(self))]
    pub(crate) async fn publish_post(&self, id: i64) -> Result<Post, DomainError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;
        if let Some(err) = transition_conflict(&current, PostStatus::Published) {
            return Err(err);
        }

        match self.repo.publish(id).await? {
            Some(post) => {
                info!(post_id = id, "post published");
                Ok(post)
            }
            // lost a race: another transition won or the post was deleted
            None => Err(self.rejected_transition(id).await),
        }
    }

    #[instrument(skip(self))]
    pub(crate) async fn archive_post(&self, id: i64) -> Result<Post, DomainError> {
        let post = self
            .repo
            .archive(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;
        info!(post_id = id, "post archived");
        Ok(post)
    }

    pub(crate) async fn record_view(&self, id: i64) -> Result<(), DomainError> {
        match self.repo.increment_view_count(id).await {
            ViewCountOutcome::Incremented => Ok(()),
            ViewCountOutcome::PostMissing => Err(DomainError::post_not_found(id)),
            ViewCountOutcome::StoreFailed => Err(DomainError::Unexpected(format!(
                "failed to increment view count for post {id}"
            ))),
        }
    }

    #[instrument(skip(self))]
    pub(crate) async fn add_like(&self, actor: Option<i64>, post_id: i64) -> Result<(), DomainError> {
        let user_id = actor.ok_or(DomainError::Unauthorized)?;
        self.ensure_exists(post_id).await?;

        match self.repo.add_like(post_id, user_id).await {
            LikeOutcome::Applied => Ok(()),
            LikeOutcome::Unchanged => Err(DomainError::Conflict("post already liked".to_string())),
            outcome => Err(like_failure(post_id, outcome)),
        }
    }

    #[instrument(skip(self))]
    pub(crate) async fn remove_like(
        &self,
        actor: Option<i64>,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let user_id = actor.ok_or(DomainError::Unauthorized)?;
        self.ensure_exists(post_id).await?;

        match self.repo.remove_like(post_id, user_id).await {
            LikeOutcome::Applied => Ok(()),
            LikeOutcome::Unchanged => Err(DomainError::Conflict("post not liked".to_string())),
            outcome => Err(like_failure(post_id, outcome)),
        }
    }

    /// Explains why a guarded transition updated nothing.
    async fn rejected_transition(&self, id: i64) -> DomainError {
        match self.repo.find_by_id(id).await {
            Ok(Some(post)) if post.status == PostStatus::Archived => archived(id),
            Ok(Some(post)) if post.status == PostStatus::Published => already_published(id),
            Ok(Some(_)) => DomainError::Conflict(format!("post {id} changed concurrently")),
            Ok(None) => DomainError::post_not_found(id),
            Err(err) => err,
        }
    }

    async fn ensure_exists(&self, id: i64) -> Result<(), DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::post_not_found(id))
    }
}

fn ensure_visible(post: Post, include_drafts: bool) -> Result<Post, DomainError> {
    if post.is_draft() && !include_drafts {
        return Err(DomainError::Forbidden);
    }
    Ok(post)
}

fn already_published(id: i64) -> DomainError {
    DomainError::Conflict(format!("post {id} is already published"))
}

fn archived(id: i64) -> DomainError {
    DomainError::Conflict(format!("post {id} is archived"))
}

fn transition_conflict(current: &Post, target: PostStatus) -> Option<DomainError> {
    match current.status {
        PostStatus::Archived => Some(archived(current.id)),
        PostStatus::Published if target == PostStatus::Published => {
            Some(already_published(current.id))
        }
        _ => None,
    }
}

fn like_failure(post_id: i64, outcome: LikeOutcome) -> DomainError {
    match outcome {
        LikeOutcome::PostMissing => DomainError::post_not_found(post_id),
        _ => {
            warn!(post_id, ?outcome, "like mutation failed in store");
            DomainError::Unexpected(format!("like update failed for post {post_id}"))
        }
    }
}

fn into_conflict(err: DomainError) -> DomainError {
    match err {
        DomainError::AlreadyExists(resource) => {
            DomainError::Conflict(format!("{resource} already exists"))
        }
        other => other,
    }
}
