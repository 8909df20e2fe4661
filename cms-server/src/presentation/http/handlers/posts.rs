use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::application::post_service::ListPostsQuery;
use crate::domain::post::{
    CreatePostRequest, FeaturedImage, Like, Post, PostStatus, SeoMeta, UpdatePostRequest,
    Visibility,
};
use crate::domain::query::{Page, PageInfo, SortField, SortOrder};
use crate::domain::slug::is_valid_slug;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeaturedImageDto {
    #[validate(url)]
    pub(crate) url: String,
    #[validate(length(max = 200))]
    pub(crate) alt: Option<String>,
    #[validate(length(max = 300))]
    pub(crate) caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeoDto {
    #[validate(length(max = 70))]
    pub(crate) meta_title: Option<String>,
    #[validate(length(max = 160))]
    pub(crate) meta_description: Option<String>,
    #[serde(default)]
    pub(crate) keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 10, max = 200))]
    pub(crate) title: String,
    #[validate(length(min = 100))]
    pub(crate) content: String,
    #[validate(custom(function = "validate_slug"))]
    pub(crate) slug: Option<String>,
    #[validate(length(max = 300))]
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[validate(nested)]
    pub(crate) featured_image: Option<FeaturedImageDto>,
    #[validate(nested)]
    pub(crate) seo: Option<SeoDto>,
    #[schema(value_type = Option<String>, example = "draft")]
    pub(crate) status: Option<PostStatus>,
    #[schema(value_type = Option<String>, example = "public")]
    pub(crate) visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 10, max = 200))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 100))]
    pub(crate) content: Option<String>,
    #[validate(length(max = 300))]
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    #[validate(nested)]
    pub(crate) featured_image: Option<FeaturedImageDto>,
    #[validate(nested)]
    pub(crate) seo: Option<SeoDto>,
    #[schema(value_type = Option<String>)]
    pub(crate) status: Option<PostStatus>,
    #[schema(value_type = Option<String>)]
    pub(crate) visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScheduleDto {
    pub(crate) scheduled_for: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPostsParams {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1))]
    pub(crate) limit: Option<u32>,
    pub(crate) search: Option<String>,
    #[schema(value_type = Option<String>)]
    pub(crate) sort_by: Option<SortField>,
    #[schema(value_type = Option<String>)]
    pub(crate) sort_order: Option<SortOrder>,
    #[schema(value_type = Option<String>)]
    pub(crate) status: Option<PostStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DraftAccessParams {
    pub(crate) include_drafts: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikeDto {
    pub(crate) user_id: i64,
    pub(crate) liked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) author_id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Vec<String>,
    pub(crate) featured_image: Option<FeaturedImageDto>,
    pub(crate) seo: Option<SeoDto>,
    #[schema(value_type = String)]
    pub(crate) status: PostStatus,
    #[schema(value_type = String)]
    pub(crate) visibility: Visibility,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_for: Option<DateTime<Utc>>,
    pub(crate) view_count: u64,
    pub(crate) like_count: usize,
    pub(crate) likes: Vec<LikeDto>,
    pub(crate) read_time: u32,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationDto {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total: u64,
    pub(crate) total_pages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) items: Vec<PostDto>,
    pub(crate) pagination: PaginationDto,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

impl From<FeaturedImageDto> for FeaturedImage {
    fn from(dto: FeaturedImageDto) -> Self {
        Self {
            url: dto.url,
            alt: dto.alt,
            caption: dto.caption,
        }
    }
}

impl From<FeaturedImage> for FeaturedImageDto {
    fn from(image: FeaturedImage) -> Self {
        Self {
            url: image.url,
            alt: image.alt,
            caption: image.caption,
        }
    }
}

impl From<SeoDto> for SeoMeta {
    fn from(dto: SeoDto) -> Self {
        Self {
            meta_title: dto.meta_title,
            meta_description: dto.meta_description,
            keywords: dto.keywords,
        }
    }
}

impl From<SeoMeta> for SeoDto {
    fn from(seo: SeoMeta) -> Self {
        Self {
            meta_title: seo.meta_title,
            meta_description: seo.meta_description,
            keywords: seo.keywords,
        }
    }
}

impl From<Like> for LikeDto {
    fn from(like: Like) -> Self {
        Self {
            user_id: like.user_id,
            liked_at: like.liked_at,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            like_count: post.like_count(),
            id: post.id,
            slug: post.slug,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            author_id: post.author_id,
            category_id: post.category_id,
            tags: post.tags,
            featured_image: post.featured_image.map(FeaturedImageDto::from),
            seo: post.seo.map(SeoDto::from),
            status: post.status,
            visibility: post.visibility,
            published_at: post.published_at,
            scheduled_for: post.scheduled_for,
            view_count: post.view_count,
            likes: post.likes.into_iter().map(LikeDto::from).collect(),
            read_time: post.read_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PageInfo> for PaginationDto {
    fn from(info: PageInfo) -> Self {
        Self {
            page: info.page,
            limit: info.limit,
            total: info.total,
            total_pages: info.total_pages,
        }
    }
}

impl From<Page<Post>> for ListPostsResponseDto {
    fn from(page: Page<Post>) -> Self {
        Self {
            items: page.items.into_iter().map(PostDto::from).collect(),
            pagination: page.pagination.into(),
        }
    }
}

impl From<CreatePostDto> for CreatePostRequest {
    fn from(dto: CreatePostDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            slug: dto.slug,
            excerpt: dto.excerpt,
            category_id: dto.category_id,
            tags: dto.tags,
            featured_image: dto.featured_image.map(FeaturedImage::from),
            seo: dto.seo.map(SeoMeta::from),
            status: dto.status,
            visibility: dto.visibility,
        }
    }
}

impl From<UpdatePostDto> for UpdatePostRequest {
    fn from(dto: UpdatePostDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            excerpt: dto.excerpt,
            category_id: dto.category_id,
            tags: dto.tags,
            featured_image: dto.featured_image.map(FeaturedImage::from),
            seo: dto.seo.map(SeoMeta::from),
            status: dto.status,
            visibility: dto.visibility,
        }
    }
}

fn include_drafts(params: &DraftAccessParams, caller: Option<&AuthenticatedUser>) -> bool {
    caller.is_some() && params.include_drafts.unwrap_or(false)
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number (>= 1)"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("search" = Option<String>, Query, description = "Text search term"),
        ("sortBy" = Option<String>, Query, description = "createdAt | updatedAt | publishedAt | title | viewCount"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc"),
        ("status" = Option<String>, Query, description = "Lifecycle status filter")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListPostsParams>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    params.validate()?;
    if params.limit.is_some_and(|limit| limit > state.max_page_size) {
        return Err(AppError::BadRequest(format!(
            "limit must be in 1..={}",
            state.max_page_size
        )));
    }

    let query = ListPostsQuery {
        page: params.page,
        limit: params.limit,
        search: params.search,
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        status: params.status,
    };
    let page = state.post_service.list_posts(query).await;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(page))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id"),
        ("includeDrafts" = Option<bool>, Query, description = "Return drafts to identified callers")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 403, description = "Post is a draft"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    caller: Option<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
    AppQuery(params): AppQuery<DraftAccessParams>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state
        .post_service
        .get_post(id, include_drafts(&params, caller.as_ref()))
        .await?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/api/posts/slug/{slug}",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Post slug"),
        ("includeDrafts" = Option<bool>, Query, description = "Return drafts to identified callers")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 403, description = "Post is a draft"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post_by_slug(
    State(state): State<AppState>,
    caller: Option<AuthenticatedUser>,
    AppPath(slug): AppPath<String>,
    AppQuery(params): AppQuery<DraftAccessParams>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state
        .post_service
        .get_post_by_slug(&slug, include_drafts(&params, caller.as_ref()))
        .await?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    caller: Option<AuthenticatedUser>,
    AppJson(dto): AppJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state
        .post_service
        .create_post(caller.map(|user| user.user_id), dto.into())
        .await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    patch,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state.post_service.update_post(id, dto.into()).await?;
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/schedule",
    tag = "lifecycle",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = ScheduleDto,
    responses(
        (status = 200, description = "Post scheduled", body = PostDto),
        (status = 400, description = "Date is not in the future"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn schedule_post(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<ScheduleDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state
        .post_service
        .schedule_post(id, dto.scheduled_for)
        .await?;
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/publish",
    tag = "lifecycle",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post published", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Post already published"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn publish_post(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state.post_service.publish_post(id).await?;
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/archive",
    tag = "lifecycle",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post archived", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn archive_post(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state.post_service.archive_post(id).await?;
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/views",
    tag = "engagement",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "View recorded"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn record_view(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.post_service.record_view(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/likes",
    tag = "engagement",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post liked"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Post already liked"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn like_post(
    State(state): State<AppState>,
    caller: Option<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .add_like(caller.map(|user| user.user_id), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/likes",
    tag = "engagement",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Like removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Post not liked"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn unlike_post(
    State(state): State<AppState>,
    caller: Option<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .remove_like(caller.map(|user| user.user_id), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
