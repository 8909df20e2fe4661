use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{error, warn};

use crate::data::post_repository::{LikeOutcome, NewPost, PostPatch, PostRepository, ViewCountOutcome};
use crate::domain::error::DomainError;
use crate::domain::post::{FeaturedImage, Like, Post, SeoMeta};
use crate::domain::query::{Page, PageInfo, PostQuery, SortField, SortOrder};

const POST_COLUMNS: &str = "id, slug, title, content, excerpt, author_id, category_id, tags, \
     featured_image, seo, status, visibility, published_at, scheduled_for, view_count, likes, \
     read_time, created_at, updated_at";

const LIST_FILTER: &str = "($1::text IS NULL OR search_vector @@ plainto_tsquery('simple', $1)) \
     AND ($2::text IS NULL OR status = $2)";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, predicate: &str, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE {predicate}");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn post_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Runs a guarded like update and classifies a zero-row result.
    async fn guarded_like_update(&self, sql: &str, post_id: i64, user_id: i64) -> LikeOutcome {
        let result = sqlx::query(sql)
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => LikeOutcome::Applied,
            Ok(_) => match self.post_exists(post_id).await {
                Ok(true) => LikeOutcome::Unchanged,
                Ok(false) => LikeOutcome::PostMissing,
                Err(err) => {
                    error!(post_id, error = %err, "post existence check failed");
                    LikeOutcome::StoreFailed
                }
            },
            Err(err) => {
                error!(post_id, user_id, error = %err, "like update failed");
                LikeOutcome::StoreFailed
            }
        }
    }

    async fn try_find_all(&self, query: &PostQuery) -> Result<Page<Post>, sqlx::Error> {
        let search = query.search_term();
        let status = query.status.map(|status| status.as_str());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM posts WHERE {LIST_FILTER}"
        ))
        .bind(search)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let direction = sort_direction(query.sort_order);
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE {LIST_FILTER} \
             ORDER BY {column} {direction} NULLS LAST, id {direction} \
             LIMIT $3 OFFSET $4",
            column = sort_column(query.sort_by),
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(search)
            .bind(status)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match Post::try_from(row) {
                Ok(post) => items.push(post),
                Err(err) => warn!(error = %err, "skipping unreadable post row"),
            }
        }

        Ok(Page {
            items,
            pagination: PageInfo::new(query.page, query.limit, total.max(0) as u64),
        })
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    slug: String,
    title: String,
    content: String,
    excerpt: Option<String>,
    author_id: i64,
    category_id: Option<i64>,
    tags: Vec<String>,
    featured_image: Option<Json<FeaturedImage>>,
    seo: Option<Json<SeoMeta>>,
    status: String,
    visibility: String,
    published_at: Option<DateTime<Utc>>,
    scheduled_for: Option<DateTime<Utc>>,
    view_count: i64,
    likes: Json<Vec<Like>>,
    read_time: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let unexpected =
            move |err: &dyn std::fmt::Display| DomainError::Unexpected(format!("post {id}: {err}"));

        let status = row.status.parse().map_err(|err| unexpected(&err))?;
        let visibility = row.visibility.parse().map_err(|err| unexpected(&err))?;
        let view_count = u64::try_from(row.view_count).map_err(|err| unexpected(&err))?;
        let read_time = u32::try_from(row.read_time).map_err(|err| unexpected(&err))?;

        Ok(Post {
            id: row.id,
            slug: row.slug,
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            author_id: row.author_id,
            category_id: row.category_id,
            tags: row.tags,
            featured_image: row.featured_image.map(|Json(image)| image),
            seo: row.seo.map(|Json(seo)| seo),
            status,
            visibility,
            published_at: row.published_at,
            scheduled_for: row.scheduled_for,
            view_count,
            likes: row.likes.0,
            read_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO posts (
                slug, title, content, excerpt, author_id, category_id, tags,
                featured_image, seo, status, visibility, read_time, published_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                CASE WHEN $10 = 'published' THEN NOW() END
            )
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.excerpt)
            .bind(input.author_id)
            .bind(input.category_id)
            .bind(&input.tags)
            .bind(input.featured_image.map(Json))
            .bind(input.seo.map(Json))
            .bind(input.status.as_str())
            .bind(input.visibility.as_str())
            .bind(read_time_column(input.read_time))
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Post::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.fetch_one_where("id = $1", id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn find_all(&self, query: &PostQuery) -> Page<Post> {
        match self.try_find_all(query).await {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "listing posts failed");
                Page::empty(query)
            }
        }
    }

    async fn update_by_id(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                read_time = COALESCE($4, read_time),
                excerpt = COALESCE($5, excerpt),
                category_id = COALESCE($6, category_id),
                tags = COALESCE($7, tags),
                featured_image = COALESCE($8, featured_image),
                seo = COALESCE($9, seo),
                status = COALESCE($10, status),
                visibility = COALESCE($11, visibility),
                published_at = CASE
                    WHEN $10 = 'published' AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .bind(patch.read_time.map(read_time_column))
            .bind(patch.excerpt)
            .bind(patch.category_id)
            .bind(patch.tags)
            .bind(patch.featured_image.map(Json))
            .bind(patch.seo.map(Json))
            .bind(patch.status.map(|status| status.as_str()))
            .bind(patch.visibility.map(|visibility| visibility.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn delete_by_id(&self, id: i64) -> bool {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => done.rows_affected() > 0,
            Err(err) => {
                error!(post_id = id, error = %err, "post delete failed");
                false
            }
        }
    }

    async fn increment_view_count(&self, id: i64) -> ViewCountOutcome {
        let result = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => ViewCountOutcome::Incremented,
            Ok(_) => ViewCountOutcome::PostMissing,
            Err(err) => {
                error!(post_id = id, error = %err, "view count increment failed");
                ViewCountOutcome::StoreFailed
            }
        }
    }

    async fn add_like(&self, post_id: i64, user_id: i64) -> LikeOutcome {
        self.guarded_like_update(
            r#"
            UPDATE posts
            SET likes = likes || jsonb_build_array(
                jsonb_build_object('userId', $2::bigint, 'likedAt', NOW())
            )
            WHERE id = $1
              AND NOT likes @> jsonb_build_array(jsonb_build_object('userId', $2::bigint))
            "#,
            post_id,
            user_id,
        )
        .await
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> LikeOutcome {
        self.guarded_like_update(
            r#"
            UPDATE posts
            SET likes = COALESCE(
                (
                    SELECT jsonb_agg(entry)
                    FROM jsonb_array_elements(likes) AS entry
                    WHERE (entry ->> 'userId')::bigint <> $2
                ),
                '[]'::jsonb
            )
            WHERE id = $1
              AND likes @> jsonb_build_array(jsonb_build_object('userId', $2::bigint))
            "#,
            post_id,
            user_id,
        )
        .await
    }

    async fn schedule(
        &self,
        post_id: i64,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET status = 'scheduled',
                scheduled_for = $2,
                updated_at = NOW()
            WHERE id = $1 AND status <> 'archived'
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(scheduled_for)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn publish(&self, post_id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET status = 'published',
                published_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('published', 'archived')
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn archive(&self, post_id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET status = 'archived',
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::PublishedAt => "published_at",
        SortField::Title => "title",
        SortField::ViewCount => "view_count",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn read_time_column(minutes: u32) -> i32 {
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("posts_slug_key") => "slug",
            _ => "post",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    error!(error = %err, "post store query failed");
    DomainError::Unexpected(err.to_string())
}
