use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::posts::{
    CreatePostDto, FeaturedImageDto, LikeDto, ListPostsParams, ListPostsResponseDto,
    PaginationDto, PostDto, ScheduleDto, SeoDto, UpdatePostDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::get_post_by_slug,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::schedule_post,
        crate::presentation::http::handlers::posts::publish_post,
        crate::presentation::http::handlers::posts::archive_post,
        crate::presentation::http::handlers::posts::record_view,
        crate::presentation::http::handlers::posts::like_post,
        crate::presentation::http::handlers::posts::unlike_post
    ),
    components(
        schemas(
            CreatePostDto,
            UpdatePostDto,
            ScheduleDto,
            ListPostsParams,
            FeaturedImageDto,
            SeoDto,
            LikeDto,
            PostDto,
            PaginationDto,
            ListPostsResponseDto
        )
    ),
    tags(
        (name = "posts", description = "Post content endpoints"),
        (name = "lifecycle", description = "Schedule, publish and archive transitions"),
        (name = "engagement", description = "View counting and likes")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_lifecycle_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/posts",
            "/api/posts/{id}",
            "/api/posts/slug/{slug}",
            "/api/posts/{id}/schedule",
            "/api/posts/{id}/publish",
            "/api/posts/{id}/archive",
            "/api/posts/{id}/views",
            "/api/posts/{id}/likes",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }

        let components = doc.components.expect("components must be present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
