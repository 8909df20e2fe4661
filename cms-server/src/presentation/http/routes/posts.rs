use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    archive_post, create_post, delete_post, get_post, get_post_by_slug, like_post, list_posts,
    publish_post, record_view, schedule_post, unlike_post, update_post,
};
use crate::presentation::http::middleware::auth::identify_caller;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/slug/{slug}", get(get_post_by_slug))
        .route(
            "/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/{id}/schedule", post(schedule_post))
        .route("/{id}/publish", post(publish_post))
        .route("/{id}/archive", post(archive_post))
        .route("/{id}/views", post(record_view))
        .route("/{id}/likes", post(like_post).delete(unlike_post))
        .layer(middleware::from_fn_with_state(state, identify_caller))
}
