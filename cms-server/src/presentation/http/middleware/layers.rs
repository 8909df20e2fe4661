use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub(crate) fn apply_trace(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}

/// Caps request bodies and the number of requests served at once.
pub(crate) fn apply_limits(router: Router, body_limit_bytes: usize, concurrency: usize) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(ConcurrencyLimitLayer::new(concurrency))
}
