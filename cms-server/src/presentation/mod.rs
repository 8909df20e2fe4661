use sqlx::PgPool;
use std::sync::Arc;

use crate::application::post_service::PostService;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::infrastructure::jwt::JwtVerifier;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) post_service: Arc<PostService<PostgresPostRepository>>,
    pub(crate) jwt: Arc<JwtVerifier>,
    pub(crate) max_page_size: u32,
}

impl AppState {
    pub(crate) fn new(
        pool: PgPool,
        post_service: Arc<PostService<PostgresPostRepository>>,
        jwt: Arc<JwtVerifier>,
        max_page_size: u32,
    ) -> Self {
        Self {
            pool,
            post_service,
            jwt,
            max_page_size,
        }
    }
}
