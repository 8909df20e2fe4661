use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::post_service::PostService;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtVerifier;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;
    info!(addr = %settings.http_addr, "starting cms-server");

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let post_repo = PostgresPostRepository::new(pool.clone());
    let post_service = Arc::new(PostService::new(post_repo, settings.default_page_size));
    let jwt = Arc::new(JwtVerifier::new(&settings.jwt_secret));

    let state = AppState::new(pool, post_service, jwt, settings.max_page_size);

    server::run_http(&settings, state).await
}
