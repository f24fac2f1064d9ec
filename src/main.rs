use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use marquee_api::config::Config;
use marquee_api::routes::create_router;
use marquee_api::services::auth::TokenSigner;
use marquee_api::services::description::OpenAiGenerator;
use marquee_api::state::AppState;
use marquee_api::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let generator = Arc::new(OpenAiGenerator::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        Duration::from_secs(config.ai_timeout_secs),
    ));

    let tokens = TokenSigner::new(&config.jwt_secret, config.token_ttl_hours);
    let state = AppState::new(store, generator, tokens);

    let app = create_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
