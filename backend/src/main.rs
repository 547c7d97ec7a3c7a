//! VivaCripto portal server: server-rendered pages, the JSON endpoints used
//! by "load more" and search, revalidation, and the sitemap.

mod handlers;
mod institutional;
mod markdown;
mod pages;
mod request_context;
mod routes;
mod seo;
mod state;

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use vivacripto_shared::PortalConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());

    let config = PortalConfig::from_env();
    tracing::info!("Starting VivaCripto portal");
    tracing::info!("Content API: {}", config.content_api.base_url);
    tracing::info!("Site URL: {}", config.site.base_url);
    if config.revalidate_secret.is_none() {
        tracing::warn!("REVALIDATE_SECRET is not set; /api/revalidate will answer 500");
    }

    let app_state = state::AppState::new(config)?;
    let app = routes::create_router(app_state);

    let addr = format!("{}:{}", bind_addr, port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
