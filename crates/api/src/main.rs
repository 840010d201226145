//! Slated server entry point.

use std::sync::Arc;

use anyhow::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slated_api::routes;
use slated_api::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments configure the environment directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = slated_infra::config::load().context("configuration is invalid")?;
    let port = config.server.port;

    let ctx = Arc::new(AppContext::build(config).context("failed to build application")?);
    let app = routes::router(ctx);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    info!(port, "slated server running");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
