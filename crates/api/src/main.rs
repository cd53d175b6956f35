use anyhow::Context;

use placemate_api::{ApiConfig, AppServices, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    placemate_observability::init();

    let config = ApiConfig::from_env()?;
    let services = AppServices::from_config(&config)?;
    if services.users.is_empty() {
        tracing::warn!("user directory is empty; only self-registered students can sign in");
    }

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
