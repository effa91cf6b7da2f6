use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tenant_gate::app::{router, AppState};
use tenant_gate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH_JWT_SECRET, ADMIN_TENANT_ID, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        "Starting tenant gate in {:?} mode (locales: {}, default: {})",
        config.environment,
        config.locale.supported.join(","),
        config.locale.default_locale
    );
    if config.access.admin_tenant_id.is_none() {
        tracing::warn!("ADMIN_TENANT_ID not set; admin routes will be forbidden for everyone");
    }

    let port = config.server.port;
    let state = AppState::from_config(config).context("failed to initialize collaborators")?;
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Tenant gate listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
