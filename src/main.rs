use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use scholarly::logging::init_tracing;
use scholarly::metrics::init_metrics;
use scholarly::router::init_router;
use scholarly::state::init_app_state;
use scholarly_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;
    let metrics_handle = init_metrics().context("Failed to install metrics recorder")?;

    let server_config = ServerConfig::from_env()?;
    let state = init_app_state().await?;
    let app = init_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(server_config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.addr))?;

    info!(addr = %server_config.addr, "Server listening");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
