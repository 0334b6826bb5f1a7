use anyhow::Context;

use premier_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    premier_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = premier_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
