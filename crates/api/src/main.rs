use anyhow::Context;

use grocery_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grocery_observability::init();

    let config = ApiConfig::from_env()?;
    tracing::info!(?config, "starting grocery api");

    let app = grocery_api::app::build_app(&config)
        .await
        .context("failed to initialize registries")?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
