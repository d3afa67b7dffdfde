use anyhow::Context;

use aesthetica_infra::CatalogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env()?;
    aesthetica_observability::init_with(config.log_format);

    let app = aesthetica_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        cache_policy = %config.cache_policy,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
