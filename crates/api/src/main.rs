use anyhow::Context;

use formgate_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    formgate_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = formgate_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let addr = listener.local_addr()?;
    tracing::info!(
        addr = %addr,
        skew_secs = config.verifier.skew().num_seconds(),
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
