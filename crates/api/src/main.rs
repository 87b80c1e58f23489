use anyhow::Context;

use pvtrack_infra::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pvtrack_observability::init();

    let config = ApiConfig::from_env()?;
    if config.seed_file.is_none() {
        tracing::warn!("PVTRACK_SEED_FILE not set; starting with an empty installation store");
    }

    let services = pvtrack_api::app::services::build_services(config.seed_file.as_deref())?;
    let app = pvtrack_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
