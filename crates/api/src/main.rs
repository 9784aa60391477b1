use hubs_api::{app::services::build_services, build_app, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    hubs_observability::tracing::init(&config.log_level);

    let services = build_services(&config).await?;
    let addr = config.bind_addr();
    let app = build_app(services, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
