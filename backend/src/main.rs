use backend::{config::ServerConfig, create_router, AppState};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let state = AppState::from_config(&config.upstream)?;
    if state.resolver.has_api_key() {
        tracing::info!("directions api key configured, routes will follow roads");
    } else {
        tracing::warn!("no directions api key, routes will use straight lines between waypoints");
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("starting backend on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
