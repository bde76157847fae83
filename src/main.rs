use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hockey_schedule_web::config::Config;
use hockey_schedule_web::routes::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with tracing
    let _ = tracing_subscriber::fmt()
        .json()
        .with_current_span(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(false)
        .try_init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    if config.teamsnap_client_id.is_empty() {
        warn!("TEAMSNAP_CLIENT_ID is not set; TeamSnap will reject requests");
    }
    info!(
        root_division_id = config.root_division_id,
        time_zone = %config.time_zone,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Loaded configuration"
    );

    let router = routes::build_router(AppState::new(&config));
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
