use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use health_food_api::api::handlers::initialize_server_start_time;
use health_food_api::{create_app, AppState, ServerConfig};
use health_food_data::database::{initialize_database_pool, seed_foods_from_csv};
use health_food_domain::config::AppConfig;

/// The main entry point for the HealthFood API server
///
/// Loads `.env`, sets up logging, opens and migrates the database, seeds the
/// food catalogue, makes sure an administrator exists and serves until
/// Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting HealthFood API server");

    let server = ServerConfig::from_env();
    let pool = initialize_database_pool().context("failed to open the database")?;

    if let Err(e) = seed_foods_from_csv(&pool, &server.seed_foods_csv) {
        warn!("Food seeding failed: {}", e);
    }

    let config = AppConfig::from_env();
    let state = AppState::new(pool, &config);

    if state
        .services
        .accounts
        .ensure_default_admin(&config.admin)
        .await
        .context("failed to create the default administrator")?
    {
        info!("Created default administrator {}", config.admin.email);
    }

    initialize_server_start_time();
    let app = create_app(state, &server);

    let addr = SocketAddr::from(([0, 0, 0, 0], server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
