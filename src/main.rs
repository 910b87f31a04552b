//! Asteroids Arena Server - main entry point
//!
//! Starts the simulation loop, liveness sweeps and the TCP accept loop,
//! then runs until a shutdown signal arrives.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asteroids_server::app::AppState;
use asteroids_server::config::Config;
use asteroids_server::{game, net};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Asteroids Arena Server");
    info!("Server address: {}", config.server_addr);

    // Create application state
    let state = AppState::new(config);

    // Spawn the simulation loop and liveness sweeps
    tokio::spawn(game::engine::run(state.clone()));
    tokio::spawn(net::liveness::run_idle_sweep(state.clone()));
    tokio::spawn(net::liveness::run_heartbeat_sweep(state.clone()));

    // Start accepting connections
    let listener = TcpListener::bind(state.config.server_addr).await?;
    info!("Server listening on {}", state.config.server_addr);

    tokio::select! {
        _ = net::listener::serve(state.clone(), listener) => {}
        _ = shutdown_signal() => {}
    }

    // Stop all loops and unblock pending socket I/O
    state.begin_shutdown();

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
