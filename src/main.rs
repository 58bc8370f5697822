//! Application entry point and server initialization
//!
//! Loads configuration, opens the database and serves the API until a
//! shutdown signal arrives.

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;

use short_url::alias::AliasGenerator;
use short_url::config::Config;
use short_url::database::{AppState, RedbStorage};
use short_url::logging;
use short_url::route::{create_app, with_layers};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            std::process::exit(1);
        }
    };

    logging::init(config.env);
    tracing::info!(env = ?config.env, "starting url-shortener");
    tracing::debug!("debug messages are enabled");

    let storage = match RedbStorage::open(&config.database_url) {
        Ok(storage) => storage,
        Err(err) => {
            tracing::error!(error = %err, path = %config.database_url, "failed to init storage");
            std::process::exit(1);
        }
    };

    let state = AppState {
        storage: Arc::new(storage),
        generator: Arc::new(AliasGenerator::from_os_rng()),
    };

    let app = with_layers(
        create_app(state, config.http.credentials()),
        config.http.timeout,
    );

    let listener = match TcpListener::bind(&config.http.address).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, address = %config.http.address, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %config.http.address, "starting server");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
    }

    tracing::info!("server stopped");
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received, stopping server");
}
