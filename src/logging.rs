//! Tracing subscriber setup for the configured log profile

use tracing_subscriber::EnvFilter;

use crate::config::Env;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(env: Env) -> &'static str {
    match env {
        Env::Local | Env::Dev => "short_url=debug,tower_http=debug",
        Env::Prod => "short_url=info,tower_http=info",
    }
}

/// Installs the global subscriber: pretty output locally, JSON everywhere else
pub fn init(env: Env) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    match env {
        Env::Local => tracing_subscriber::fmt().with_env_filter(filter).init(),
        Env::Dev | Env::Prod => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .init(),
    }
}
