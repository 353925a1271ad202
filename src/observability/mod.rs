//! # Observability Infrastructure
//!
//! Structured logging for the turnstile service via the tracing ecosystem.
//! Request handling and repository methods are instrumented with
//! `#[instrument]` spans; this module wires up the subscriber that renders
//! them.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// The filter honors `RUST_LOG` when set and falls back to the configured
/// log level otherwise. With `json_logging` enabled, log lines are emitted
/// as structured JSON suitable for log aggregation.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", "turnstile", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(tracing_subscriber::fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    // A subscriber may already be installed when tests initialize logging
    // more than once; that is not a startup failure.
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.to_string().contains("already been set") => Ok(()),
        Err(err) => Err(Error::internal(format!("Failed to initialize tracing: {}", err))),
    }
}

/// Log effective configuration at startup.
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        database_url = %config.database.url,
        token_ttl_seconds = config.auth.token_ttl_seconds,
        json_logging = config.observability.json_logging,
        "turnstile configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        let config = ObservabilityConfig::default();
        assert!(init_tracing(&config).is_ok());
        // Second call must not fail even though a subscriber is installed.
        assert!(init_tracing(&config).is_ok());
    }
}
