//! Initialization functions for tracing

use crate::error::{CoreError, CoreResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Build the filter: `RUST_LOG` wins, otherwise `level` for the lavacar
/// crates and `warn` for everything else.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,lavacar={level},lavacar_core={level},lavacar_http={level}"
        ))
    })
}

/// Install the global subscriber, writing to stderr
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(level: &str, format: LogFormat) -> CoreResult<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    let result = match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| CoreError::internal_error(format!("failed to install subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_cleanly() {
        let _ = init_tracing("debug", LogFormat::Pretty);
        assert!(init_tracing("debug", LogFormat::Json).is_err());
    }
}
