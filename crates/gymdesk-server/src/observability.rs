//! Tracing subscriber setup.

use gymdesk_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

use crate::error::{ServerError, ServerResult};

/// Builds the event filter. `RUST_LOG` takes precedence over the configured
/// directive.
pub fn build_filter(config: &LoggingConfig) -> ServerResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| ServerError::Logging(format!("invalid filter '{}': {e}", config.filter))),
    }
}

/// Installs the global `fmt` subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> ServerResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| ServerError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_is_accepted() {
        let config = LoggingConfig {
            filter: "info,gymdesk_rbac=debug".to_string(),
            format: LogFormat::Compact,
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(
            init_tracing(&config),
            Err(ServerError::Logging(_))
        ));
    }
}
