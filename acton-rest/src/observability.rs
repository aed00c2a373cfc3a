//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Error, error::Result};

/// Initialize JSON tracing output filtered by `service.log_level`
///
/// An unparseable level falls back to `info`. Calling this a second time
/// returns an error instead of replacing the installed subscriber.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.as_str();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialize tracing: {}", e)))?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let mut config = Config::default();
        config.service.log_level = "not a [valid filter".to_string();

        // Another test in this binary may have installed a subscriber first
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
