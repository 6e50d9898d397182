//! Logging configuration for suite runs.
//!
//! Suites emit structured `tracing` events; this module configures how
//! they reach the outside world.

use tracing::Level;

/// Controls the verbosity of suite execution logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Log level for tabwatch components specifically
    pub tabwatch_level: Level,
    /// Whether to use JSON output format
    pub json_format: bool,
    /// Environment filter override
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            tabwatch_level: Level::DEBUG,
            json_format: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration for production use.
    pub fn production() -> Self {
        Self {
            level: Level::WARN,
            tabwatch_level: Level::INFO,
            json_format: true,
            env_filter: None,
        }
    }

    /// Creates a configuration for development use.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            tabwatch_level: Level::DEBUG,
            json_format: false,
            env_filter: None,
        }
    }

    /// Sets the log level for the application.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the log level for tabwatch components.
    pub fn with_tabwatch_level(mut self, level: Level) -> Self {
        self.tabwatch_level = level;
        self
    }

    /// Sets whether to use JSON output format.
    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Sets a custom environment filter.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Builds the environment filter string.
    pub fn env_filter(&self) -> String {
        if let Some(ref filter) = self.env_filter {
            filter.clone()
        } else {
            format!(
                "{},tabwatch={}",
                self.level.as_str().to_lowercase(),
                self.tabwatch_level.as_str().to_lowercase()
            )
        }
    }
}

/// Initializes global logging from the configuration.
///
/// The `RUST_LOG` environment variable takes precedence over the
/// configured filter. Fails when a global subscriber is already set.
///
/// # Examples
///
/// ```rust,no_run
/// use tabwatch::logging::{init_logging, LoggingConfig};
///
/// init_logging(LoggingConfig::development()).unwrap();
/// ```
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let config = LoggingConfig::default();
        assert_eq!(config.env_filter(), "info,tabwatch=debug");
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert_eq!(config.level, Level::WARN);
        assert!(config.json_format);
        assert_eq!(config.env_filter(), "warn,tabwatch=info");
    }

    #[test]
    fn test_filter_override() {
        let config = LoggingConfig::default().with_env_filter("tabwatch=trace");
        assert_eq!(config.env_filter(), "tabwatch=trace");
    }
}
