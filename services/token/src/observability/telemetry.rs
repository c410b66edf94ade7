//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_output: true,
        }
    }
}

impl TracingConfig {
    /// Sets the default filter directive.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enables or disables JSON output.
    #[must_use]
    pub const fn with_json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(config.filter());

    if config.json_output {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.json_output);
    }

    #[test]
    fn test_builder() {
        let config = TracingConfig::default()
            .with_log_level("debug")
            .with_json_output(false);
        assert_eq!(config.log_level, "debug");
        assert!(!config.json_output);
    }

    #[test]
    fn test_second_init_fails() {
        let config = TracingConfig::default().with_json_output(false);
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
