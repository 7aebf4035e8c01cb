use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--log-level`.
pub fn init(log_level: &str) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn level_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels_parse() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(level_filter(level).is_ok(), "{level}");
        }
    }

    #[test]
    fn test_bad_level_names_the_value() {
        let err = level_filter("homefin=loudest").unwrap_err();
        assert!(matches!(err, TelemetryError::EnvFilter { .. }));
        assert_eq!(
            err.to_string(),
            "invalid log level/filter 'homefin=loudest'"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
