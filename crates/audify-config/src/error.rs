//! Error types for configuration loading.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was not provided.
    #[error("missing configuration value '{key}'")]
    Missing {
        /// Environment key that was expected.
        key: &'static str,
    },
    /// A value was provided but failed validation.
    #[error("invalid value for '{key}': {reason}")]
    InvalidField {
        /// Environment key holding the value.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Human-readable reason for the failure.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        key: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::ConfigError;

    #[test]
    fn messages_name_the_key() {
        let missing = ConfigError::Missing {
            key: "AUDIFY_SPOTIFY_CLIENT_ID",
        };
        assert_eq!(
            missing.to_string(),
            "missing configuration value 'AUDIFY_SPOTIFY_CLIENT_ID'"
        );

        let invalid = ConfigError::invalid("AUDIFY_LINK_POLICY", "loose", "unknown policy");
        assert_eq!(
            invalid.to_string(),
            "invalid value for 'AUDIFY_LINK_POLICY': unknown policy"
        );
    }
}
