//! Errors raised while reading run configuration.

use std::path::PathBuf;

/// Why an `mplace.toml` could not be turned into a usable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was looked up.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the configuration schema.
    #[error("malformed configuration: {0}")]
    Parse(String),

    /// A value parsed but is out of range.
    #[error("`{field}` {reason}")]
    Invalid {
        /// Dotted key, e.g. `run.max_iterations`.
        field: &'static str,
        /// What the value must satisfy.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// The offending key for range errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}
