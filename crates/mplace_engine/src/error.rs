//! Error types for placement setup and execution.

use crate::codes;
use mplace_common::InternalError;
use mplace_config::ConfigError;
use mplace_diagnostics::Diagnostic;

/// Errors that abort a placement run.
///
/// Everything else (malformed nets, floating components, an exhausted
/// iteration budget) is recovered and reported as a diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    /// The run parameters or core region are unusable. Raised before any
    /// solving begins.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The netlist is structurally unusable. Raised before any solving begins.
    #[error("invalid netlist: {0}")]
    InvalidNetlist(String),

    /// A bug in the placer.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl PlaceError {
    /// Converts the error into an error-severity diagnostic for rendering.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            PlaceError::InvalidConfiguration(_) => codes::INVALID_CONFIGURATION,
            PlaceError::InvalidNetlist(_) => codes::INVALID_NETLIST,
            PlaceError::Internal(_) => codes::INTERNAL,
        };
        Diagnostic::new(code, self.to_string())
    }
}

impl From<ConfigError> for PlaceError {
    fn from(err: ConfigError) -> Self {
        PlaceError::InvalidConfiguration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_configuration() {
        let err = PlaceError::InvalidConfiguration("core width must be positive".into());
        assert_eq!(
            format!("{err}"),
            "invalid configuration: core width must be positive"
        );
    }

    #[test]
    fn from_config_error() {
        let err: PlaceError = mplace_config::load_config_from_str("[run]\nmax_iterations = 0\n")
            .unwrap_err()
            .into();
        assert!(
            matches!(err, PlaceError::InvalidConfiguration(ref m) if m.contains("max_iterations"))
        );
    }

    #[test]
    fn internal_is_transparent() {
        let err: PlaceError = InternalError::new("boom").into();
        assert_eq!(format!("{err}"), "internal placer error: boom");
    }

    #[test]
    fn diagnostic_codes() {
        let diag = PlaceError::InvalidNetlist("duplicate cell \"a\"".into()).to_diagnostic();
        assert_eq!(format!("{}", diag.code), "E102");
        assert!(diag.severity.is_error());
        let diag = PlaceError::InvalidConfiguration("x".into()).to_diagnostic();
        assert_eq!(format!("{}", diag.code), "E101");
    }
}
