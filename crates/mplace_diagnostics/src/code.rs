//! Severity levels and the `E`/`W`/`N` code scheme.
//!
//! Every code belongs to exactly one severity, so a diagnostic's severity is
//! read off its code rather than chosen at each emit site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a reported condition is, least severe first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something the engine did that the caller may want to know.
    Note,
    /// A recovered problem; the run went on.
    Warning,
    /// A problem that stopped the run before solving.
    Error,
}

impl Severity {
    /// Letter used in front of code numbers.
    pub fn prefix(self) -> char {
        match self {
            Severity::Note => 'N',
            Severity::Warning => 'W',
            Severity::Error => 'E',
        }
    }

    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A stable identifier such as `W202`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Severity implied by the code.
    pub severity: Severity,
    /// Number within the severity, printed with three digits.
    pub number: u16,
}

impl DiagnosticCode {
    /// An error code, `E<number>`.
    pub const fn error(number: u16) -> Self {
        Self {
            severity: Severity::Error,
            number,
        }
    }

    /// A warning code, `W<number>`.
    pub const fn warning(number: u16) -> Self {
        Self {
            severity: Severity::Warning,
            number,
        }
    }

    /// A note code, `N<number>`.
    pub const fn note(number: u16) -> Self {
        Self {
            severity: Severity::Note,
            number,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.severity.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_are_ordered() {
        let mut all = vec![Severity::Error, Severity::Note, Severity::Warning];
        all.sort();
        assert_eq!(all, vec![Severity::Note, Severity::Warning, Severity::Error]);
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
    }

    #[test]
    fn codes_print_with_prefix() {
        assert_eq!(DiagnosticCode::error(101).to_string(), "E101");
        assert_eq!(DiagnosticCode::warning(7).to_string(), "W007");
        assert_eq!(DiagnosticCode::note(302).to_string(), "N302");
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&DiagnosticCode::warning(202)).unwrap();
        assert_eq!(json, r#"{"severity":"warning","number":202}"#);
    }
}
