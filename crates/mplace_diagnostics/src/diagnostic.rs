//! A single reported condition.

use crate::code::{DiagnosticCode, Severity};
use serde::{Deserialize, Serialize};

/// A structured message about something the engine noticed.
///
/// Besides the code and message it may name the netlist entity concerned
/// (`subject`), and carry footnotes and suggestions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity, taken from the code.
    pub severity: Severity,
    /// Stable identifier.
    pub code: DiagnosticCode,
    /// One-line description.
    pub message: String,
    /// The entity concerned, e.g. `net "clk"`.
    pub subject: Option<String>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Suggested fixes.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic whose severity follows from `code`.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity,
            code,
            message: message.into(),
            subject: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Names the entity this diagnostic is about.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Appends a footnote.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Appends a suggestion.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_code() {
        let e = Diagnostic::new(DiagnosticCode::error(101), "core width must be positive");
        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.code.to_string(), "E101");
        assert!(e.subject.is_none());
        let n = Diagnostic::new(DiagnosticCode::note(301), "spread");
        assert_eq!(n.severity, Severity::Note);
    }

    #[test]
    fn builder_accumulates() {
        let diag = Diagnostic::new(DiagnosticCode::warning(201), "net has fewer than two distinct pins")
            .with_subject("net \"rst\"")
            .with_note("the net contributes nothing to the objective")
            .with_help("connect a second pin or drop the net")
            .with_help("or remove it from the netlist");
        assert_eq!(diag.subject.as_deref(), Some("net \"rst\""));
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 2);
    }
}
