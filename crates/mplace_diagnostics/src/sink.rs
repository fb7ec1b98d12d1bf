//! Run-scoped diagnostic collection.

use crate::code::{DiagnosticCode, Severity};
use crate::diagnostic::Diagnostic;
use std::sync::Mutex;

/// Collects the diagnostics of one placement run.
///
/// Shared by reference; both axis solves of a pass may report into it at
/// the same time. Every emitted diagnostic is also forwarded to the `log`
/// facade at the matching level.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    held: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `diag`.
    pub fn emit(&self, diag: Diagnostic) {
        let level = match diag.severity {
            Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
            Severity::Note => log::Level::Info,
        };
        match &diag.subject {
            Some(subject) => log::log!(level, "[{}] {} ({subject})", diag.code, diag.message),
            None => log::log!(level, "[{}] {}", diag.code, diag.message),
        }
        self.held.lock().unwrap().push(diag);
    }

    /// Number of held diagnostics at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.held
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Returns `true` if any error is held.
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Number of held diagnostics with `code`.
    pub fn count_code(&self, code: DiagnosticCode) -> usize {
        self.held
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.code == code)
            .count()
    }

    /// Returns `true` if a diagnostic with `code` is held.
    pub fn contains_code(&self, code: DiagnosticCode) -> bool {
        self.count_code(code) > 0
    }

    /// The most severe level held, if any.
    pub fn worst(&self) -> Option<Severity> {
        self.held.lock().unwrap().iter().map(|d| d.severity).max()
    }

    /// Copies out everything held, in emit order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.held.lock().unwrap().clone()
    }

    /// Drains everything held.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.held.lock().unwrap())
    }
}
