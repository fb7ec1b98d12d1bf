//! Human-readable formatting of diagnostics.

use crate::code::Severity;
use crate::diagnostic::Diagnostic;
use std::fmt::Write;

/// Turns diagnostics into text.
pub trait DiagnosticRenderer {
    /// Formats one diagnostic, ending in a newline.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Formats a batch followed by a one-line tally.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        let mut out: String = diags.iter().map(|d| self.render(d)).collect();
        out.push_str(&summary(diags));
        out
    }
}

/// `"2 warnings, 1 note"`-style tally; `"no diagnostics"` when empty.
pub fn summary(diags: &[Diagnostic]) -> String {
    let parts: Vec<String> = [Severity::Error, Severity::Warning, Severity::Note]
        .into_iter()
        .filter_map(|severity| {
            let n = diags.iter().filter(|d| d.severity == severity).count();
            match n {
                0 => None,
                1 => Some(format!("1 {severity}")),
                _ => Some(format!("{n} {severity}s")),
            }
        })
        .collect();
    if parts.is_empty() {
        "no diagnostics\n".to_string()
    } else {
        format!("{}\n", parts.join(", "))
    }
}

/// Compiler-style terminal output:
///
/// ```text
/// warning[W202]: connected group of 4 cell(s) has no fixed cell; anchored at its centroid
///   --> cell "u1"
///    = help: connect the group to a fixed cell to pin down its absolute location
/// ```
pub struct TerminalRenderer {
    /// Wrap the severity label in ANSI colors.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        if self.color {
            let ansi = match diag.severity {
                Severity::Error => "1;31",
                Severity::Warning => "1;33",
                Severity::Note => "1;36",
            };
            let _ = write!(out, "\x1b[{ansi}m{}\x1b[0m", diag.severity);
        } else {
            let _ = write!(out, "{}", diag.severity);
        }
        let _ = writeln!(out, "[{}]: {}", diag.code, diag.message);
        if let Some(subject) = &diag.subject {
            let _ = writeln!(out, "  --> {subject}");
        }
        for note in &diag.notes {
            let _ = writeln!(out, "   = note: {note}");
        }
        for help in &diag.help {
            let _ = writeln!(out, "   = help: {help}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    #[test]
    fn full_warning_layout() {
        let diag = Diagnostic::new(DiagnosticCode::warning(202), "group has no fixed cell")
            .with_subject("cell \"u1\"")
            .with_note("anchored at its centroid")
            .with_help("add a fixed pad to the group");
        assert_eq!(
            TerminalRenderer::new(false).render(&diag),
            "warning[W202]: group has no fixed cell\n  --> cell \"u1\"\n   = note: anchored at its centroid\n   = help: add a fixed pad to the group\n"
        );
    }

    #[test]
    fn colored_label() {
        let diag = Diagnostic::new(DiagnosticCode::error(101), "bad config");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror\x1b[0m[E101]"));
    }

    #[test]
    fn batch_with_tally() {
        let diags = vec![
            Diagnostic::new(DiagnosticCode::warning(201), "a"),
            Diagnostic::new(DiagnosticCode::warning(201), "b"),
            Diagnostic::new(DiagnosticCode::note(302), "c"),
        ];
        let output = TerminalRenderer::new(false).render_all(&diags);
        assert!(output.ends_with("2 warnings, 1 note\n"));
        assert_eq!(summary(&[]), "no diagnostics\n");
    }
}
