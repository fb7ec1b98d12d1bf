//! Structured diagnostics for placement runs.
//!
//! A [`Diagnostic`] carries a [`DiagnosticCode`] (whose letter fixes the
//! [`Severity`]), a message, and optionally the netlist entity it concerns
//! plus notes and help. A [`DiagnosticSink`] collects them for one run and
//! mirrors each to the `log` facade; [`TerminalRenderer`] prints them.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod sink;

pub use code::{DiagnosticCode, Severity};
pub use diagnostic::Diagnostic;
pub use renderer::{summary, DiagnosticRenderer, TerminalRenderer};
pub use sink::DiagnosticSink;
