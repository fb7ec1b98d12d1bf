//! Diagnostic codes emitted by the placement engine.

use mplace_diagnostics::DiagnosticCode;

/// Internal placer error.
pub const INTERNAL: DiagnosticCode = DiagnosticCode::error(100);
/// Run parameters or core region rejected at setup.
pub const INVALID_CONFIGURATION: DiagnosticCode = DiagnosticCode::error(101);
/// Netlist rejected at setup.
pub const INVALID_NETLIST: DiagnosticCode = DiagnosticCode::error(102);
/// Net with fewer than two distinct pins, skipped.
pub const MALFORMED_NET: DiagnosticCode = DiagnosticCode::warning(201);
/// Connected component without a fixed cell, or a solve that needed anchoring.
pub const DEGENERATE_SYSTEM: DiagnosticCode = DiagnosticCode::warning(202);
/// Iteration budget exhausted before convergence.
pub const NON_CONVERGENCE: DiagnosticCode = DiagnosticCode::warning(203);
/// An axis solve stopped at its step cap above tolerance.
pub const SOLVER_STEP_CAP: DiagnosticCode = DiagnosticCode::warning(204);
/// The spreading stage moved cells after quadratic convergence.
pub const SPREADING_APPLIED: DiagnosticCode = DiagnosticCode::note(301);
/// Movable cells without any connection keep their initial position.
pub const UNCONNECTED_CELLS: DiagnosticCode = DiagnosticCode::note(302);
