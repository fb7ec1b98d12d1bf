//! The error raised when the placer breaks one of its own invariants.

/// A placer bug, as opposed to bad input.
///
/// Input problems surface as diagnostics or setup errors; this type is only
/// for states the engine should never reach, such as a retry loop that
/// keeps failing after every component has been anchored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal placer error: {0}")]
pub struct InternalError(String);

impl InternalError {
    /// Wraps a description of what went wrong.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The description passed to [`new`](Self::new).
    pub fn message(&self) -> &str {
        &self.0
    }
}
