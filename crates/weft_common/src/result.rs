//! Common result and error types for the Weft flow.

/// The standard result type for fallible internal operations.
///
/// `Ok` contains the result value (which may be partial after per-cell or
/// per-net recovery). `Err` indicates a condition the flow cannot continue
/// from. Recoverable problems are reported through
/// [`DiagnosticSink`](weft_diagnostics) and the operation still returns `Ok`.
pub type WeftResult<T> = Result<T, InternalError>;

/// An error that aborts the flow.
///
/// Raised for broken internal invariants and for the few conditions that are
/// fatal by definition, such as a cell with no legal placement left.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
