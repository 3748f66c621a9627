//! Diagnostic creation, severity management, and rendering for the Weft flow.
//!
//! Every stage of the flow reports recoverable problems and progress as
//! structured [`Diagnostic`] values with a category-prefixed code and the name
//! of the design or fabric object involved. The [`DiagnosticSink`] accumulates
//! them for the whole batch, and [`TerminalRenderer`] formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Subject};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
