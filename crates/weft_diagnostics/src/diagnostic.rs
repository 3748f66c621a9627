//! Structured diagnostic messages with severity, codes, subjects, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The design or fabric object a diagnostic is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// A cell instance, by name.
    Cell(String),
    /// A net, by name.
    Net(String),
    /// A pin, as `cell/pin`.
    Pin(String),
    /// A top-level port, by name.
    Port(String),
    /// A fabric site, by name.
    Site(String),
    /// The design as a whole.
    Design,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Cell(name) => write!(f, "cell '{name}'"),
            Subject::Net(name) => write!(f, "net '{name}'"),
            Subject::Pin(name) => write!(f, "pin '{name}'"),
            Subject::Port(name) => write!(f, "port '{name}'"),
            Subject::Site(name) => write!(f, "site '{name}'"),
            Subject::Design => write!(f, "design"),
        }
    }
}

/// A structured diagnostic message.
///
/// Each diagnostic includes:
/// - A severity level and unique code
/// - A primary message and the object it concerns
/// - Optional notes and help text
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The object the diagnostic concerns.
    pub subject: Subject,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        subject: Subject,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            subject,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::with_severity(Severity::Error, code, message, subject)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::with_severity(Severity::Warning, code, message, subject)
    }

    /// Creates a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::with_severity(Severity::Note, code, message, subject)
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Placement, 1);
        let diag = Diagnostic::error(code, "no legal placement", Subject::Cell("ff_0".into()));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "no legal placement");
        assert_eq!(format!("{}", diag.code), "P001");
    }

    #[test]
    fn create_note() {
        let code = DiagnosticCode::new(Category::Progress, 3);
        let diag = Diagnostic::note(code, "visited 12 nodes", Subject::Net("clk".into()));
        assert_eq!(diag.severity, Severity::Note);
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Constraint, 1);
        let diag = Diagnostic::error(code, "unknown port", Subject::Port("led".into()))
            .with_note("the constraint table names a port the netlist does not have")
            .with_help("check the [pins] table in weft.toml");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn subject_display() {
        assert_eq!(Subject::Cell("a".into()).to_string(), "cell 'a'");
        assert_eq!(Subject::Pin("a/D".into()).to_string(), "pin 'a/D'");
        assert_eq!(Subject::Design.to_string(), "design");
    }
}
