//! Diagnostic rendering backends for human-readable output.

use crate::diagnostic::{Diagnostic, Subject};

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[S001]: SitePIP conflict on mux 'CEUSEDMUX'
///   --> cell 'ff_0'
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        let header = format!("{}[{}]", diag.severity, diag.code);
        let ansi = match diag.severity {
            crate::Severity::Error => "1;31",
            crate::Severity::Warning => "1;33",
            crate::Severity::Note => "1;36",
        };
        out.push_str(&format!("{}: {}\n", self.paint(&header, ansi), diag.message));

        if diag.subject != Subject::Design {
            out.push_str(&format!("  --> {}\n", diag.subject));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_error_with_subject() {
        let code = DiagnosticCode::new(Category::Site, 1);
        let diag = Diagnostic::error(
            code,
            "SitePIP conflict on mux 'CEUSEDMUX'",
            Subject::Cell("ff_0".into()),
        );

        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("error[S001]: SitePIP conflict on mux 'CEUSEDMUX'"));
        assert!(output.contains("--> cell 'ff_0'"));
    }

    #[test]
    fn render_warning_with_notes() {
        let code = DiagnosticCode::new(Category::Routing, 1);
        let diag = Diagnostic::warning(code, "route failed", Subject::Net("clk_0".into()))
            .with_note("frontier exhausted after 40 nodes")
            .with_help("check that the sink site pin is reachable");

        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("warning[R001]: route failed"));
        assert!(output.contains("= note: frontier exhausted after 40 nodes"));
        assert!(output.contains("= help: check that the sink site pin is reachable"));
    }

    #[test]
    fn render_design_subject_has_no_location() {
        let code = DiagnosticCode::new(Category::Progress, 1);
        let diag = Diagnostic::note(code, "placed 12 cells", Subject::Design);
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(!output.contains("-->"));
    }

    #[test]
    fn render_with_color_wraps_header() {
        let code = DiagnosticCode::new(Category::Placement, 2);
        let diag = Diagnostic::error(code, "conflict", Subject::Design);
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror[P002]\x1b[0m"));
    }
}
