//! Diagnostic codes with category prefixes for structured error identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The flow stage a diagnostic belongs to, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Pin-constraint and configuration problems, prefixed with `C`.
    Constraint,
    /// Placement problems, prefixed with `P`.
    Placement,
    /// Site-internal configuration problems, prefixed with `S`.
    Site,
    /// Clock buffer insertion problems, prefixed with `K`.
    Clock,
    /// Routing problems, prefixed with `R`.
    Routing,
    /// Progress and statistics notes, prefixed with `N`.
    Progress,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Constraint => 'C',
            Category::Placement => 'P',
            Category::Site => 'S',
            Category::Clock => 'K',
            Category::Routing => 'R',
            Category::Progress => 'N',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `P001`, `R003`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Constraint.prefix(), 'C');
        assert_eq!(Category::Placement.prefix(), 'P');
        assert_eq!(Category::Site.prefix(), 'S');
        assert_eq!(Category::Clock.prefix(), 'K');
        assert_eq!(Category::Routing.prefix(), 'R');
        assert_eq!(Category::Progress.prefix(), 'N');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Placement, 1);
        assert_eq!(format!("{code}"), "P001");

        let code = DiagnosticCode::new(Category::Routing, 42);
        assert_eq!(format!("{code}"), "R042");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Site, 2);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
