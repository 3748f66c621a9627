//! Diagnostic codes emitted by the flow.

use weft_diagnostics::{Category, DiagnosticCode};

/// A constrained port has no I/O buffer in the netlist.
pub const CONSTRAINED_PORT_MISSING: DiagnosticCode = DiagnosticCode::new(Category::Constraint, 1);
/// An I/O buffer's pad port has no pin constraint.
pub const PORT_UNCONSTRAINED: DiagnosticCode = DiagnosticCode::new(Category::Constraint, 2);
/// A constraint names a package pin the fabric does not have.
pub const UNKNOWN_PACKAGE_PIN: DiagnosticCode = DiagnosticCode::new(Category::Constraint, 3);
/// An I/O buffer is not attached to any top-level port.
pub const IO_WITHOUT_PAD: DiagnosticCode = DiagnosticCode::new(Category::Constraint, 4);

/// A requested resource was already occupied.
pub const PLACEMENT_CONFLICT: DiagnosticCode = DiagnosticCode::new(Category::Placement, 1);
/// No legal resource remains for a cell.
pub const NO_LEGAL_PLACEMENT: DiagnosticCode = DiagnosticCode::new(Category::Placement, 2);
/// A constrained I/O buffer fell back to random placement.
pub const IO_FALLBACK: DiagnosticCode = DiagnosticCode::new(Category::Placement, 3);
/// Placement summary.
pub const PLACEMENT_SUMMARY: DiagnosticCode = DiagnosticCode::new(Category::Placement, 100);

/// Two signals need different inputs of the same site mux.
pub const SITE_PIP_CONFLICT: DiagnosticCode = DiagnosticCode::new(Category::Site, 1);
/// No SitePIP connects a pin to its site boundary.
pub const SITE_PIP_NOT_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Site, 2);
/// A cell could not be configured because it is not placed.
pub const CONFIGURE_UNPLACED: DiagnosticCode = DiagnosticCode::new(Category::Site, 3);
/// Site configuration summary.
pub const SITE_SUMMARY: DiagnosticCode = DiagnosticCode::new(Category::Site, 100);

/// The configured clock net does not exist.
pub const CLOCK_NET_MISSING: DiagnosticCode = DiagnosticCode::new(Category::Clock, 1);
/// A clock load is not placed, so no buffer can be chosen for it.
pub const CLOCK_LOAD_UNPLACED: DiagnosticCode = DiagnosticCode::new(Category::Clock, 2);
/// Every local clock buffer resource is taken.
pub const NO_CLOCK_BUFFER: DiagnosticCode = DiagnosticCode::new(Category::Clock, 3);
/// A buffer was inserted in front of a clock load.
pub const CLOCK_BUFFER_INSERTED: DiagnosticCode = DiagnosticCode::new(Category::Clock, 100);

/// A sink could not be reached.
pub const ROUTE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Routing, 1);
/// A locked net was asked to re-route.
pub const NET_LOCKED: DiagnosticCode = DiagnosticCode::new(Category::Routing, 2);
/// A net pin has no interconnect node.
pub const UNROUTABLE_ENDPOINT: DiagnosticCode = DiagnosticCode::new(Category::Routing, 3);
/// A net was skipped because some of its cells are unplaced.
pub const ROUTE_SKIPPED: DiagnosticCode = DiagnosticCode::new(Category::Routing, 4);
/// Per-sink search statistics.
pub const ROUTE_STATS: DiagnosticCode = DiagnosticCode::new(Category::Routing, 100);

/// A checkpoint was written.
pub const CHECKPOINT_WRITTEN: DiagnosticCode = DiagnosticCode::new(Category::Progress, 1);
/// A checkpoint could not be written.
pub const CHECKPOINT_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Progress, 2);
