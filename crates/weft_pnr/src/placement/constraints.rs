//! Cross-checks the pin-constraint table against the netlist and the fabric.

use crate::codes;
use crate::data::Design;
use std::collections::{BTreeMap, BTreeSet};
use weft_config::PinAssignment;
use weft_diagnostics::{Diagnostic, DiagnosticSink, Subject};
use weft_fabric::Fabric;

/// Reports every constraint lookup miss as an error diagnostic.
///
/// Returns the number of misses found.
pub fn validate_constraints(
    fabric: &dyn Fabric,
    design: &Design,
    pins: &BTreeMap<String, PinAssignment>,
    sink: &DiagnosticSink,
) -> usize {
    let mut misses = 0;
    let mut pads = BTreeSet::new();

    for cell in design.cells.iter().filter(|c| c.kind.is_io()) {
        match &cell.pad {
            Some(port) => {
                pads.insert(port.as_str());
                if !pins.contains_key(port) {
                    misses += 1;
                    sink.emit(
                        Diagnostic::error(
                            codes::PORT_UNCONSTRAINED,
                            format!("port '{port}' has no pin constraint"),
                            Subject::Cell(cell.name.clone()),
                        )
                        .with_help(format!("add a [pins.\"{port}\"] table to weft.toml")),
                    );
                }
            }
            None => sink.emit(Diagnostic::warning(
                codes::IO_WITHOUT_PAD,
                format!("{} is not attached to a top-level port", cell.kind),
                Subject::Cell(cell.name.clone()),
            )),
        }
    }

    for (port, assignment) in pins {
        if !pads.contains(port.as_str()) {
            misses += 1;
            sink.emit(Diagnostic::error(
                codes::CONSTRAINED_PORT_MISSING,
                "constrained port has no I/O buffer in the netlist",
                Subject::Port(port.clone()),
            ));
        }
        if fabric.site_for_package_pin(&assignment.pin).is_none() {
            misses += 1;
            sink.emit(
                Diagnostic::error(
                    codes::UNKNOWN_PACKAGE_PIN,
                    format!(
                        "package pin '{}' does not exist on {}",
                        assignment.pin,
                        fabric.device_name()
                    ),
                    Subject::Port(port.clone()),
                )
                .with_note(format!("io_standard = {}", assignment.io_standard)),
            );
        }
    }

    misses
}
