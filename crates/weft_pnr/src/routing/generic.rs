//! The seam to a general-purpose router for everything the clock stage did
//! not route.

use super::route_and_report;
use crate::codes;
use crate::data::{Design, NetKind};
use crate::ids::NetId;
use weft_common::WeftResult;
use weft_diagnostics::{Diagnostic, DiagnosticSink, Subject};
use weft_fabric::Fabric;

/// Routes every unlocked net of a design.
///
/// Implementations must leave locked nets, and their committed routes,
/// untouched. Returns the number of nets routed.
pub trait GenericRouter {
    /// Routes all unlocked nets.
    fn route_unlocked(
        &self,
        fabric: &dyn Fabric,
        design: &mut Design,
        sink: &DiagnosticSink,
    ) -> WeftResult<usize>;
}

/// Routes each unlocked net independently with the maze search.
///
/// Static nets are skipped since constants come from fabric tie-offs, as are
/// nets with no sinks and nets touching an unplaced cell.
#[derive(Debug, Clone, Copy)]
pub struct MazeFallbackRouter {
    /// Cost added per hop already taken.
    pub hop_penalty: f64,
}

impl MazeFallbackRouter {
    /// Creates a router with the given hop penalty.
    pub fn new(hop_penalty: f64) -> Self {
        Self { hop_penalty }
    }

    fn routable(design: &Design, net: NetId, sink: &DiagnosticSink) -> bool {
        let n = design.net(net);
        if n.locked || n.kind == NetKind::Static || n.sinks.is_empty() {
            return false;
        }
        let unplaced = std::iter::once(n.driver)
            .chain(n.sinks.iter().copied())
            .map(|p| design.pin(p).cell)
            .find(|&c| design.cell(c).placement.is_none());
        if let Some(cell) = unplaced {
            sink.emit(Diagnostic::warning(
                codes::ROUTE_SKIPPED,
                format!(
                    "net '{}' skipped: cell '{}' is not placed",
                    n.name,
                    design.cell(cell).name
                ),
                Subject::Net(n.name.clone()),
            ));
            return false;
        }
        true
    }
}

impl GenericRouter for MazeFallbackRouter {
    fn route_unlocked(
        &self,
        fabric: &dyn Fabric,
        design: &mut Design,
        sink: &DiagnosticSink,
    ) -> WeftResult<usize> {
        let view: &Design = design;
        let nets: Vec<NetId> = view
            .nets
            .iter()
            .map(|n| n.id)
            .filter(|&id| Self::routable(view, id, sink))
            .collect();
        let summary = route_and_report(fabric, design, &nets, self.hop_penalty, sink);
        Ok(summary.routed)
    }
}
