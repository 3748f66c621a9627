//! Clock-aware place and route for the Weft flow.
//!
//! This crate takes a primitive-level [`Design`] and a read-only
//! [`Fabric`](weft_fabric::Fabric) and implements the design in stages, all
//! sharing one explicit [`PnrContext`]:
//!
//! # Pipeline
//!
//! 1. **Constrain**: check the pin-constraint table against the netlist
//! 2. **Place**: constrained I/O, the fixed global clock buffer, then seeded
//!    random legalization of everything else
//! 3. **Configure sites**: select the SitePIPs joining each active pin to
//!    its site boundary
//! 4. **Insert clock buffers**: one local buffer per clock load, nearest first
//! 5. **Route clocks**: maze route the clock nets and lock them
//! 6. **Route the rest**: hand unlocked nets to a [`GenericRouter`]
//!
//! A checkpoint of the design is written after loading and after each stage
//! from placement on.
//!
//! # Usage
//!
//! ```ignore
//! use weft_pnr::{place_and_route, MazeFallbackRouter, NullCheckpoint, PnrContext};
//!
//! let mut ctx = PnrContext::new(&device, design, settings, &sink);
//! let router = MazeFallbackRouter::new(ctx.settings.routing.hop_penalty);
//! let report = place_and_route(&mut ctx, &router, &mut NullCheckpoint)?;
//! assert!(ctx.design.is_fully_placed());
//! ```

#![warn(missing_docs)]

pub mod checkpoint;
pub mod clock;
pub mod codes;
pub mod context;
pub mod data;
pub mod error;
pub mod ids;
pub mod netlist;
pub mod placement;
pub mod primitive;
pub mod routing;
pub mod site_config;

#[cfg(test)]
mod fixtures;

pub use checkpoint::{
    load_checkpoint, CheckpointSink, FileCheckpointWriter, Milestone, NullCheckpoint,
};
pub use clock::{insert_clock_buffers, nearest_buffer, ClockTree};
pub use context::{PnrContext, PnrSettings};
pub use data::{
    Cell, CellState, Design, Net, NetKind, NetRoute, Pin, PinDirection, RouteEdge, SiteInst,
    StaticLevel,
};
pub use error::PnrError;
pub use ids::{CellId, NetId, PinId};
pub use netlist::{load_netlist, parse_netlist, NetlistError};
pub use placement::{place, validate_constraints, PlacementRegistry, PlacementSummary};
pub use primitive::{descriptor, PlacementPolicy, PrimitiveDescriptor};
pub use routing::{
    maze_search, route_clock_nets, route_net, GenericRouter, MazeFallbackRouter,
    RoutingSummary, SearchStats,
};
pub use site_config::{configure_cell, configure_sites, SiteSummary};

use weft_diagnostics::{Diagnostic, Subject};

/// What one run of [`place_and_route`] did.
#[derive(Debug, Clone, Default)]
pub struct FlowReport {
    /// Constraint problems found before placement.
    pub constraint_errors: usize,
    /// Placement counts.
    pub placement: PlacementSummary,
    /// Site configuration counts.
    pub sites: SiteSummary,
    /// The inserted clock distribution, if any.
    pub clock_tree: Option<ClockTree>,
    /// Clock routing counts.
    pub clock_routing: RoutingSummary,
    /// Nets routed by the generic router.
    pub generic_routed: usize,
    /// One label per checkpoint written.
    pub checkpoints: Vec<String>,
}

/// Runs the whole flow on the design held by `ctx`.
///
/// Only running out of legal placements, or a broken invariant, aborts the
/// run. Every other problem is reported to the context's sink and the flow
/// moves on.
pub fn place_and_route(
    ctx: &mut PnrContext,
    router: &dyn GenericRouter,
    checkpoints: &mut dyn CheckpointSink,
) -> Result<FlowReport, PnrError> {
    let mut report = FlowReport::default();
    checkpoint(ctx, checkpoints, Milestone::Loaded, &mut report);

    // 1. Constraints
    report.constraint_errors =
        validate_constraints(ctx.fabric, &ctx.design, &ctx.settings.pins, ctx.sink);

    // 2. Placement
    report.placement = place(ctx)?;
    checkpoint(ctx, checkpoints, Milestone::Placed, &mut report);

    // 3. Site configuration
    report.sites = configure_sites(ctx);
    checkpoint(ctx, checkpoints, Milestone::SitesConfigured, &mut report);

    // 4-5. Clock buffers and clock routing
    let clock_nets = if ctx.settings.clock.insert_buffers {
        report.clock_tree = insert_clock_buffers(ctx);
        report
            .clock_tree
            .as_ref()
            .map(ClockTree::nets)
            .unwrap_or_default()
    } else {
        ctx.design
            .net_by_name(&ctx.settings.clock.net)
            .into_iter()
            .collect()
    };
    report.clock_routing = route_clock_nets(ctx, &clock_nets);
    checkpoint(ctx, checkpoints, Milestone::ClockRouted, &mut report);

    // 6. Everything else
    if ctx.settings.routing.run_generic_router {
        report.generic_routed = router.route_unlocked(ctx.fabric, &mut ctx.design, ctx.sink)?;
    }
    if ctx.settings.routing.unlock_after_generic {
        for &net in &clock_nets {
            ctx.design.unlock_net(net);
        }
    }
    checkpoint(ctx, checkpoints, Milestone::Routed, &mut report);

    Ok(report)
}

fn checkpoint(
    ctx: &PnrContext,
    sink: &mut dyn CheckpointSink,
    milestone: Milestone,
    report: &mut FlowReport,
) {
    match sink.write(milestone, &ctx.design) {
        Ok(label) => {
            ctx.sink.emit(Diagnostic::note(
                codes::CHECKPOINT_WRITTEN,
                format!("checkpoint '{milestone}' written to {label}"),
                Subject::Design,
            ));
            report.checkpoints.push(label);
        }
        Err(err) => ctx.sink.emit(Diagnostic::warning(
            codes::CHECKPOINT_FAILED,
            format!("checkpoint '{milestone}' not written: {err}"),
            Subject::Design,
        )),
    }
}
