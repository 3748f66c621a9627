//! Local clock buffer insertion.
//!
//! Splits the configured clock net so that every load is fed through its own
//! regional buffer, chosen as the nearest free `BUFHCE` resource to the load.

use crate::codes;
use crate::context::PnrContext;
use crate::data::{NetKind, PinDirection};
use crate::error::PnrError;
use crate::ids::{CellId, NetId};
use crate::placement::{check_placement, commit_placement, PlacementRegistry};
use crate::primitive::apply_static_ties;
use crate::site_config::{configure_cell, failure_code};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use weft_diagnostics::{Diagnostic, Subject};
use weft_fabric::{BelId, Fabric, PrimitiveKind, SiteId};

/// The clock distribution produced by [`insert_clock_buffers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTree {
    /// The original clock net, now driving buffer inputs.
    pub source: NetId,
    /// One net per buffered load, driven by its buffer.
    pub branches: Vec<NetId>,
    /// The inserted buffer cells, parallel to `branches`.
    pub buffers: Vec<CellId>,
}

impl ClockTree {
    /// Returns the source net followed by every branch.
    pub fn nets(&self) -> Vec<NetId> {
        std::iter::once(self.source)
            .chain(self.branches.iter().copied())
            .collect()
    }
}

/// Finds the free local clock buffer resource closest to `site`.
///
/// Ties in distance go to the resource enumerated first.
pub fn nearest_buffer(
    fabric: &dyn Fabric,
    registry: &PlacementRegistry,
    site: SiteId,
) -> Option<(SiteId, BelId)> {
    let mut queue = BinaryHeap::new();
    for (seq, (candidate, bel)) in fabric
        .compatible_placements(PrimitiveKind::Bufhce)
        .into_iter()
        .enumerate()
    {
        if registry.is_occupied(candidate, bel) {
            continue;
        }
        let distance = fabric.site_distance(site, candidate);
        queue.push(Reverse((distance, seq, candidate, bel)));
    }
    queue
        .pop()
        .map(|Reverse((_, _, candidate, bel))| (candidate, bel))
}

/// Inserts one buffer in front of every load of the configured clock net.
///
/// Loads that are unplaced, or for which no buffer resource is left, stay on
/// the original net. Returns `None` when the clock net does not exist.
pub fn insert_clock_buffers(ctx: &mut PnrContext) -> Option<ClockTree> {
    let clock_name = ctx.settings.clock.net.clone();
    let Some(source) = ctx.design.net_by_name(&clock_name) else {
        ctx.sink.emit(Diagnostic::warning(
            codes::CLOCK_NET_MISSING,
            format!("clock net '{clock_name}' not found, no buffers inserted"),
            Subject::Net(clock_name),
        ));
        return None;
    };
    ctx.design.net_mut(source).kind = NetKind::Clock;

    let mut tree = ClockTree {
        source,
        branches: Vec::new(),
        buffers: Vec::new(),
    };
    let loads = ctx.design.net(source).sinks.clone();
    for (i, load) in loads.into_iter().enumerate() {
        let load_path = ctx.design.pin_path(load);
        let load_cell = ctx.design.pin(load).cell;
        let Some((load_site, _)) = ctx.design.cell(load_cell).placement else {
            ctx.sink.emit(Diagnostic::warning(
                codes::CLOCK_LOAD_UNPLACED,
                format!("clock load '{load_path}' is not placed, left unbuffered"),
                Subject::Pin(load_path),
            ));
            continue;
        };
        let Some((site, bel)) = nearest_buffer(ctx.fabric, &ctx.registry, load_site) else {
            ctx.sink.emit(Diagnostic::warning(
                codes::NO_CLOCK_BUFFER,
                format!("no free clock buffer left for '{load_path}'"),
                Subject::Pin(load_path),
            ));
            continue;
        };

        let name = ctx
            .design
            .unique_cell_name(&format!("{}{i}", ctx.settings.clock.buffer_prefix));
        let buffer = match place_buffer(ctx, &name, site, bel) {
            Ok(buffer) => buffer,
            Err(err) => {
                ctx.sink.emit(Diagnostic::error(
                    codes::PLACEMENT_CONFLICT,
                    err.to_string(),
                    Subject::Cell(name),
                ));
                continue;
            }
        };
        let input = ctx.design.add_pin(buffer, "I", PinDirection::Input);
        let output = ctx.design.add_pin(buffer, "O", PinDirection::Output);
        apply_static_ties(&mut ctx.design, buffer);
        if let Err(err) = configure_cell(ctx.fabric, &mut ctx.design, buffer) {
            ctx.sink.emit(Diagnostic::error(
                failure_code(&err),
                err.to_string(),
                Subject::Cell(name.clone()),
            ));
        }

        let branch_name = ctx.design.unique_net_name(&format!("{clock_name}{i}"));
        let branch = ctx.design.add_net(&branch_name, NetKind::Clock, output);
        ctx.design.disconnect_sink(source, load);
        ctx.design.connect_sink(branch, load);
        ctx.design.connect_sink(source, input);

        let site_name = ctx
            .fabric
            .site(site)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        ctx.sink.emit(Diagnostic::note(
            codes::CLOCK_BUFFER_INSERTED,
            format!("'{name}' at {site_name} now drives '{load_path}' through net '{branch_name}'"),
            Subject::Cell(name),
        ));
        tree.branches.push(branch);
        tree.buffers.push(buffer);
    }
    Some(tree)
}

/// Creates a buffer cell on `(site, bel)`.
///
/// The location is checked first, so a rejected location leaves no cell
/// behind.
fn place_buffer(
    ctx: &mut PnrContext,
    name: &str,
    site: SiteId,
    bel: BelId,
) -> Result<CellId, PnrError> {
    check_placement(ctx, name, PrimitiveKind::Bufhce, site, bel)?;
    let buffer = ctx.design.add_cell(name, PrimitiveKind::Bufhce, "BUFHCE");
    commit_placement(ctx, buffer, site, bel)?;
    Ok(buffer)
}
