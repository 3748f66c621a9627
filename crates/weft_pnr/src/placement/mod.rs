//! Legalizing placement.
//!
//! Assigns every cell that needs a physical resource to a compatible,
//! unoccupied `(site, BEL)` pair. I/O buffers go to the site bonded to their
//! constrained package pin, the global clock buffer goes to its designated
//! resource, and everything else is placed by seeded rejection sampling.

pub mod constraints;
pub mod registry;
pub mod sampler;

use crate::codes;
use crate::context::PnrContext;
use crate::error::PnrError;
use crate::ids::CellId;
use crate::primitive::{apply_static_ties, descriptor, PlacementPolicy};
use crate::data::CellState;
use sampler::CandidateSampler;
use weft_diagnostics::{Diagnostic, Subject};
use weft_fabric::{BelId, PrimitiveKind, SiteId};

pub use constraints::validate_constraints;
pub use registry::PlacementRegistry;

/// Counts reported by [`place`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementSummary {
    /// Cells placed by this call.
    pub placed: usize,
    /// I/O buffers placed at their constrained site.
    pub constrained: usize,
    /// Constant pins tied after placement.
    pub tied_pins: usize,
}

/// Places every unplaced cell.
///
/// I/O buffers with a resolvable constraint are placed in a first pass, so
/// no random draw can take a bonded package pin. A second pass places the
/// global clock buffer, samples everything else, and falls back to sampling
/// for I/O buffers whose constraint could not be honoured.
///
/// Stops at the first cell with no legal resource left and returns
/// [`PnrError::NoLegalPlacement`]; cells placed before it keep their placement.
pub fn place(ctx: &mut PnrContext) -> Result<PlacementSummary, PnrError> {
    let mut sampler = CandidateSampler::new(
        ctx.settings.placement.seed,
        ctx.settings.placement.max_attempts,
    );
    let mut summary = PlacementSummary::default();

    for cell in unplaced_with(ctx, PlacementPolicy::Constrained) {
        if let Some((site, bel)) = constrained_location(ctx, cell) {
            finish(ctx, cell, site, bel, &mut summary)?;
            summary.constrained += 1;
        }
    }

    for index in 0..ctx.design.cells.len() {
        let cell = CellId::from_raw(index as u32);
        if ctx.design.cell(cell).state != CellState::Unplaced {
            continue;
        }
        let (site, bel) = match descriptor(ctx.design.cell(cell).kind).placement {
            PlacementPolicy::Skip => continue,
            PlacementPolicy::GlobalClock => global_clock_location(ctx, cell)?,
            PlacementPolicy::Constrained | PlacementPolicy::Random => {
                sample(ctx, &mut sampler, cell)?
            }
        };
        finish(ctx, cell, site, bel, &mut summary)?;
    }

    ctx.sink.emit(Diagnostic::note(
        codes::PLACEMENT_SUMMARY,
        format!(
            "placed {} cells ({} at constrained pins, {} control pins tied)",
            summary.placed, summary.constrained, summary.tied_pins
        ),
        Subject::Design,
    ));
    Ok(summary)
}

fn unplaced_with(ctx: &PnrContext, policy: PlacementPolicy) -> Vec<CellId> {
    ctx.design
        .cells
        .iter()
        .filter(|c| c.state == CellState::Unplaced && descriptor(c.kind).placement == policy)
        .map(|c| c.id)
        .collect()
}

fn finish(
    ctx: &mut PnrContext,
    cell: CellId,
    site: SiteId,
    bel: BelId,
    summary: &mut PlacementSummary,
) -> Result<(), PnrError> {
    commit_placement(ctx, cell, site, bel)?;
    summary.placed += 1;
    summary.tied_pins += apply_static_ties(&mut ctx.design, cell);
    Ok(())
}

/// Checks that `(site, bel)` can host a `kind` cell and is free.
///
/// Lets callers resolve a location before creating the cell that will use it.
pub fn check_placement(
    ctx: &PnrContext,
    cell: &str,
    kind: PrimitiveKind,
    site: SiteId,
    bel: BelId,
) -> Result<(), PnrError> {
    let def = ctx.fabric.bel(site, bel);
    if !def.is_some_and(|b| b.compat == Some(kind)) {
        return Err(PnrError::Incompatible {
            cell: cell.to_string(),
            site: site_name(ctx, site),
            bel: def.map(|b| b.name.clone()).unwrap_or_else(|| bel.to_string()),
        });
    }
    match ctx.registry.occupant(site, bel) {
        Some(occupant) => Err(PnrError::PlacementConflict {
            site,
            bel,
            occupant,
        }),
        None => Ok(()),
    }
}

/// Records a placement in the registry and on the cell.
///
/// Rejects BELs whose compatibility tag differs from the cell's primitive.
pub fn commit_placement(
    ctx: &mut PnrContext,
    cell: CellId,
    site: SiteId,
    bel: BelId,
) -> Result<(), PnrError> {
    let c = ctx.design.cell(cell);
    check_placement(ctx, &c.name, c.kind, site, bel)?;
    ctx.registry.occupy(site, bel, cell)?;
    let c = ctx.design.cell_mut(cell);
    c.placement = Some((site, bel));
    c.state = CellState::Placed;
    Ok(())
}

fn site_name(ctx: &PnrContext, site: SiteId) -> String {
    ctx.fabric
        .site(site)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| site.to_string())
}

fn sample(
    ctx: &PnrContext,
    sampler: &mut CandidateSampler,
    cell: CellId,
) -> Result<(SiteId, BelId), PnrError> {
    let c = ctx.design.cell(cell);
    let candidates = ctx.fabric.compatible_placements(c.kind);
    sampler.sample(&candidates, &ctx.registry).ok_or_else(|| {
        let err = PnrError::NoLegalPlacement {
            cell: c.name.clone(),
            kind: c.kind,
        };
        ctx.sink.emit(
            Diagnostic::error(
                codes::NO_LEGAL_PLACEMENT,
                err.to_string(),
                Subject::Cell(c.name.clone()),
            )
            .with_note(format!(
                "{} compatible resources, {} occupied in total",
                candidates.len(),
                ctx.registry.len()
            )),
        );
        err
    })
}

/// Resolves the constrained site of an I/O buffer and sets its I/O standard.
///
/// Returns `None` when the buffer has to fall back to random placement; the
/// constraint miss itself was reported by [`validate_constraints`].
fn constrained_location(ctx: &mut PnrContext, cell: CellId) -> Option<(SiteId, BelId)> {
    let c = ctx.design.cell(cell);
    let kind = c.kind;
    let name = c.name.clone();
    let port = c.pad.clone()?;
    let assignment = ctx.settings.pins.get(&port)?.clone();
    let site = ctx.fabric.site_for_package_pin(&assignment.pin)?;
    let bel = ctx
        .fabric
        .compatible_placements(kind)
        .into_iter()
        .find(|&(s, _)| s == site)
        .map(|(_, b)| b);

    let Some(bel) = bel else {
        ctx.sink.emit(Diagnostic::warning(
            codes::IO_FALLBACK,
            format!(
                "package pin '{}' cannot host a {kind}; placing randomly",
                assignment.pin
            ),
            Subject::Cell(name),
        ));
        return None;
    };
    if let Some(occupant) = ctx.registry.occupant(site, bel) {
        let holder = ctx.design.cell(occupant).name.clone();
        ctx.sink.emit(Diagnostic::error(
            codes::PLACEMENT_CONFLICT,
            format!(
                "package pin '{}' is already used by '{holder}'; placing randomly",
                assignment.pin
            ),
            Subject::Cell(name),
        ));
        return None;
    }
    ctx.design
        .cell_mut(cell)
        .properties
        .insert("IOSTANDARD".to_string(), assignment.io_standard);
    Some((site, bel))
}

fn global_clock_location(ctx: &PnrContext, cell: CellId) -> Result<(SiteId, BelId), PnrError> {
    let c = ctx.design.cell(cell);
    let placement = &ctx.settings.placement;
    let loc = ctx
        .fabric
        .site_by_name(&placement.global_clock_site)
        .and_then(|site| {
            ctx.fabric
                .bel_by_name(site, &placement.global_clock_bel)
                .map(|bel| (site, bel))
        })
        .filter(|&(site, bel)| !ctx.registry.is_occupied(site, bel));
    loc.ok_or_else(|| {
        ctx.sink.emit(Diagnostic::error(
            codes::NO_LEGAL_PLACEMENT,
            format!(
                "global clock resource {}/{} is missing or taken",
                placement.global_clock_site, placement.global_clock_bel
            ),
            Subject::Cell(c.name.clone()),
        ));
        PnrError::NoLegalPlacement {
            cell: c.name.clone(),
            kind: c.kind,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PnrSettings;
    use crate::data::{Design, StaticLevel};
    use crate::fixtures;
    use std::collections::HashSet;
    use weft_diagnostics::DiagnosticSink;
    use weft_fabric::{Fabric, PrimitiveKind};

    fn settings() -> PnrSettings {
        PnrSettings {
            pins: fixtures::pins(),
            ..PnrSettings::default()
        }
    }

    #[test]
    fn places_every_non_constant_cell() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut design = fixtures::counter_design(3);
        design.add_cell("GND", PrimitiveKind::Gnd, "GND");
        let mut ctx = PnrContext::new(&device, design, settings(), &sink);
        let summary = place(&mut ctx).unwrap();
        assert_eq!(summary.placed, 8);
        assert!(ctx.design.is_fully_placed());
        let gnd = ctx.design.cell_by_name("GND").unwrap();
        assert_eq!(ctx.design.cell(gnd).placement, None);
        assert_eq!(ctx.design.cell(gnd).state, CellState::Unplaced);
    }

    #[test]
    fn placement_is_exclusive_and_compatible() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(3), settings(), &sink);
        place(&mut ctx).unwrap();

        let mut seen = HashSet::new();
        for cell in &ctx.design.cells {
            let (site, bel) = cell.placement.unwrap();
            assert!(seen.insert((site, bel)), "{} shares a BEL", cell.name);
            assert_eq!(device.bel(site, bel).unwrap().compat, Some(cell.kind));
            assert_eq!(ctx.registry.occupant(site, bel), Some(cell.id));
            assert_eq!(cell.state, CellState::Placed);
        }
        assert_eq!(ctx.registry.len(), ctx.design.cell_count());
    }

    #[test]
    fn io_buffer_lands_on_constrained_pin() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(1), settings(), &sink);
        let summary = place(&mut ctx).unwrap();
        assert_eq!(summary.constrained, 1);
        let ibuf = ctx.design.cell_by_name("i_clk_IBUF_inst").unwrap();
        let (site, _) = ctx.design.cell(ibuf).placement.unwrap();
        assert_eq!(device.site(site).unwrap().package_pin.as_deref(), Some("E3"));
        assert_eq!(
            ctx.design.cell(ibuf).properties.get("IOSTANDARD").map(String::as_str),
            Some("LVCMOS33")
        );
    }

    #[test]
    fn unconstrained_io_falls_back_to_random() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(
            &device,
            fixtures::counter_design(1),
            PnrSettings::default(),
            &sink,
        );
        place(&mut ctx).unwrap();
        let ibuf = ctx.design.cell_by_name("i_clk_IBUF_inst").unwrap();
        assert!(ctx.design.cell(ibuf).placement.is_some());
        assert!(!ctx.design.cell(ibuf).properties.contains_key("IOSTANDARD"));
    }

    #[test]
    fn constrained_pin_survives_earlier_unconstrained_buffer() {
        let device = fixtures::device();
        for seed in 0..30 {
            let mut design = Design::new("two_inputs");
            let a = design.add_cell("a_IBUF_inst", PrimitiveKind::Ibuf, "IBUF");
            design.cell_mut(a).pad = Some("unconstrained".to_string());
            let b = design.add_cell("b_IBUF_inst", PrimitiveKind::Ibuf, "IBUF");
            design.cell_mut(b).pad = Some("i_clk".to_string());

            let sink = DiagnosticSink::new();
            let mut s = settings();
            s.placement.seed = seed;
            let mut ctx = PnrContext::new(&device, design, s, &sink);
            let summary = place(&mut ctx).unwrap();

            assert_eq!(summary.constrained, 1, "seed {seed}");
            let (site, _) = ctx.design.cell(b).placement.unwrap();
            assert_eq!(
                device.site(site).unwrap().package_pin.as_deref(),
                Some("E3"),
                "seed {seed}"
            );
            let (other, _) = ctx.design.cell(a).placement.unwrap();
            assert_ne!(other, site, "seed {seed}");
            assert_eq!(sink.count_code(codes::PLACEMENT_CONFLICT), 0);
        }
    }

    #[test]
    fn global_clock_buffer_is_fixed_and_tied() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(1), settings(), &sink);
        place(&mut ctx).unwrap();
        let bufg = ctx.design.cell_by_name("i_clk_IBUF_BUFG_inst").unwrap();
        let (site, bel) = ctx.design.cell(bufg).placement.unwrap();
        assert_eq!(device.site(site).unwrap().name, "BUFGCTRL_X0Y16");
        assert_eq!(device.bel(site, bel).unwrap().name, "BUFGCTRL");

        let tie = |pin: &str| {
            let p = ctx.design.cell_pin(bufg, pin).unwrap();
            ctx.design.pin(p).tie
        };
        assert_eq!(tie("CE0"), Some(StaticLevel::High));
        assert_eq!(tie("S0"), Some(StaticLevel::High));
        assert_eq!(tie("CE1"), Some(StaticLevel::Low));
        assert_eq!(tie("S1"), Some(StaticLevel::Low));
        assert_eq!(tie("IGNORE0"), Some(StaticLevel::Low));
        assert_eq!(tie("IGNORE1"), Some(StaticLevel::Low));
    }

    #[test]
    fn flip_flop_controls_are_tied() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(1), settings(), &sink);
        place(&mut ctx).unwrap();
        let ff = ctx.design.cell_by_name("q_reg[0]").unwrap();
        let r = ctx.design.cell_pin(ff, "R").unwrap();
        let ce = ctx.design.cell_pin(ff, "CE").unwrap();
        assert_eq!(ctx.design.pin(r).tie, Some(StaticLevel::Low));
        assert_eq!(ctx.design.pin(ce).tie, Some(StaticLevel::High));
    }

    fn three_luts() -> Design {
        let mut d = Design::new("luts");
        for i in 0..3 {
            d.add_cell(format!("lut{i}"), PrimitiveKind::Lut, "LUT2");
        }
        d
    }

    fn lut_placements(seed: u64) -> Vec<(SiteId, BelId)> {
        let device = fixtures::one_slice_device();
        assert_eq!(device.compatible_placements(PrimitiveKind::Lut).len(), 4);
        let sink = DiagnosticSink::new();
        let mut settings = PnrSettings::default();
        settings.placement.seed = seed;
        let mut ctx = PnrContext::new(&device, three_luts(), settings, &sink);
        place(&mut ctx).unwrap();
        assert_eq!(ctx.registry.len(), 3);
        ctx.registry.iter().map(|(loc, _)| loc).collect()
    }

    #[test]
    fn three_luts_on_four_bels_are_reproducible() {
        let first = lut_placements(6);
        let distinct: HashSet<_> = first.iter().collect();
        assert_eq!(distinct.len(), 3);
        assert_eq!(first, lut_placements(6));
    }

    #[test]
    fn exhaustion_is_fatal() {
        let device = fixtures::one_slice_device();
        let sink = DiagnosticSink::new();
        let mut design = Design::new("too_many");
        for i in 0..5 {
            design.add_cell(format!("lut{i}"), PrimitiveKind::Lut, "LUT1");
        }
        let mut ctx = PnrContext::new(&device, design, PnrSettings::default(), &sink);
        let err = place(&mut ctx).unwrap_err();
        assert_eq!(
            err,
            PnrError::NoLegalPlacement {
                cell: "lut4".into(),
                kind: PrimitiveKind::Lut,
            }
        );
        assert!(err.is_fatal());
        assert_eq!(sink.count_code(codes::NO_LEGAL_PLACEMENT), 1);
        assert_eq!(ctx.registry.len(), 4);
    }

    #[test]
    fn missing_global_clock_site_is_fatal() {
        let device = fixtures::one_slice_device();
        let sink = DiagnosticSink::new();
        let mut design = Design::new("bufg");
        design.add_cell("bufg", PrimitiveKind::Bufgctrl, "BUFGCTRL");
        let mut ctx = PnrContext::new(&device, design, PnrSettings::default(), &sink);
        assert!(matches!(
            place(&mut ctx),
            Err(PnrError::NoLegalPlacement { .. })
        ));
    }

    #[test]
    fn commit_rejects_incompatible_bel() {
        let device = fixtures::one_slice_device();
        let sink = DiagnosticSink::new();
        let mut design = Design::new("bad");
        let lut = design.add_cell("lut", PrimitiveKind::Lut, "LUT1");
        let mut ctx = PnrContext::new(&device, design, PnrSettings::default(), &sink);
        let site = device.site_by_name("SLICE_X0Y0").unwrap();
        let aff = device.bel_by_name(site, "AFF").unwrap();
        let err = commit_placement(&mut ctx, lut, site, aff).unwrap_err();
        assert!(matches!(err, PnrError::Incompatible { .. }));
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn commit_surfaces_registry_conflict() {
        let device = fixtures::one_slice_device();
        let sink = DiagnosticSink::new();
        let mut design = Design::new("clash");
        let a = design.add_cell("a", PrimitiveKind::Lut, "LUT1");
        let b = design.add_cell("b", PrimitiveKind::Lut, "LUT1");
        let mut ctx = PnrContext::new(&device, design, PnrSettings::default(), &sink);
        let site = device.site_by_name("SLICE_X0Y0").unwrap();
        let a6 = device.bel_by_name(site, "A6LUT").unwrap();
        commit_placement(&mut ctx, a, site, a6).unwrap();
        let err = commit_placement(&mut ctx, b, site, a6).unwrap_err();
        assert!(matches!(err, PnrError::PlacementConflict { occupant, .. } if occupant == a));
        assert_eq!(ctx.design.cell(b).state, CellState::Unplaced);
    }
}
