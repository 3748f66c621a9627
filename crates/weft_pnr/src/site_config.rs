//! Site-internal configuration.
//!
//! Connects the active pins of each placed cell to the site boundary by
//! selecting the SitePIPs its primitive descriptor asks for, then commits the
//! site wires those SitePIPs join.

use crate::codes;
use crate::context::PnrContext;
use crate::data::{CellState, Design, PinDirection};
use crate::error::PnrError;
use crate::ids::CellId;
use crate::primitive::{descriptor, SitePipRule};
use weft_diagnostics::{Diagnostic, DiagnosticCode, Subject};
use weft_fabric::{Fabric, SiteId, SitePipId};

/// Counts reported by [`configure_sites`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteSummary {
    /// Cells that reached [`CellState::Configured`].
    pub configured: usize,
    /// Cells left `Placed` because a SitePIP was missing or conflicting.
    pub failed: usize,
    /// SitePIPs newly activated.
    pub site_pips: usize,
}

/// Configures one placed cell.
///
/// All required SitePIPs are resolved and checked against the site's current
/// mux selections before any of them is applied, so a failing cell leaves the
/// site untouched. Returns the number of newly activated SitePIPs.
pub fn configure_cell(
    fabric: &dyn Fabric,
    design: &mut Design,
    cell: CellId,
) -> Result<usize, PnrError> {
    let c = design.cell(cell);
    let Some((site, bel)) = c.placement else {
        return Err(PnrError::Unplaced {
            cell: c.name.clone(),
        });
    };
    let desc = descriptor(c.kind);

    let mut required: Vec<SitePipId> = Vec::new();
    for rule in desc.site_pips {
        let Some(pin) = design.cell_pin(cell, rule.pin) else {
            continue;
        };
        let pin = design.pin(pin);
        if !pin.is_active() {
            continue;
        }
        let not_found = || PnrError::SitePipNotFound {
            cell: c.name.clone(),
            pin: rule.pin.to_string(),
        };
        let pip = match rule.rule {
            SitePipRule::Fixed { mux, input } => {
                Some(fabric.site_pip(site, mux, input).ok_or_else(not_found)?)
            }
            SitePipRule::FollowPath => {
                let path = fabric
                    .bel_pin_path(site, bel, desc.bel_pin(rule.pin))
                    .ok_or_else(not_found)?;
                if path.len() < 2 {
                    None
                } else {
                    let pip = match pin.direction {
                        PinDirection::Input => fabric.site_pip_between(site, &path[1], &path[0]),
                        PinDirection::Output => fabric.site_pip_between(site, &path[0], &path[1]),
                    };
                    Some(pip.ok_or_else(not_found)?)
                }
            }
        };
        if let Some(pip) = pip {
            required.push(pip);
        }
    }

    let mut selections = design
        .site_inst(site)
        .map(|inst| inst.active.clone())
        .unwrap_or_default();
    let mut added = 0;
    for pip in required {
        let def = fabric
            .site_pip_def(site, pip)
            .ok_or_else(|| PnrError::Internal(format!("SitePIP {pip} missing from its site").into()))?;
        match selections.get(&def.mux) {
            Some(&active) if active == pip => {}
            Some(&active) => {
                let active_input = fabric
                    .site_pip_def(site, active)
                    .map(|d| d.input.clone())
                    .unwrap_or_else(|| active.to_string());
                return Err(PnrError::SitePipConflict {
                    site: site_name(fabric, site),
                    mux: def.mux.clone(),
                    active: active_input,
                    requested: def.input.clone(),
                });
            }
            None => {
                selections.insert(def.mux.clone(), pip);
                added += 1;
            }
        }
    }

    let wires = selections
        .values()
        .filter_map(|&pip| fabric.site_pip_def(site, pip))
        .flat_map(|def| [def.input_wire.clone(), def.output_wire.clone()])
        .collect();
    let inst = design.site_inst_mut(site);
    inst.active = selections;
    inst.routed_wires = wires;
    design.cell_mut(cell).state = CellState::Configured;
    Ok(added)
}

fn site_name(fabric: &dyn Fabric, site: SiteId) -> String {
    fabric
        .site(site)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| site.to_string())
}

/// The diagnostic code reporting a [`configure_cell`] failure.
pub(crate) fn failure_code(err: &PnrError) -> DiagnosticCode {
    match err {
        PnrError::SitePipConflict { .. } => codes::SITE_PIP_CONFLICT,
        _ => codes::SITE_PIP_NOT_FOUND,
    }
}

/// Configures every placed cell, reporting failures per cell.
pub fn configure_sites(ctx: &mut PnrContext) -> SiteSummary {
    let mut summary = SiteSummary::default();
    for index in 0..ctx.design.cells.len() {
        let cell = CellId::from_raw(index as u32);
        let c = ctx.design.cell(cell);
        if c.kind.is_constant() || c.state == CellState::Configured {
            continue;
        }
        let name = c.name.clone();
        if c.state == CellState::Unplaced {
            ctx.sink.emit(Diagnostic::error(
                codes::CONFIGURE_UNPLACED,
                format!("cell '{name}' cannot be configured before it is placed"),
                Subject::Cell(name),
            ));
            summary.failed += 1;
            continue;
        }
        match configure_cell(ctx.fabric, &mut ctx.design, cell) {
            Ok(added) => {
                summary.configured += 1;
                summary.site_pips += added;
            }
            Err(err) => {
                ctx.sink.emit(Diagnostic::error(
                    failure_code(&err),
                    err.to_string(),
                    Subject::Cell(name),
                ));
                summary.failed += 1;
            }
        }
    }
    ctx.sink.emit(Diagnostic::note(
        codes::SITE_SUMMARY,
        format!(
            "configured {} cells with {} SitePIPs ({} failed)",
            summary.configured, summary.site_pips, summary.failed
        ),
        Subject::Design,
    ));
    summary
}
