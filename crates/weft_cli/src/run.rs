//! `weft run`: the full place-and-route flow.
//!
//! 1. Find the project root and load `weft.toml`, the device and the netlist
//! 2. Apply command-line overrides to the flow settings
//! 3. Pick a checkpoint writer
//! 4. Place, configure sites, insert clock buffers and route
//! 5. Render diagnostics and a summary

use weft_config::{CheckpointFormat, FlowConfig};
use weft_diagnostics::DiagnosticSink;
use weft_pnr::{
    place_and_route, CheckpointSink, FileCheckpointWriter, FlowReport, MazeFallbackRouter,
    NullCheckpoint, PnrContext, PnrSettings,
};

use crate::pipeline::{load_inputs, render_diagnostics};
use crate::{CheckpointFormatArg, GlobalArgs, ReportFormat, RunArgs};

/// Runs the `weft run` command.
///
/// Returns exit code 0 when the flow finished without errors, 1 otherwise.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let inputs = load_inputs(global)?;
    let mut config = inputs.config;
    apply_overrides(&mut config, args);

    let mut checkpoints: Box<dyn CheckpointSink> =
        if config.checkpoints.enabled && !args.no_checkpoints {
            Box::new(FileCheckpointWriter::new(
                inputs.project_dir.join(&config.checkpoints.dir),
                format!("{}_", config.project.name),
                config.checkpoints.format,
            ))
        } else {
            Box::new(NullCheckpoint)
        };

    if !global.quiet {
        eprintln!(
            "     Placing {} (seed {})",
            inputs.design.name, config.placement.seed
        );
    }

    let sink = DiagnosticSink::new();
    let settings = PnrSettings::from_config(&config);
    let router = MazeFallbackRouter::new(settings.routing.hop_penalty);
    let mut ctx = PnrContext::new(&inputs.device, inputs.design, settings, &sink);
    let outcome = place_and_route(&mut ctx, &router, &mut *checkpoints);

    let (errors, _warnings) = render_diagnostics(&sink.take_all(), args.format, global);

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };

    if !global.quiet && args.format == ReportFormat::Text {
        print_summary(&report, &ctx, global.verbose);
    }

    Ok(if errors > 0 { 1 } else { 0 })
}

/// Folds command-line flags into the loaded configuration.
fn apply_overrides(config: &mut FlowConfig, args: &RunArgs) {
    if let Some(seed) = args.seed {
        config.placement.seed = seed;
    }
    if args.clock_only {
        config.routing.run_generic_router = false;
    }
    if let Some(format) = args.checkpoint_format {
        config.checkpoints.format = match format {
            CheckpointFormatArg::Json => CheckpointFormat::Json,
            CheckpointFormatArg::Binary => CheckpointFormat::Binary,
        };
    }
}

fn print_summary(report: &FlowReport, ctx: &PnrContext, verbose: bool) {
    let design = &ctx.design;
    eprintln!(
        "      Placed {} of {} cells ({} constrained)",
        report.placement.placed,
        design.cell_count(),
        report.placement.constrained
    );
    eprintln!(
        "  Configured {} cells, {} SitePIPs ({} failed)",
        report.sites.configured, report.sites.site_pips, report.sites.failed
    );
    if let Some(ref tree) = report.clock_tree {
        eprintln!("    Inserted {} clock buffers", tree.buffers.len());
    }
    eprintln!(
        "      Routed {} clock nets, {} other nets ({} of {} nets complete)",
        report.clock_routing.routed,
        report.generic_routed,
        design.routed_count(),
        design.net_count()
    );
    if verbose {
        for label in &report.checkpoints {
            eprintln!("  Checkpoint {label}");
        }
    }
}
