//! Shared plumbing for the commands: locating the project, loading its
//! inputs, and rendering diagnostics.

use std::path::{Path, PathBuf};

use weft_config::{FlowConfig, CONFIG_FILE_NAME};
use weft_diagnostics::{Diagnostic, DiagnosticRenderer, Severity, TerminalRenderer};
use weft_fabric::{load_device, Device};
use weft_pnr::{load_netlist, Design};

use crate::{GlobalArgs, ReportFormat};

/// Everything a command needs from the project directory.
pub struct Inputs {
    /// The directory holding `weft.toml`; relative paths resolve against it.
    pub project_dir: PathBuf,
    /// The validated configuration.
    pub config: FlowConfig,
    /// The target device.
    pub device: Device,
    /// The loaded netlist.
    pub design: Design,
}

/// Walks up from `start` looking for a directory containing `weft.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(CONFIG_FILE_NAME).is_file() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project directory from `--config` or the working directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads the configuration, honouring an explicit `--config` file.
pub fn load_flow_config(
    global: &GlobalArgs,
    project_dir: &Path,
) -> Result<FlowConfig, Box<dyn std::error::Error>> {
    let explicit = global
        .config
        .as_ref()
        .map(PathBuf::from)
        .filter(|p| p.is_file());
    let config = match explicit {
        Some(path) => weft_config::load_config_file(&path)?,
        None => weft_config::load_config(project_dir)?,
    };
    Ok(config)
}

/// Loads configuration, device and netlist.
pub fn load_inputs(global: &GlobalArgs) -> Result<Inputs, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_flow_config(global, &project_dir)?;

    let fabric_path = project_dir.join(&config.project.fabric);
    let device = load_device(&fabric_path)
        .map_err(|e| format!("{}: {e}", fabric_path.display()))?;
    let netlist_path = project_dir.join(&config.project.netlist);
    let design = load_netlist(&netlist_path)
        .map_err(|e| format!("{}: {e}", netlist_path.display()))?;

    if !global.quiet {
        eprintln!(
            "    Loaded {} ({} cells, {} nets) for {}",
            design.name,
            design.cell_count(),
            design.net_count(),
            weft_fabric::Fabric::device_name(&device)
        );
        if design.name != config.project.top {
            eprintln!(
                "warning: netlist top '{}' differs from project.top '{}'",
                design.name, config.project.top
            );
        }
    }

    Ok(Inputs {
        project_dir,
        config,
        device,
        design,
    })
}

/// Prints diagnostics and returns `(errors, warnings)`.
///
/// Text output hides notes unless `--verbose` is set; JSON output carries
/// everything.
pub fn render_diagnostics(
    diagnostics: &[Diagnostic],
    format: ReportFormat,
    global: &GlobalArgs,
) -> (usize, usize) {
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in diagnostics {
                let shown = match diag.severity {
                    Severity::Error => true,
                    Severity::Warning => !global.quiet,
                    Severity::Note => global.verbose && !global.quiet,
                };
                if shown {
                    eprintln!("{}", renderer.render(diag));
                }
            }
        }
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(diagnostics).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    (errors, warnings)
}

/// Writes a small but complete project into `dir`: one slice, one bonded
/// I/O site, the global clock buffer and one local clock buffer, all hanging
/// off a single interconnect switch, plus a one-bit toggle netlist.
#[cfg(test)]
pub(crate) fn write_test_project(dir: &Path, config_extra: &str) {
    use serde_json::json;

    let sites = vec![
        json!({ "name": "SLICE_X0Y0", "site_type": "SLICEL", "col": 0, "row": 0 }),
        json!({ "name": "IOB_X0Y1", "site_type": "IOB33", "col": 0, "row": 1, "package_pin": "E3" }),
        json!({ "name": "BUFGCTRL_X0Y16", "site_type": "BUFGCTRL", "col": 1, "row": 1 }),
        json!({ "name": "BUFHCE_X0Y0", "site_type": "BUFHCE", "col": 1, "row": 0 }),
    ];
    let mut outputs: Vec<(&str, String)> = vec![
        ("IOB_X0Y1", "I".into()),
        ("BUFGCTRL_X0Y16", "O".into()),
        ("BUFHCE_X0Y0", "O".into()),
    ];
    let mut inputs: Vec<(&str, String)> = vec![
        ("IOB_X0Y1", "O".into()),
        ("BUFGCTRL_X0Y16", "I0".into()),
        ("BUFHCE_X0Y0", "I".into()),
        ("BUFHCE_X0Y0", "CE".into()),
    ];
    for x in ["A", "B", "C", "D"] {
        outputs.push(("SLICE_X0Y0", format!("{x}MUX")));
        outputs.push(("SLICE_X0Y0", format!("{x}Q")));
        inputs.push(("SLICE_X0Y0", format!("{x}X")));
        for k in 1..=6 {
            inputs.push(("SLICE_X0Y0", format!("{x}{k}")));
        }
    }
    for pin in ["CLK", "CE", "SR"] {
        inputs.push(("SLICE_X0Y0", pin.to_string()));
    }

    let mut nodes = vec![json!({ "name": "INT_X0Y0", "col": 0, "row": 0 })];
    let mut edges = Vec::new();
    let mut site_pins = Vec::new();
    for (site, pin) in &outputs {
        let node = format!("{site}/{pin}");
        nodes.push(json!({ "name": node, "col": 0, "row": 0 }));
        edges.push(json!([node, "INT_X0Y0"]));
        site_pins.push(json!({ "site": site, "pin": pin, "node": node }));
    }
    for (site, pin) in &inputs {
        let node = format!("{site}/{pin}");
        nodes.push(json!({ "name": node, "col": 0, "row": 0 }));
        edges.push(json!(["INT_X0Y0", node]));
        site_pins.push(json!({ "site": site, "pin": pin, "node": node }));
    }
    let device = json!({
        "name": "weft-test",
        "sites": sites,
        "nodes": nodes,
        "edges": edges,
        "site_pins": site_pins,
    });

    let netlist = json!({
        "top": "toggle",
        "ports": [{ "name": "i_clk", "direction": "input" }],
        "cells": [
            { "name": "i_clk_IBUF_inst", "type": "IBUF" },
            { "name": "i_clk_IBUF_BUFG_inst", "type": "BUFGCTRL" },
            { "name": "q_reg", "type": "FDRE" },
            { "name": "q_i_1", "type": "LUT1", "properties": { "INIT": "2'h1" } }
        ],
        "nets": [
            { "name": "i_clk", "pins": [
                { "port": "i_clk" },
                { "cell": "i_clk_IBUF_inst", "pin": "I", "direction": "input" }
            ] },
            { "name": "i_clk_IBUF", "pins": [
                { "cell": "i_clk_IBUF_inst", "pin": "O", "direction": "output" },
                { "cell": "i_clk_IBUF_BUFG_inst", "pin": "I0", "direction": "input" }
            ] },
            { "name": "clk", "pins": [
                { "cell": "i_clk_IBUF_BUFG_inst", "pin": "O", "direction": "output" },
                { "cell": "q_reg", "pin": "C", "direction": "input" }
            ] },
            { "name": "q", "pins": [
                { "cell": "q_reg", "pin": "Q", "direction": "output" },
                { "cell": "q_i_1", "pin": "I0", "direction": "input" }
            ] },
            { "name": "d", "pins": [
                { "cell": "q_i_1", "pin": "O", "direction": "output" },
                { "cell": "q_reg", "pin": "D", "direction": "input" }
            ] }
        ]
    });

    std::fs::write(dir.join("fabric.json"), device.to_string()).unwrap();
    std::fs::write(dir.join("toggle.json"), netlist.to_string()).unwrap();
    std::fs::write(
        dir.join(CONFIG_FILE_NAME),
        format!(
            r#"[project]
name = "toggle"
top = "toggle"
netlist = "toggle.json"
fabric = "fabric.json"

[pins.i_clk]
pin = "E3"
{config_extra}
"#
        ),
    )
    .unwrap();
}
