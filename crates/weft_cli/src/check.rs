//! `weft check`: validates a project without placing anything.
//!
//! Loads `weft.toml`, the device and the netlist, then cross-checks the
//! pin-constraint table against both.

use weft_diagnostics::DiagnosticSink;
use weft_pnr::validate_constraints;

use crate::pipeline::{load_inputs, render_diagnostics};
use crate::{CheckArgs, GlobalArgs};

/// Runs the `weft check` command.
///
/// Returns exit code 0 if every constraint resolves, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let inputs = load_inputs(global)?;

    let sink = DiagnosticSink::new();
    validate_constraints(&inputs.device, &inputs.design, &inputs.config.pins, &sink);

    let (errors, warnings) = render_diagnostics(&sink.take_all(), args.format, global);

    if !global.quiet {
        if errors > 0 {
            eprintln!(
                "error: {} constraint error(s), {} warning(s)",
                errors, warnings
            );
        } else {
            eprintln!("    Finished {} constraint(s) ok", inputs.config.pins.len());
        }
    }

    Ok(if errors > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::write_test_project;
    use crate::ReportFormat;
    use std::path::Path;
    use tempfile::TempDir;

    fn global_for(dir: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.to_str().unwrap().to_string()),
        }
    }

    fn check(dir: &Path) -> i32 {
        let args = CheckArgs {
            format: ReportFormat::Text,
        };
        run(&args, &global_for(dir)).unwrap()
    }

    #[test]
    fn clean_project_passes() {
        let tmp = TempDir::new().unwrap();
        write_test_project(tmp.path(), "");
        assert_eq!(check(tmp.path()), 0);
    }

    #[test]
    fn constraint_for_missing_port_fails() {
        let tmp = TempDir::new().unwrap();
        write_test_project(tmp.path(), "\n[pins.o_led]\npin = \"E3\"\n");
        assert_eq!(check(tmp.path()), 1);
    }

    #[test]
    fn check_writes_no_checkpoints() {
        let tmp = TempDir::new().unwrap();
        write_test_project(tmp.path(), "");
        check(tmp.path());
        assert!(!tmp.path().join("checkpoints").exists());
    }

    #[test]
    fn broken_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(weft_config::CONFIG_FILE_NAME), "[project\n").unwrap();
        let args = CheckArgs {
            format: ReportFormat::Json,
        };
        assert!(run(&args, &global_for(tmp.path())).is_err());
    }
}
