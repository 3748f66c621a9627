//! Weft CLI: runs clock-aware place and route on a synthesized netlist.
//!
//! Provides `weft run` for the full flow and `weft check` for validating a
//! project's inputs and pin constraints without placing anything.

#![warn(missing_docs)]

mod check;
mod pipeline;
mod run;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Weft: clock-aware physical implementation for a programmable fabric.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about = "Weft place and route")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show progress notes and per-stage statistics.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `weft.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place, configure and route the project's netlist.
    Run(RunArgs),
    /// Load the project's inputs and check pin constraints.
    Check(CheckArgs),
}

/// Arguments for the `weft run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Override the placement seed from `weft.toml`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not write checkpoints.
    #[arg(long)]
    pub no_checkpoints: bool,

    /// Override the checkpoint encoding from `weft.toml`.
    #[arg(long, value_enum)]
    pub checkpoint_format: Option<CheckpointFormatArg>,

    /// Skip the generic router; only clock nets are routed.
    #[arg(long)]
    pub clock_only: bool,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `weft check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Checkpoint encoding selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CheckpointFormatArg {
    /// Pretty-printed JSON.
    Json,
    /// Compact binary.
    Binary,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print notes and statistics.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => atty_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Rough terminal detection from the `TERM` environment variable.
fn atty_is_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term != "dumb")
}
