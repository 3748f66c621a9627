//! Configuration types deserialized from `weft.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level flow configuration parsed from `weft.toml`.
///
/// Contains the input artifact paths, the tuning of every flow stage, and the
/// pin-constraint table.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// Core project metadata (name, netlist and fabric paths).
    pub project: ProjectMeta,
    /// Placer settings.
    #[serde(default)]
    pub placement: PlacementConfig,
    /// Clock buffer insertion settings.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Maze router and generic router settings.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Checkpoint persistence settings.
    #[serde(default)]
    pub checkpoints: CheckpointConfig,
    /// The pin-constraint table: top-level port name to package pin and I/O standard.
    #[serde(default)]
    pub pins: BTreeMap<String, PinAssignment>,
}

/// Core project metadata required in every `weft.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name, also used as the checkpoint file stem.
    pub name: String,
    /// The name of the top-level module in the netlist.
    #[serde(default = "default_top")]
    pub top: String,
    /// Path to the JSON netlist produced by synthesis, relative to the project directory.
    pub netlist: String,
    /// Path to the JSON device description, relative to the project directory.
    pub fabric: String,
}

fn default_top() -> String {
    "top".to_string()
}

/// Settings for the randomized legalizing placer.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementConfig {
    /// Seed for the placement PRNG. The same seed reproduces the same placement.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Maximum number of random candidate draws per cell before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Site hosting the global clock buffer.
    #[serde(default = "default_global_clock_site")]
    pub global_clock_site: String,
    /// BEL within [`global_clock_site`](Self::global_clock_site) hosting the global clock buffer.
    #[serde(default = "default_global_clock_bel")]
    pub global_clock_bel: String,
}

fn default_seed() -> u64 {
    6
}

fn default_max_attempts() -> u32 {
    10_000
}

fn default_global_clock_site() -> String {
    "BUFGCTRL_X0Y16".to_string()
}

fn default_global_clock_bel() -> String {
    "BUFGCTRL".to_string()
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_attempts: default_max_attempts(),
            global_clock_site: default_global_clock_site(),
            global_clock_bel: default_global_clock_bel(),
        }
    }
}

/// Settings for clock buffer insertion.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Name of the clock net to split into buffered branches.
    #[serde(default = "default_clock_net")]
    pub net: String,
    /// Whether to insert per-load clock buffers at all.
    #[serde(default = "default_true")]
    pub insert_buffers: bool,
    /// Name prefix for inserted buffer cells; the load index is appended.
    #[serde(default = "default_buffer_prefix")]
    pub buffer_prefix: String,
}

fn default_clock_net() -> String {
    "clk".to_string()
}

fn default_buffer_prefix() -> String {
    "bufhce_".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            net: default_clock_net(),
            insert_buffers: true,
            buffer_prefix: default_buffer_prefix(),
        }
    }
}

/// Settings for the maze router and the generic router hand-off.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Weight of a node's hop depth in the search cost.
    #[serde(default = "default_hop_penalty")]
    pub hop_penalty: f64,
    /// Whether routed clock nets are locked before the generic router runs.
    #[serde(default = "default_true")]
    pub lock_clock_routes: bool,
    /// Whether the generic router runs after clock routing.
    #[serde(default = "default_true")]
    pub run_generic_router: bool,
    /// Whether clock nets are unlocked again once the generic router is done.
    #[serde(default = "default_true")]
    pub unlock_after_generic: bool,
}

fn default_hop_penalty() -> f64 {
    0.125
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            hop_penalty: default_hop_penalty(),
            lock_clock_routes: true,
            run_generic_router: true,
            unlock_after_generic: true,
        }
    }
}

/// Settings for checkpoint persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    /// Whether checkpoints are written at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Output directory, relative to the project directory.
    #[serde(default = "default_checkpoint_dir")]
    pub dir: String,
    /// Serialization format.
    #[serde(default)]
    pub format: CheckpointFormat,
}

fn default_checkpoint_dir() -> String {
    "checkpoints".to_string()
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_checkpoint_dir(),
            format: CheckpointFormat::default(),
        }
    }
}

/// Serialization format of checkpoint files.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointFormat {
    /// Pretty-printed JSON (default).
    #[default]
    Json,
    /// Compact binary encoding.
    Binary,
}

impl CheckpointFormat {
    /// Returns the file extension used for this format.
    pub fn extension(self) -> &'static str {
        match self {
            CheckpointFormat::Json => "json",
            CheckpointFormat::Binary => "bin",
        }
    }
}

/// A single pin assignment mapping a top-level port to a package pin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinAssignment {
    /// The package pin identifier (e.g., "E3").
    pub pin: String,
    /// The I/O electrical standard (e.g., "LVCMOS33").
    #[serde(default = "default_io_standard")]
    pub io_standard: String,
}

fn default_io_standard() -> String {
    "LVCMOS33".to_string()
}

impl PinAssignment {
    /// Creates a pin assignment with an explicit I/O standard.
    pub fn new(pin: impl Into<String>, io_standard: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            io_standard: io_standard.into(),
        }
    }
}
