//! Design snapshots written at pipeline milestones.
//!
//! Checkpoints exist for inspection. Nothing in the flow reads them back.

use crate::data::Design;
use std::fmt;
use std::path::{Path, PathBuf};
use weft_common::{ContentHash, InternalError, WeftResult};
use weft_config::CheckpointFormat;

/// A point in the flow at which the design is snapshotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Milestone {
    /// Netlist loaded, nothing placed.
    Loaded,
    /// Every cell placed.
    Placed,
    /// Site-internal routing committed.
    SitesConfigured,
    /// Clock buffers inserted and clock nets routed and locked.
    ClockRouted,
    /// The generic router has run.
    Routed,
}

impl Milestone {
    /// All milestones in flow order.
    pub const ALL: [Milestone; 5] = [
        Milestone::Loaded,
        Milestone::Placed,
        Milestone::SitesConfigured,
        Milestone::ClockRouted,
        Milestone::Routed,
    ];

    /// The position of this milestone in the flow, starting at 0.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Milestone::Loaded => "loaded",
            Milestone::Placed => "placed",
            Milestone::SitesConfigured => "sites configured",
            Milestone::ClockRouted => "clock routed",
            Milestone::Routed => "routed",
        };
        f.write_str(name)
    }
}

/// Receives a snapshot of the design at each milestone.
pub trait CheckpointSink {
    /// Persists `design` and returns a label describing where it went.
    fn write(&mut self, milestone: Milestone, design: &Design) -> WeftResult<String>;
}

/// Discards every checkpoint.
#[derive(Debug, Default)]
pub struct NullCheckpoint;

impl CheckpointSink for NullCheckpoint {
    fn write(&mut self, milestone: Milestone, _design: &Design) -> WeftResult<String> {
        Ok(format!("{milestone} (discarded)"))
    }
}

/// Writes `<stem><n>.<ext>` files into a directory, `n` being the
/// milestone's index.
#[derive(Debug, Clone)]
pub struct FileCheckpointWriter {
    dir: PathBuf,
    stem: String,
    format: CheckpointFormat,
}

impl FileCheckpointWriter {
    /// Creates a writer. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, format: CheckpointFormat) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            format,
        }
    }

    /// Returns the file a milestone is written to.
    pub fn path_for(&self, milestone: Milestone) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            self.stem,
            milestone.index(),
            self.format.extension()
        ))
    }
}

impl CheckpointSink for FileCheckpointWriter {
    fn write(&mut self, milestone: Milestone, design: &Design) -> WeftResult<String> {
        let bytes = encode(design, self.format)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            InternalError::new(format!("cannot create {}: {e}", self.dir.display()))
        })?;
        let path = self.path_for(milestone);
        std::fs::write(&path, &bytes)
            .map_err(|e| InternalError::new(format!("cannot write {}: {e}", path.display())))?;
        Ok(format!(
            "{} [{}]",
            path.display(),
            ContentHash::from_bytes(&bytes).short()
        ))
    }
}

fn encode(design: &Design, format: CheckpointFormat) -> WeftResult<Vec<u8>> {
    match format {
        CheckpointFormat::Json => serde_json::to_vec_pretty(design)
            .map_err(|e| InternalError::new(format!("checkpoint encoding failed: {e}"))),
        CheckpointFormat::Binary => {
            bincode::serde::encode_to_vec(design, bincode::config::standard())
                .map_err(|e| InternalError::new(format!("checkpoint encoding failed: {e}")))
        }
    }
}

/// Reads a checkpoint back, choosing the decoder from the file extension.
pub fn load_checkpoint(path: &Path) -> WeftResult<Design> {
    let bytes = std::fs::read(path)
        .map_err(|e| InternalError::new(format!("cannot read {}: {e}", path.display())))?;
    let binary = path.extension().is_some_and(|ext| ext == "bin");
    let mut design: Design = if binary {
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .map(|(design, _)| design)
            .map_err(|e| InternalError::new(format!("invalid checkpoint {}: {e}", path.display())))?
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| InternalError::new(format!("invalid checkpoint {}: {e}", path.display())))?
    };
    design.rebuild_indices();
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn milestone_indices_follow_flow_order() {
        let indices: Vec<usize> = Milestone::ALL.iter().map(|m| m.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(Milestone::SitesConfigured.to_string(), "sites configured");
    }

    #[test]
    fn json_checkpoint_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileCheckpointWriter::new(dir.path().join("cp"), "counter_", CheckpointFormat::Json);
        let design = fixtures::counter_design(2);
        let label = writer.write(Milestone::Placed, &design).unwrap();

        let path = dir.path().join("cp").join("counter_1.json");
        assert!(label.starts_with(&path.display().to_string()));
        let back = load_checkpoint(&path).unwrap();
        assert_eq!(back.cell_count(), design.cell_count());
        assert_eq!(back.net_by_name("clk"), design.net_by_name("clk"));
    }

    #[test]
    fn binary_checkpoint_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileCheckpointWriter::new(dir.path(), "cp", CheckpointFormat::Binary);
        let design = fixtures::counter_design(1);
        writer.write(Milestone::Routed, &design).unwrap();
        let back = load_checkpoint(&writer.path_for(Milestone::Routed)).unwrap();
        assert!(back.cell_by_name("q_reg[0]").is_some());
        assert_eq!(back.pins.len(), design.pins.len());
    }

    #[test]
    fn same_design_same_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileCheckpointWriter::new(dir.path(), "cp", CheckpointFormat::Json);
        let design = fixtures::counter_design(1);
        let a = writer.write(Milestone::Loaded, &design).unwrap();
        let b = writer.write(Milestone::Loaded, &design).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let mut writer = FileCheckpointWriter::new(&blocker, "cp", CheckpointFormat::Json);
        let err = writer
            .write(Milestone::Loaded, &fixtures::counter_design(1))
            .unwrap_err();
        assert!(err.to_string().contains("cannot create"));
    }

    #[test]
    fn null_checkpoint_discards() {
        let label = NullCheckpoint
            .write(Milestone::ClockRouted, &fixtures::counter_design(1))
            .unwrap();
        assert_eq!(label, "clock routed (discarded)");
    }
}
