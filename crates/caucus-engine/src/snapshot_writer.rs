//! Callback that writes a network snapshot after every tick or step.
//!
//! Files land in the configured directory as `network_{tick}.json` for the
//! flat model and `nested_{step}.json` for the nested model, ticks
//! zero-padded to five digits. A failed write is logged and skipped; the
//! run continues.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use caucus_agents::{NestedModel, NestedStepReport};
use caucus_core::runner::{NestedCallback, TickCallback};
use caucus_core::snapshot::{congress_snapshot, nested_snapshot};
use caucus_core::tick::{SimulationState, TickSummary};
use caucus_types::{NetworkSnapshot, PolicyPoint};
use tracing::{debug, warn};

use crate::error::EngineError;

/// Writes snapshots to a directory, or does nothing when none is set.
pub struct SnapshotWriter {
    dir: Option<PathBuf>,
    written: u64,
    failed: u64,
}

impl SnapshotWriter {
    /// Create a writer, creating the directory if needed.
    pub fn new(dir: Option<PathBuf>) -> Result<Self, EngineError> {
        if let Some(path) = &dir {
            std::fs::create_dir_all(path).map_err(|source| EngineError::SnapshotDir {
                path: path.clone(),
                source,
            })?;
        }
        Ok(Self {
            dir,
            written: 0,
            failed: 0,
        })
    }

    /// Snapshots written so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Snapshots that failed to write.
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    fn write(&mut self, prefix: &str, snapshot: &NetworkSnapshot) {
        let Some(dir) = &self.dir else { return };
        let path = dir.join(format!("{prefix}_{:05}.json", snapshot.tick));
        match write_json(&path, snapshot) {
            Ok(()) => {
                self.written = self.written.saturating_add(1);
                debug!(path = %path.display(), nodes = snapshot.nodes.len(), "Snapshot written");
            }
            Err(e) => {
                self.failed = self.failed.saturating_add(1);
                warn!(path = %path.display(), error = %e, "Failed to write snapshot");
            }
        }
    }
}

fn write_json(path: &Path, snapshot: &NetworkSnapshot) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, snapshot)?;
    out.flush()
}

impl<P: PolicyPoint> TickCallback<P> for SnapshotWriter {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState<P>) {
        if self.dir.is_some() {
            let snapshot = congress_snapshot(&state.congress, summary.tick);
            self.write("network", &snapshot);
        }
    }
}

impl<P: PolicyPoint> NestedCallback<P> for SnapshotWriter {
    fn on_step(&mut self, report: &NestedStepReport, model: &NestedModel<P>) {
        if self.dir.is_some() {
            let snapshot = nested_snapshot(model, report.tick);
            self.write("nested", &snapshot);
        }
    }
}
