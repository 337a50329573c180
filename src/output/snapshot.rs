//! Belief Snapshots
//!
//! Full per-(agent, claim) belief and state dumps, taken on day zero, at
//! the configured interval, and on the final day.

use bevy_ecs::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;

use sim_records::{SnapshotRow, SNAPSHOT_CSV_HEADER};

use crate::components::claims::InfoState;

/// Resource accumulating snapshot rows over the run.
#[derive(Resource, Debug, Default)]
pub struct SnapshotCollector {
    pub rows: Vec<SnapshotRow>,
}

impl SnapshotCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given day is a snapshot day.
    pub fn due(day: u32, interval: u32, steps: u32) -> bool {
        day == 0 || day + 1 == steps || (interval > 0 && (day + 1) % interval == 0)
    }

    /// Appends a full snapshot of the information state.
    pub fn record(&mut self, day: u32, info: &InfoState) {
        self.rows.extend(info.snapshot_rows(day));
    }

    /// Days present in the collected snapshots, in order.
    pub fn days(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self.rows.iter().map(|r| r.day).collect();
        days.dedup();
        days
    }
}

/// Writes the collected snapshot rows as CSV.
pub fn write_snapshot_csv(rows: &[SnapshotRow], path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", SNAPSHOT_CSV_HEADER)?;
    for row in rows {
        writeln!(file, "{}", row.to_csv_row())?;
    }
    Ok(())
}
