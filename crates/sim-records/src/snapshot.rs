//! Snapshot Schema
//!
//! Row type for the per-(agent, claim) belief and state snapshots taken at
//! configured day intervals.

use serde::{Deserialize, Serialize};

/// Header line of the snapshot CSV.
pub const SNAPSHOT_CSV_HEADER: &str = "day,agent_id,claim_id,belief,state";

/// One (agent, claim) cell of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub day: u32,
    pub agent_id: u32,
    pub claim_id: u32,
    pub belief: f32,
    /// Single-letter SEDPNR state label.
    pub state: char,
}

impl SnapshotRow {
    /// Renders the row as a CSV line matching [`SNAPSHOT_CSV_HEADER`].
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{:.6},{}",
            self.day, self.agent_id, self.claim_id, self.belief, self.state
        )
    }
}
