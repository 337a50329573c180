//! Daily Metrics Schema
//!
//! Row types for the per-day, per-claim metrics table. Formatting is fixed
//! to six decimal places so that identical runs produce byte-identical
//! output files.

use serde::{Deserialize, Serialize};

/// Header line of the daily metrics CSV.
pub const METRICS_CSV_HEADER: &str = "day,claim_id,adoption_fraction,mean_belief,polarization,entropy,r_effective,count_s,count_e,count_d,count_p,count_n,count_r";

/// Per-state population counts for one (day, claim).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub susceptible: u32,
    pub exposed: u32,
    pub doubtful: u32,
    pub positive: u32,
    pub negative: u32,
    pub restrained: u32,
}

impl StateCounts {
    /// Total population covered by the counts.
    pub fn total(&self) -> u32 {
        self.susceptible
            + self.exposed
            + self.doubtful
            + self.positive
            + self.negative
            + self.restrained
    }
}

/// One row of the daily metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricsRow {
    pub day: u32,
    pub claim_id: u32,
    /// Fraction of agents with belief at or above the adoption threshold.
    pub adoption_fraction: f64,
    pub mean_belief: f64,
    /// Population standard deviation of belief.
    pub polarization: f64,
    /// Shannon entropy of the 10-bin belief histogram.
    pub entropy: f64,
    /// Mean out-degree of share events one generation lag back.
    pub r_effective: f64,
    pub states: StateCounts,
}

impl DailyMetricsRow {
    /// Renders the row as a CSV line matching [`METRICS_CSV_HEADER`].
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{},{},{},{},{},{}",
            self.day,
            self.claim_id,
            self.adoption_fraction,
            self.mean_belief,
            self.polarization,
            self.entropy,
            self.r_effective,
            self.states.susceptible,
            self.states.exposed,
            self.states.doubtful,
            self.states.positive,
            self.states.negative,
            self.states.restrained,
        )
    }
}
