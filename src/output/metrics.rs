//! Daily Metrics
//!
//! Collects one row per (day, claim) at the end of each simulated day:
//! adoption, belief distribution statistics, R-effective from the
//! cascades, and the SEDPNR population counts.

use bevy_ecs::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;

use sim_records::{DailyMetricsRow, METRICS_CSV_HEADER};

use crate::components::claims::InfoState;
use crate::config::Config;
use crate::events::CascadeLog;
use crate::systems::SimClock;

/// Number of histogram bins used for the belief entropy.
const ENTROPY_BINS: usize = 10;

/// Resource accumulating metric rows over the run.
#[derive(Resource, Debug, Default)]
pub struct MetricsCollector {
    pub rows: Vec<DailyMetricsRow>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows belonging to one claim, in day order.
    pub fn claim_rows(&self, claim: u32) -> impl Iterator<Item = &DailyMetricsRow> {
        self.rows.iter().filter(move |r| r.claim_id == claim)
    }
}

/// Mean, population standard deviation, and histogram entropy of one
/// claim's belief column.
fn belief_stats(info: &InfoState, claim: usize) -> (f64, f64, f64) {
    let n = info.n_agents;
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }

    let mut sum = 0.0f64;
    let mut bins = [0u64; ENTROPY_BINS];
    for agent in 0..n {
        let b = f64::from(info.belief[info.idx(agent, claim)]);
        sum += b;
        let bin = ((b * ENTROPY_BINS as f64) as usize).min(ENTROPY_BINS - 1);
        bins[bin] += 1;
    }
    let mean = sum / n as f64;

    let mut variance = 0.0f64;
    for agent in 0..n {
        let b = f64::from(info.belief[info.idx(agent, claim)]);
        variance += (b - mean) * (b - mean);
    }
    variance /= n as f64;

    let mut entropy = 0.0f64;
    for &count in &bins {
        if count > 0 {
            let p = count as f64 / n as f64;
            entropy -= p * p.ln();
        }
    }

    (mean, variance.sqrt(), entropy)
}

/// System: append today's metric rows. Runs last in the day schedule.
pub fn record_daily_metrics(
    clock: Res<SimClock>,
    config: Res<Config>,
    info: Res<InfoState>,
    cascades: Res<CascadeLog>,
    mut collector: ResMut<MetricsCollector>,
) {
    for claim in 0..info.n_claims {
        let (mean_belief, polarization, entropy) = belief_stats(&info, claim);
        collector.rows.push(DailyMetricsRow {
            day: clock.day,
            claim_id: claim as u32,
            adoption_fraction: info.adoption_fraction(claim, config.sim.adoption_threshold),
            mean_belief,
            polarization,
            entropy,
            r_effective: cascades.r_effective(claim, clock.day, config.world.generation_lag),
            states: info.state_counts(claim),
        });
    }
}

/// Writes the collected rows as CSV.
pub fn write_metrics_csv(rows: &[DailyMetricsRow], path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", METRICS_CSV_HEADER)?;
    for row in rows {
        writeln!(file, "{}", row.to_csv_row())?;
    }
    Ok(())
}
