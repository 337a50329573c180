//! Run Summary
//!
//! Condenses the daily metrics and cascade logs into the end-of-run
//! summary document: peak and final adoption per claim, intervention
//! effect sizes, truth-versus-misinformation comparison, and cascade
//! structure.

use std::fs;
use std::path::Path;

use sim_records::{ClaimSummary, RunSummary};

use crate::components::strain::StrainRegistry;
use crate::config::WorldConfig;
use crate::events::CascadeLog;
use crate::output::metrics::MetricsCollector;

/// Window length (days) on each side of the intervention day used for
/// the effect size.
const INTERVENTION_WINDOW: u32 = 30;

/// Builds the run summary from collected metrics and cascades.
pub fn build_summary(
    collector: &MetricsCollector,
    strains: &StrainRegistry,
    cascades: &CascadeLog,
    world: &WorldConfig,
    steps: u32,
) -> RunSummary {
    let mut claims = Vec::with_capacity(strains.n_claims());
    for claim in 0..strains.n_claims() {
        let rows: Vec<_> = collector.claim_rows(claim as u32).collect();

        let mut peak_adoption = 0.0f64;
        let mut peak_day = 0u32;
        for row in &rows {
            if row.adoption_fraction > peak_adoption {
                peak_adoption = row.adoption_fraction;
                peak_day = row.day;
            }
        }
        let final_adoption = rows.last().map(|r| r.adoption_fraction).unwrap_or(0.0);

        let intervention_effect = world.intervention_day.map(|start| {
            let pre: Vec<f64> = rows
                .iter()
                .filter(|r| r.day < start && r.day + INTERVENTION_WINDOW >= start)
                .map(|r| r.adoption_fraction)
                .collect();
            let post: Vec<f64> = rows
                .iter()
                .filter(|r| r.day >= start && r.day < start + INTERVENTION_WINDOW)
                .map(|r| r.adoption_fraction)
                .collect();
            if pre.is_empty() || post.is_empty() {
                0.0
            } else {
                post.iter().sum::<f64>() / post.len() as f64
                    - pre.iter().sum::<f64>() / pre.len() as f64
            }
        });

        claims.push(ClaimSummary {
            claim_id: claim as u32,
            name: strains.root(claim).name.clone(),
            is_true: strains.is_true(claim),
            peak_adoption,
            peak_day,
            final_adoption,
            intervention_effect,
            cascade: cascades.query(claim).summary(),
        });
    }

    let mean_over = |truth: bool| -> f64 {
        let values: Vec<f64> = claims
            .iter()
            .filter(|c| c.is_true == truth)
            .map(|c| c.final_adoption)
            .collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };
    let truth_mean = mean_over(true);
    let misinfo_mean = mean_over(false);
    let has_truth = claims.iter().any(|c| c.is_true);
    let ratio = if has_truth && misinfo_mean > 0.0 {
        Some(truth_mean / misinfo_mean)
    } else {
        None
    };

    RunSummary {
        steps,
        claims,
        truth_final_adoption_mean: truth_mean,
        misinfo_final_adoption_mean: misinfo_mean,
        truth_to_misinfo_ratio: ratio,
    }
}

/// Writes the summary document as pretty JSON.
pub fn write_summary_json(summary: &RunSummary, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = summary
        .to_json()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    fs::write(path, json)
}
