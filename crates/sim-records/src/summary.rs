//! Run Summary Schema
//!
//! Types for the end-of-run summary document: per-claim adoption history,
//! cascade structure, and truth-versus-misinformation comparisons.

use serde::{Deserialize, Serialize};

/// Structural summary of one claim's cascade forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeSummary {
    /// Total share events recorded for the claim.
    pub events: usize,
    /// Longest root-to-leaf path, in generations.
    pub depth: u32,
    /// Largest single-event fanout.
    pub max_breadth: u32,
    /// Mean pairwise distance between events in the cascade trees.
    pub structural_virality: f64,
}

/// Per-claim summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub claim_id: u32,
    pub name: String,
    pub is_true: bool,
    pub peak_adoption: f64,
    pub peak_day: u32,
    pub final_adoption: f64,
    /// Post-minus-pre mean adoption around the intervention day, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention_effect: Option<f64>,
    pub cascade: CascadeSummary,
}

/// Whole-run summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: u32,
    pub claims: Vec<ClaimSummary>,
    pub truth_final_adoption_mean: f64,
    pub misinfo_final_adoption_mean: f64,
    /// Truth over misinformation final adoption; absent when undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truth_to_misinfo_ratio: Option<f64>,
}

impl RunSummary {
    /// Serializes the summary as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_roundtrip() {
        let summary = RunSummary {
            steps: 30,
            claims: vec![ClaimSummary {
                claim_id: 0,
                name: "silver_river".to_string(),
                is_true: false,
                peak_adoption: 0.28,
                peak_day: 19,
                final_adoption: 0.22,
                intervention_effect: None,
                cascade: CascadeSummary {
                    events: 412,
                    depth: 7,
                    max_breadth: 9,
                    structural_virality: 4.2,
                },
            }],
            truth_final_adoption_mean: 0.0,
            misinfo_final_adoption_mean: 0.22,
            truth_to_misinfo_ratio: None,
        };

        let json = summary.to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }

    #[test]
    fn test_absent_ratio_omitted() {
        let summary = RunSummary {
            steps: 1,
            claims: Vec::new(),
            truth_final_adoption_mean: 0.0,
            misinfo_final_adoption_mean: 0.0,
            truth_to_misinfo_ratio: None,
        };
        assert!(!summary.to_json().unwrap().contains("truth_to_misinfo_ratio"));
    }
}
