//! Per-Claim Information State
//!
//! N×K row-major arrays holding every agent's relationship to every claim:
//! continuous belief, SEDPNR label, cumulative share count, today's
//! exposure, and the scratch fields the phases hand to each other. Writers
//! finish a phase before the next phase reads; the day loop validates the
//! whole store at each day boundary.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use sim_records::{SnapshotRow, StateCounts};

use crate::error::{SimError, SimResult};

/// Information status of one agent with respect to one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SedpnrState {
    Susceptible,
    Exposed,
    Doubtful,
    Positive,
    Negative,
    Restrained,
}

impl SedpnrState {
    /// Single-letter label used in snapshots.
    pub fn as_char(self) -> char {
        match self {
            SedpnrState::Susceptible => 'S',
            SedpnrState::Exposed => 'E',
            SedpnrState::Doubtful => 'D',
            SedpnrState::Positive => 'P',
            SedpnrState::Negative => 'N',
            SedpnrState::Restrained => 'R',
        }
    }

    /// True for the two actively-spreading states.
    pub fn is_spreading(self) -> bool {
        matches!(self, SedpnrState::Positive | SedpnrState::Negative)
    }
}

/// Mutable per-(agent, claim) simulation state.
#[derive(Resource, Debug, Clone)]
pub struct InfoState {
    pub n_agents: usize,
    pub n_claims: usize,

    /// Continuous credence in [0, 1].
    pub belief: Vec<f32>,
    pub state: Vec<SedpnrState>,
    /// Cumulative positive shares; never decreases.
    pub share_count: Vec<u32>,
    /// Exposure intensity assigned by the exposure phase each day.
    pub exposure_today: Vec<f32>,
    /// Peer contributions accumulated for the next day by the sharing phase.
    pub inbox: Vec<f32>,
    /// Trust-weighted credibility of today's exposure (exposure -> belief).
    pub trust_signal: Vec<f32>,
    /// |b1 - b2| from the dual-process update (belief -> state machine).
    pub deliberation_gap: Vec<f32>,
    /// Most recent share that exposed this cell, as (event id, sharing
    /// agent), for genealogy.
    pub last_share_event: Vec<Option<(u64, u32)>>,
}

impl InfoState {
    /// Allocates a store for `n_agents` x `n_claims` cells.
    pub fn new(n_agents: usize, n_claims: usize) -> SimResult<Self> {
        let cells = n_agents.checked_mul(n_claims).ok_or_else(|| {
            SimError::Resource(format!(
                "state arrays for {} agents x {} claims overflow",
                n_agents, n_claims
            ))
        })?;
        Ok(Self {
            n_agents,
            n_claims,
            belief: vec![0.0; cells],
            state: vec![SedpnrState::Susceptible; cells],
            share_count: vec![0; cells],
            exposure_today: vec![0.0; cells],
            inbox: vec![0.0; cells],
            trust_signal: vec![0.0; cells],
            deliberation_gap: vec![0.0; cells],
            last_share_event: vec![None; cells],
        })
    }

    /// Flat index of (agent, claim).
    #[inline]
    pub fn idx(&self, agent: usize, claim: usize) -> usize {
        agent * self.n_claims + claim
    }

    /// Largest belief the agent holds in any of the given claims.
    pub fn max_belief_over(&self, agent: usize, claims: &[usize]) -> f32 {
        claims
            .iter()
            .map(|&c| self.belief[self.idx(agent, c)])
            .fold(0.0, f32::max)
    }

    /// Per-state population counts for one claim.
    pub fn state_counts(&self, claim: usize) -> StateCounts {
        let mut counts = StateCounts::default();
        for agent in 0..self.n_agents {
            match self.state[self.idx(agent, claim)] {
                SedpnrState::Susceptible => counts.susceptible += 1,
                SedpnrState::Exposed => counts.exposed += 1,
                SedpnrState::Doubtful => counts.doubtful += 1,
                SedpnrState::Positive => counts.positive += 1,
                SedpnrState::Negative => counts.negative += 1,
                SedpnrState::Restrained => counts.restrained += 1,
            }
        }
        counts
    }

    /// Fraction of agents whose belief in the claim reaches the threshold.
    pub fn adoption_fraction(&self, claim: usize, threshold: f32) -> f64 {
        if self.n_agents == 0 {
            return 0.0;
        }
        let adopters = (0..self.n_agents)
            .filter(|&agent| self.belief[self.idx(agent, claim)] >= threshold)
            .count();
        adopters as f64 / self.n_agents as f64
    }

    /// Full belief/state snapshot in (agent, claim) order.
    pub fn snapshot_rows(&self, day: u32) -> Vec<SnapshotRow> {
        let mut rows = Vec::with_capacity(self.n_agents * self.n_claims);
        for agent in 0..self.n_agents {
            for claim in 0..self.n_claims {
                let cell = self.idx(agent, claim);
                rows.push(SnapshotRow {
                    day,
                    agent_id: agent as u32,
                    claim_id: claim as u32,
                    belief: self.belief[cell],
                    state: self.state[cell].as_char(),
                });
            }
        }
        rows
    }

    /// Day-boundary validation: beliefs in range and finite, exposures
    /// finite and non-negative, restrained agents actually past the share
    /// threshold. Returns the first offending cell.
    pub fn validate(&self, day: u32, restrained_threshold: u32) -> SimResult<()> {
        for agent in 0..self.n_agents {
            for claim in 0..self.n_claims {
                let cell = self.idx(agent, claim);
                let belief = self.belief[cell];
                if !belief.is_finite() {
                    return Err(SimError::Numeric {
                        day,
                        agent: agent as u32,
                        claim: claim as u32,
                        detail: format!("belief is {}", belief),
                    });
                }
                if !(0.0..=1.0).contains(&belief) {
                    return Err(SimError::Invariant {
                        day,
                        agent: agent as u32,
                        claim: claim as u32,
                        detail: format!("belief {} outside [0, 1]", belief),
                    });
                }
                let exposure = self.exposure_today[cell];
                if !exposure.is_finite() {
                    return Err(SimError::Numeric {
                        day,
                        agent: agent as u32,
                        claim: claim as u32,
                        detail: format!("exposure is {}", exposure),
                    });
                }
                if exposure < 0.0 {
                    return Err(SimError::Invariant {
                        day,
                        agent: agent as u32,
                        claim: claim as u32,
                        detail: format!("exposure {} negative", exposure),
                    });
                }
                if self.state[cell] == SedpnrState::Restrained
                    && self.share_count[cell] < restrained_threshold
                {
                    return Err(SimError::Invariant {
                        day,
                        agent: agent as u32,
                        claim: claim as u32,
                        detail: format!(
                            "restrained with share count {} below threshold {}",
                            self.share_count[cell], restrained_threshold
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_chars() {
        assert_eq!(SedpnrState::Susceptible.as_char(), 'S');
        assert_eq!(SedpnrState::Restrained.as_char(), 'R');
        assert!(SedpnrState::Positive.is_spreading());
        assert!(SedpnrState::Negative.is_spreading());
        assert!(!SedpnrState::Doubtful.is_spreading());
    }

    #[test]
    fn test_new_store_all_susceptible() {
        let info = InfoState::new(10, 3).unwrap();
        let counts = info.state_counts(1);
        assert_eq!(counts.susceptible, 10);
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_indexing_row_major() {
        let info = InfoState::new(4, 3).unwrap();
        assert_eq!(info.idx(0, 0), 0);
        assert_eq!(info.idx(0, 2), 2);
        assert_eq!(info.idx(1, 0), 3);
        assert_eq!(info.idx(3, 2), 11);
    }

    #[test]
    fn test_adoption_fraction() {
        let mut info = InfoState::new(4, 1).unwrap();
        info.belief[0] = 0.9;
        info.belief[1] = 0.75;
        info.belief[2] = 0.5;
        assert_eq!(info.adoption_fraction(0, 0.75), 0.5);
    }

    #[test]
    fn test_max_belief_over() {
        let mut info = InfoState::new(1, 3).unwrap();
        info.belief[0] = 0.2;
        info.belief[1] = 0.8;
        info.belief[2] = 0.4;
        assert_eq!(info.max_belief_over(0, &[0, 2]), 0.4);
        assert_eq!(info.max_belief_over(0, &[0, 1, 2]), 0.8);
        assert_eq!(info.max_belief_over(0, &[]), 0.0);
    }

    #[test]
    fn test_validate_detects_out_of_range_belief() {
        let mut info = InfoState::new(2, 2).unwrap();
        info.belief[3] = 1.5;
        let err = info.validate(7, 3).unwrap_err();
        match err {
            SimError::Invariant { day, agent, claim, .. } => {
                assert_eq!((day, agent, claim), (7, 1, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_validate_detects_nan() {
        let mut info = InfoState::new(1, 1).unwrap();
        info.belief[0] = f32::NAN;
        assert!(matches!(
            info.validate(0, 3),
            Err(SimError::Numeric { .. })
        ));
    }

    #[test]
    fn test_validate_restrained_threshold() {
        let mut info = InfoState::new(1, 1).unwrap();
        info.state[0] = SedpnrState::Restrained;
        info.share_count[0] = 1;
        assert!(info.validate(0, 3).is_err());
        info.share_count[0] = 3;
        assert!(info.validate(0, 3).is_ok());
    }

    #[test]
    fn test_snapshot_rows_order() {
        let info = InfoState::new(2, 2).unwrap();
        let rows = info.snapshot_rows(5);
        assert_eq!(rows.len(), 4);
        assert_eq!((rows[0].agent_id, rows[0].claim_id), (0, 0));
        assert_eq!((rows[3].agent_id, rows[3].claim_id), (1, 1));
        assert!(rows.iter().all(|r| r.day == 5 && r.state == 'S'));
    }
}
