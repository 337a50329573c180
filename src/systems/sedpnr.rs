//! SEDPNR State Machine
//!
//! Advances each (agent, claim) cell through the six-state machine once
//! per day, after the belief update so transitions see the day's new
//! belief. Candidate transitions are checked in a fixed order and the
//! first that fires wins; all draws come from the state-transition stream
//! keyed per cell, so cells are independent and reorderable.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::agents::AgentStore;
use crate::components::claims::{InfoState, SedpnrState};
use crate::components::strain::StrainRegistry;
use crate::config::Config;
use crate::rng::{RngService, Stream};
use crate::systems::SimClock;

/// Decision context for one cell, shared by the E and D branches.
struct CellView {
    belief: f32,
    exposure: f32,
    deliberation_gap: f32,
    opposing_identity: bool,
}

/// Transitions out of Exposed/Doubtful, in table order. Returns the new
/// state when a transition fires.
fn undecided_transition(
    from_exposed: bool,
    cell: &CellView,
    config: &Config,
    rng: &mut SmallRng,
) -> Option<SedpnrState> {
    let sedpnr = &config.sedpnr;
    let adoption = config.sim.adoption_threshold;

    // E -> D only; doubt is entered through deliberation conflict.
    if from_exposed
        && cell.deliberation_gap > config.belief_update.deliberation_threshold
        && rng.gen::<f32>() < sedpnr.gamma
    {
        return Some(SedpnrState::Doubtful);
    }
    if cell.belief >= adoption && rng.gen::<f32>() < sedpnr.beta_pos * cell.belief {
        return Some(SedpnrState::Positive);
    }
    if cell.belief <= 1.0 - adoption
        && cell.opposing_identity
        && rng.gen::<f32>() < sedpnr.beta_neg * (1.0 - cell.belief)
    {
        return Some(SedpnrState::Negative);
    }
    if rng.gen::<f32>() < sedpnr.mu {
        return Some(SedpnrState::Susceptible);
    }
    None
}

/// System: apply the daily SEDPNR transitions.
pub fn apply_transitions(
    clock: Res<SimClock>,
    config: Res<Config>,
    rng: Res<RngService>,
    agents: Res<AgentStore>,
    strains: Res<StrainRegistry>,
    mut info: ResMut<InfoState>,
) {
    let truth_claims = strains.truth_claims().to_vec();
    let threshold = config.belief_update.truth_protection_threshold;

    for agent in 0..info.n_agents {
        let max_truth = info.max_belief_over(agent, &truth_claims);
        for claim in 0..info.n_claims {
            let cell = info.idx(agent, claim);
            let strain = strains.active(claim);

            // Opposing identity: the claim targets someone else's group
            // and the agent is anchored in a truth claim.
            let targeted_at_agent = strain.target_cultural_group
                == Some(agents.cultural_group_id[agent]);
            let view = CellView {
                belief: info.belief[cell],
                exposure: info.exposure_today[cell],
                deliberation_gap: info.deliberation_gap[cell],
                opposing_identity: !targeted_at_agent && max_truth >= threshold,
            };

            let mut cell_rng = rng.cell_rng(
                Stream::StateTransition,
                clock.day,
                agent as u32,
                strains.claim_key(claim),
            );

            let next = match info.state[cell] {
                SedpnrState::Susceptible => {
                    // Entering E requires exposure accumulated today.
                    if view.exposure > 0.0 {
                        let p = config.sedpnr.alpha_exposure * view.exposure.tanh();
                        (cell_rng.gen::<f32>() < p).then_some(SedpnrState::Exposed)
                    } else {
                        None
                    }
                }
                SedpnrState::Exposed => {
                    undecided_transition(true, &view, &config, &mut cell_rng)
                }
                SedpnrState::Doubtful => {
                    undecided_transition(false, &view, &config, &mut cell_rng)
                }
                SedpnrState::Positive | SedpnrState::Negative => {
                    (info.share_count[cell] >= config.sim.restrained_threshold)
                        .then_some(SedpnrState::Restrained)
                }
                SedpnrState::Restrained => None,
            };

            if let Some(state) = next {
                info.state[cell] = state;
            }
        }
    }
}
