//! Sharing Sampler
//!
//! Draws one Bernoulli per spreading (agent, claim) cell from the share
//! stream, keyed by (seed, day, agent, claim) so the draw is independent
//! of evaluation order. A successful share increments the share count,
//! appends a cascade event parented to the share that exposed the agent,
//! and deposits weighted exposure into every neighbor's next-day buffer
//! unless moderation removes the share first.

use bevy_ecs::prelude::*;

use sim_records::ShareChannel;

use crate::components::agents::AgentStore;
use crate::components::claims::{InfoState, SedpnrState};
use crate::components::strain::{Strain, StrainRegistry};
use crate::config::{Config, SharingConfig, WorldConfig};
use crate::events::CascadeLog;
use crate::components::network::SocialGraph;
use crate::rng::{RngService, Stream};
use crate::systems::SimClock;

/// Share probability for one spreading cell.
pub fn share_probability(
    sharing: &SharingConfig,
    world: &WorldConfig,
    strain: &Strain,
    age: u32,
    emotion_match: f32,
) -> f32 {
    let p = sharing.base_share_rate
        * strain.virality
        * sharing.age_multipliers.for_age(age)
        * (1.0 + sharing.emotion_sensitivity * emotion_match)
        * strain.evasion(world.moderation_strictness);
    p.clamp(0.0, 1.0)
}

/// Probability that moderation removes a sampled share before it reaches
/// the sharer's neighbors.
pub fn removal_probability(world: &WorldConfig, strain: &Strain) -> f32 {
    (world.moderation_strictness * strain.violation_risk * (1.0 - strain.stealth)).clamp(0.0, 1.0)
}

/// System: sample today's shares, feed the cascade log and the next-day
/// exposure buffers.
pub fn sample_shares(
    clock: Res<SimClock>,
    config: Res<Config>,
    rng: Res<RngService>,
    agents: Res<AgentStore>,
    strains: Res<StrainRegistry>,
    graph: Res<SocialGraph>,
    mut info: ResMut<InfoState>,
    mut cascades: ResMut<CascadeLog>,
) {
    let world = config.world.effective(clock.day);
    let day = clock.day;

    for agent in 0..info.n_agents {
        for claim in 0..info.n_claims {
            let cell = info.idx(agent, claim);
            let state = info.state[cell];
            if !state.is_spreading() {
                continue;
            }
            let strain = strains.active(claim);
            let p = share_probability(
                &config.sharing,
                &world,
                strain,
                agents.age[agent],
                agents.emotion_match(agent, &strain.emotional_profile),
            );
            if rng.draw(Stream::Share, day, agent as u32, strains.claim_key(claim)) >= f64::from(p)
            {
                continue;
            }

            info.share_count[cell] += 1;
            let channel = match state {
                SedpnrState::Negative => ShareChannel::Negative,
                _ => ShareChannel::Positive,
            };
            let (parent_id, exposer) = match info.last_share_event[cell] {
                Some((event, source)) => (Some(event), source),
                None => (None, agent as u32),
            };
            let event_id = cascades.append(
                day,
                claim as u32,
                exposer,
                agent as u32,
                parent_id,
                channel,
            );

            // Moderation may pull the share down before anyone sees it;
            // the event and count remain, the reach does not.
            let removed = rng.draw(Stream::Moderation, day, agent as u32, strains.claim_key(claim))
                < f64::from(removal_probability(&world, strain));
            if removed {
                continue;
            }

            let (neighbor_ids, neighbor_weights) = graph.neighbors(agent);
            for (&neighbor, &weight) in neighbor_ids.iter().zip(neighbor_weights) {
                let neighbor_cell = info.idx(neighbor as usize, claim);
                info.inbox[neighbor_cell] += weight * strain.virality;
                info.last_share_event[neighbor_cell] = Some((event_id, agent as u32));
            }
        }
    }
}
