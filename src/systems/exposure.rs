//! Exposure Engine
//!
//! Assigns each (agent, claim) cell its daily exposure intensity from
//! three sources: institutional channels weighted by the agent's media
//! diet, the algorithmic feed, and yesterday's neighbor shares (already
//! accumulated into the inbox buffer by the sharing phase). Every term is
//! scaled by the strain's moderation evasion factor and, for targeted
//! claims, the cultural identity bonus. Exposure is assigned, never
//! carried across days.

use bevy_ecs::prelude::*;

use crate::components::agents::{AgentStore, Channel};
use crate::components::claims::InfoState;
use crate::components::strain::{identity_constants, Strain, StrainRegistry};
use crate::config::Config;
use crate::systems::SimClock;

/// Moral and spiritual topics get extra pull through church channels.
const CHURCH_TOPIC_BONUS: f32 = 0.35;

/// Guard against division by zero when normalizing the trust signal.
const TRUST_EPSILON: f32 = 1e-6;

/// Institutional exposure for one agent: memeticity-scaled, channel
/// weighted reach with topic affinity, amplified by emotional resonance.
fn institutional_term(
    agents: &AgentStore,
    agent: usize,
    strain: &Strain,
    emotion_sensitivity: f32,
    truth_campaign_intensity: f32,
) -> f32 {
    let weights = &agents.channel_weights[agent];
    let mut channel_sum = 0.0;
    for channel in Channel::ALL {
        let mut affinity = channel.topic_affinity(&strain.topic);
        if channel == Channel::Church && strain.is_moral_or_spiritual() {
            affinity *= 1.0 + CHURCH_TOPIC_BONUS;
        }
        channel_sum += weights[channel.index()] * channel.reach() * affinity;
    }
    let resonance = 1.0
        + agents.emotion_match(agent, &strain.emotional_profile) * emotion_sensitivity;
    let mut term = strain.memeticity * channel_sum * resonance;

    // Coordinated campaigns push truthful claims through trusted
    // institutional channels.
    if strain.is_true {
        term += truth_campaign_intensity
            * (agents.trust_gov[agent] * Channel::Gov.reach()
                + agents.trust_media[agent] * Channel::LocalNews.reach());
    }
    term
}

/// Algorithmic feed term; identical for all agents of a claim.
fn feed_term(strain: &Strain, algorithmic_amplification: f32, outrage_amplification: f32, feed_injection_rate: f32) -> f32 {
    algorithmic_amplification
        * strain.memeticity
        * (1.0 + outrage_amplification * strain.emotional_profile.anger)
        * feed_injection_rate
}

/// System: compute today's exposure and the trust-weighted credibility
/// signal for every (agent, claim) cell.
pub fn compute_exposure(
    clock: Res<SimClock>,
    config: Res<Config>,
    agents: Res<AgentStore>,
    strains: Res<StrainRegistry>,
    mut info: ResMut<InfoState>,
) {
    let world = config.world.effective(clock.day);
    let emotion_sensitivity = config.sharing.emotion_sensitivity;

    for claim in 0..info.n_claims {
        let strain = strains.active(claim);
        let evasion = strain.evasion(world.moderation_strictness);
        let feed = feed_term(
            strain,
            world.algorithmic_amplification,
            world.outrage_amplification,
            world.feed_injection_rate,
        );

        for agent in 0..info.n_agents {
            let cell = info.idx(agent, claim);
            let institutional = institutional_term(
                &agents,
                agent,
                strain,
                emotion_sensitivity,
                world.truth_campaign_intensity,
            );
            let peer = info.inbox[cell];
            info.inbox[cell] = 0.0;

            let cultural_bonus = match strain.target_cultural_group {
                Some(group) if group == agents.cultural_group_id[agent] => {
                    1.0 + identity_constants::identity_bonus(group as usize)
                }
                _ => 1.0,
            };

            let total = (institutional + feed + peer) * evasion * cultural_bonus;
            info.exposure_today[cell] = total.max(0.0);

            // Credibility of what reached the agent: institutional terms
            // carry institutional trust, feed and peer terms peer trust.
            // Evasion and cultural scaling cancel out of the ratio.
            let raw_total = institutional + feed + peer;
            info.trust_signal[cell] = (institutional * agents.institutional_trust(agent)
                + (feed + peer) * agents.trust_peers[agent])
                / (raw_total + TRUST_EPSILON);
        }
    }
}
