//! Synthetic Population
//!
//! Generates the town's agents: ages from the configured child/senior
//! fractions, cultural groups from the population mix, traits as
//! averaged-uniform draws centered at 0.5, trust as jittered baselines,
//! and channel weights shaped by age. Also seeds the initial believers
//! for each claim.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::agents::{AgentStore, Channel, N_CHANNELS};
use crate::components::claims::{InfoState, SedpnrState};
use crate::components::strain::StrainRegistry;
use crate::config::Config;
use crate::events::CascadeLog;
use crate::rng::{RngService, Stream};

/// Trust baselines jittered per agent.
mod trust_constants {
    pub const GOV_BASELINE: f32 = 0.55;
    pub const MEDIA_BASELINE: f32 = 0.5;
    pub const CHURCH_BASELINE: f32 = 0.45;
    pub const PEERS_BASELINE: f32 = 0.6;
    pub const VARIANCE: f32 = 0.12;
}

/// Belief given to initially seeded agents.
const SEED_BELIEF: f32 = 0.85;

/// Normal-ish trait draw: the average of two uniforms, clamped away from
/// the extremes.
fn rand_trait(rng: &mut SmallRng) -> f32 {
    let a: f32 = rng.gen();
    let b: f32 = rng.gen();
    ((a + b) / 2.0).clamp(0.05, 0.95)
}

/// Baseline plus uniform jitter, clamped to the unit interval.
fn jittered(rng: &mut SmallRng, baseline: f32) -> f32 {
    let jitter = (rng.gen::<f32>() - 0.5) * 2.0 * trust_constants::VARIANCE;
    (baseline + jitter).clamp(0.0, 1.0)
}

/// Draws an age respecting the child and senior fractions.
fn draw_age(rng: &mut SmallRng, children_fraction: f32, senior_fraction: f32) -> u32 {
    let u: f32 = rng.gen();
    if u < children_fraction {
        rng.gen_range(0..18)
    } else if u < children_fraction + senior_fraction {
        rng.gen_range(65..91)
    } else {
        rng.gen_range(18..65)
    }
}

/// Draws a cultural group from the configured mix.
fn draw_cultural_group(rng: &mut SmallRng, mix: &[f32; 4]) -> u8 {
    let total: f32 = mix.iter().sum();
    let mut u = rng.gen::<f32>() * total.max(f32::EPSILON);
    for (group, &fraction) in mix.iter().enumerate() {
        if u < fraction {
            return group as u8;
        }
        u -= fraction;
    }
    3
}

/// Channel weights shaped by age: older agents lean on TV and local
/// news, younger ones barely touch either. Weights are scaled to sum to
/// 0.9, leaving headroom below one.
fn channel_weights(rng: &mut SmallRng, age: u32) -> [f32; N_CHANNELS] {
    let mut weights = [0.0f32; N_CHANNELS];
    weights[Channel::Tv.index()] = 0.30;
    weights[Channel::LocalNews.index()] = 0.25;
    weights[Channel::Gov.index()] = 0.15;
    weights[Channel::Church.index()] = 0.20;

    if age < 35 {
        weights[Channel::Tv.index()] *= 0.6;
        weights[Channel::LocalNews.index()] *= 0.7;
        weights[Channel::Church.index()] *= 0.6;
    } else if age >= 65 {
        weights[Channel::Tv.index()] *= 1.4;
        weights[Channel::LocalNews.index()] *= 1.3;
        weights[Channel::Church.index()] *= 1.2;
    }
    for w in weights.iter_mut() {
        *w *= 0.85 + 0.3 * rng.gen::<f32>();
    }

    let sum: f32 = weights.iter().sum();
    let scale = 0.9 / sum.max(f32::EPSILON);
    for w in weights.iter_mut() {
        *w *= scale;
    }
    weights
}

/// Builds the complete agent store from the town configuration.
pub fn generate_population(config: &Config, rng: &RngService) -> AgentStore {
    let n = config.sim.n_agents;
    let town = &config.town;
    let mut stream = rng.stream(Stream::TraitJitter, 0);

    let mut store = AgentStore {
        n_agents: n,
        ..AgentStore::default()
    };

    for _ in 0..n {
        let age = draw_age(&mut stream, town.children_fraction, town.senior_fraction);
        let group = draw_cultural_group(&mut stream, &town.cultural_mix);

        store.age.push(age);
        store.ethnicity_id.push(group);
        store.neighborhood_id.push(stream.gen_range(0..town.n_neighborhoods.max(1)) as u16);
        store.cultural_group_id.push(group);

        store.skepticism.push(rand_trait(&mut stream));
        store.conformity.push(rand_trait(&mut stream));
        store.numeracy.push(rand_trait(&mut stream));
        store.conspiratorial.push(rand_trait(&mut stream));
        store.emotion_fear.push(rand_trait(&mut stream));
        store.emotion_anger.push(rand_trait(&mut stream));
        store.emotion_hope.push(rand_trait(&mut stream));
        store.cognitive_load.push(rand_trait(&mut stream));

        store.trust_gov.push(jittered(&mut stream, trust_constants::GOV_BASELINE));
        store.trust_media.push(jittered(&mut stream, trust_constants::MEDIA_BASELINE));
        store.trust_church.push(jittered(&mut stream, trust_constants::CHURCH_BASELINE));
        store.trust_peers.push(jittered(&mut stream, trust_constants::PEERS_BASELINE));

        store.channel_weights.push(channel_weights(&mut stream, age));
    }

    store
}

/// Seeds each claim's initial believers: a `seed_fraction` sample of
/// agents receives the seed belief, enters the Positive state, and gets a
/// root cascade event. The sample is keyed by strain name, so a claim's
/// seed set does not depend on its position in the strain list.
pub fn seed_claims(
    config: &Config,
    rng: &RngService,
    strains: &StrainRegistry,
    info: &mut InfoState,
    cascades: &mut CascadeLog,
) {
    let n = info.n_agents;
    let per_claim = ((config.sim.seed_fraction * n as f32).round() as usize).max(1).min(n);

    for claim in 0..info.n_claims {
        let mut stream = rng.cell_rng(Stream::Seeding, 0, 0, strains.claim_key(claim));
        let mut agents: Vec<usize> = (0..n).collect();
        agents.shuffle(&mut stream);

        for &agent in agents.iter().take(per_claim) {
            let cell = info.idx(agent, claim);
            info.belief[cell] = SEED_BELIEF;
            info.state[cell] = SedpnrState::Positive;
            let event = cascades.seed(claim as u32, agent as u32, 0);
            info.last_share_event[cell] = Some((event, agent as u32));
        }
    }
}
