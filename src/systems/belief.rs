//! Dual-Process Belief Updater
//!
//! Each (agent, claim) belief moves to a convex combination of a fast
//! System-1 candidate (emotional pull plus social proof) and a slow
//! System-2 candidate (credibility-weighted evidence minus skepticism).
//! A large gap between the two candidates engages deliberation, shifting
//! weight toward System 2. Motivated reasoning, debunk pressure, decay,
//! and truth protection apply afterwards; all beliefs stay in [0, 1].
//!
//! The update reads the previous day's beliefs as a consistent snapshot;
//! writes become visible to the state machine only after this phase.

use bevy_ecs::prelude::*;

use crate::components::agents::AgentStore;
use crate::components::claims::InfoState;
use crate::components::network::SocialGraph;
use crate::components::strain::StrainRegistry;
use crate::config::Config;
use crate::systems::SimClock;

/// System: advance the belief field one day.
pub fn update_beliefs(
    clock: Res<SimClock>,
    config: Res<Config>,
    agents: Res<AgentStore>,
    strains: Res<StrainRegistry>,
    graph: Res<SocialGraph>,
    mut info: ResMut<InfoState>,
) {
    let world = config.world.effective(clock.day);
    let bu = &config.belief_update;
    let previous = info.belief.clone();

    for agent in 0..info.n_agents {
        let (neighbor_ids, neighbor_weights) = graph.neighbors(agent);
        let weight_sum = graph.weight_sum(agent);

        let s1_base =
            (bu.s1_emotional_weight + bu.cognitive_load_s1_boost * agents.cognitive_load[agent])
                .clamp(0.0, 1.0);

        for claim in 0..info.n_claims {
            let cell = info.idx(agent, claim);
            let strain = strains.active(claim);
            let belief = previous[cell];

            // An agent who saw nothing of the claim today does not process
            // it; the belief only decays.
            if info.exposure_today[cell] <= 0.0 {
                info.deliberation_gap[cell] = 0.0;
                let decay = bu.base_decay * (1.0 - strain.persistence);
                info.belief[cell] = (belief - decay).clamp(0.0, 1.0);
                continue;
            }

            // Weighted neighbor mean; an agent with no peers feels no pull
            // beyond their own belief.
            let peer_mean = if weight_sum > 0.0 {
                let sum: f32 = neighbor_ids
                    .iter()
                    .zip(neighbor_weights)
                    .map(|(&j, &w)| w * previous[j as usize * info.n_claims + claim])
                    .sum();
                sum / weight_sum
            } else {
                belief
            };

            // System 1: emotional resonance plus social proof.
            let emotional = agents.emotion_match(agent, &strain.emotional_profile);
            let b1 = (belief
                + bu.learning_rate * (emotional - belief)
                + bu.social_proof_weight * peer_mean)
                .clamp(0.0, 1.0);

            // System 2: evidence pull scaled by source credibility, less
            // skepticism dampening for hard-to-check claims.
            let credibility = info.trust_signal[cell];
            let evidence = if strain.is_true {
                1.0
            } else {
                1.0 - strain.falsifiability
            };
            let b2 = (belief
                + bu.learning_rate * credibility * (evidence - belief)
                - bu.skepticism_dampening
                    * agents.skepticism[agent]
                    * (1.0 - strain.falsifiability))
                .clamp(0.0, 1.0);

            let gap = (b1 - b2).abs();
            info.deliberation_gap[cell] = gap;

            let mut s2_weight = 1.0 - s1_base;
            if gap > bu.deliberation_threshold {
                s2_weight = (s2_weight + bu.deliberation_boost).min(1.0);
            }
            let s1_weight = 1.0 - s2_weight;
            let mut updated = s1_weight * b1 + s2_weight * b2;

            // Motivated reasoning: identity-incongruent claims are held at
            // arm's length.
            let cultural_match = match strain.target_cultural_group {
                Some(group) if group == agents.cultural_group_id[agent] => 1.0,
                _ => bu.cultural_match_baseline,
            };
            if cultural_match < 1.0 {
                updated -= bu.identity_protection * (1.0 - cultural_match);
            }

            // Debunk pressure applies to misinformation only; a claim that
            // cannot be fact-checked feels none.
            if !strain.is_true && strain.falsifiability > 0.0 {
                updated -= bu.rho
                    * world.debunk_intensity
                    * strain.falsifiability
                    * (1.0 - strain.stealth);
            }

            let decay = bu.base_decay * (1.0 - strain.persistence);
            updated -= decay;

            info.belief[cell] = updated.clamp(0.0, 1.0);
        }
    }

    apply_truth_protection(&config, &strains, &mut info);
}

/// Agents convinced by a truth claim shed misinformation beliefs: a
/// multiplicative decay per protected day, or instant zeroing when the
/// strict mode is configured.
fn apply_truth_protection(config: &Config, strains: &StrainRegistry, info: &mut InfoState) {
    let bu = &config.belief_update;
    let truth_claims = strains.truth_claims();
    if truth_claims.is_empty() {
        return;
    }

    for agent in 0..info.n_agents {
        let max_truth = info.max_belief_over(agent, truth_claims);
        if max_truth < bu.truth_protection_threshold {
            continue;
        }
        for claim in 0..info.n_claims {
            if strains.is_true(claim) {
                continue;
            }
            let cell = info.idx(agent, claim);
            if bu.truth_protection_instant {
                info.belief[cell] = 0.0;
            } else {
                info.belief[cell] *= bu.decay_rate_truth_protection;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agents::N_CHANNELS;
    use crate::config::StrainSpec;
    use crate::rng::RngService;

    fn test_agents(n: usize) -> AgentStore {
        AgentStore {
            n_agents: n,
            age: vec![40; n],
            ethnicity_id: vec![0; n],
            neighborhood_id: vec![0; n],
            cultural_group_id: vec![0; n],
            skepticism: vec![0.5; n],
            conformity: vec![0.5; n],
            numeracy: vec![0.5; n],
            conspiratorial: vec![0.5; n],
            emotion_fear: vec![0.5; n],
            emotion_anger: vec![0.4; n],
            emotion_hope: vec![0.1; n],
            cognitive_load: vec![0.3; n],
            trust_gov: vec![0.55; n],
            trust_media: vec![0.5; n],
            trust_church: vec![0.45; n],
            trust_peers: vec![0.6; n],
            channel_weights: vec![[0.2; N_CHANNELS]; n],
        }
    }

    struct Setup {
        world: World,
    }

    impl Setup {
        fn new(config: Config, specs: &[StrainSpec], n_agents: usize) -> Self {
            let rng = RngService::new(1);
            let registry = StrainRegistry::load(specs, &rng).unwrap();
            let info = InfoState::new(n_agents, registry.n_claims()).unwrap();

            let mut world = World::new();
            world.insert_resource(SimClock { day: 0 });
            world.insert_resource(config);
            world.insert_resource(test_agents(n_agents));
            world.insert_resource(registry);
            world.insert_resource(SocialGraph::from_edges(n_agents, &[]));
            world.insert_resource(info);
            Self { world }
        }

        fn run(&mut self) {
            let mut schedule = Schedule::default();
            schedule.add_systems(update_beliefs);
            schedule.run(&mut self.world);
        }

        fn info(&mut self) -> Mut<'_, InfoState> {
            self.world.resource_mut::<InfoState>()
        }
    }

    fn misinfo_spec() -> StrainSpec {
        StrainSpec {
            name: "rumor".to_string(),
            topic: "health_rumor".to_string(),
            ..StrainSpec::default()
        }
    }

    fn truth_spec() -> StrainSpec {
        StrainSpec {
            name: "report".to_string(),
            topic: "health_rumor".to_string(),
            is_true: true,
            ..StrainSpec::default()
        }
    }

    #[test]
    fn test_beliefs_stay_in_unit_interval() {
        let mut setup = Setup::new(Config::default(), &[misinfo_spec()], 5);
        {
            let mut info = setup.info();
            info.belief[0] = 0.95;
            info.belief[2] = 0.01;
            for cell in 0..5 {
                info.exposure_today[cell] = 0.4;
            }
        }
        for _ in 0..10 {
            setup.run();
        }
        let info = setup.info();
        assert!(info.belief.iter().all(|b| (0.0..=1.0).contains(b)));
    }

    #[test]
    fn test_persistence_one_disables_decay() {
        // No exposure, no emotion pull beyond the first step: with
        // persistence 1 the decay term vanishes, so an isolated belief can
        // only move through learning terms, never below the S1/S2 blend.
        let mut config = Config::default();
        config.belief_update.identity_protection = 0.0;
        config.world.debunk_intensity = 0.0;
        let durable = StrainSpec {
            persistence: Some(1.0),
            ..misinfo_spec()
        };
        let fading = StrainSpec {
            name: "fading".to_string(),
            topic: "health_rumor".to_string(),
            persistence: Some(0.0),
            ..StrainSpec::default()
        };
        let mut setup = Setup::new(config, &[durable, fading], 1);
        {
            let mut info = setup.info();
            info.belief[0] = 0.5;
            info.belief[1] = 0.5;
            info.exposure_today[0] = 0.3;
            info.exposure_today[1] = 0.3;
        }
        setup.run();
        let info = setup.info();
        let durable_after = info.belief[0];
        let fading_after = info.belief[1];
        // Identical updates except the decay term.
        let expected_gap = Config::default().belief_update.base_decay;
        assert!((durable_after - fading_after - expected_gap).abs() < 1e-6);
    }

    #[test]
    fn test_debunk_pressure_misinformation_only() {
        let mut config = Config::default();
        config.world.debunk_intensity = 1.0;
        config.belief_update.rho = 1.0;

        // Two claims identical except is_true; debunk hits only the false
        // one. Falsifiability fixed so the term is large.
        let false_claim = StrainSpec {
            falsifiability: Some(1.0),
            stealth: Some(0.0),
            persistence: Some(0.75),
            ..misinfo_spec()
        };
        let mut setup = Setup::new(config, &[false_claim, truth_spec()], 1);
        {
            let mut info = setup.info();
            info.belief[0] = 0.8;
            info.belief[1] = 0.8;
            info.exposure_today[0] = 0.3;
            info.exposure_today[1] = 0.3;
        }
        setup.run();
        let info = setup.info();
        assert!(info.belief[0] < info.belief[1]);
    }

    #[test]
    fn test_zero_falsifiability_no_debunk() {
        let mut config = Config::default();
        config.world.debunk_intensity = 1.0;
        config.belief_update.rho = 1.0;
        config.belief_update.identity_protection = 0.0;

        let unfalsifiable = StrainSpec {
            falsifiability: Some(0.0),
            stealth: Some(0.0),
            ..misinfo_spec()
        };
        let falsifiable = StrainSpec {
            name: "checkable".to_string(),
            topic: "health_rumor".to_string(),
            falsifiability: Some(1.0),
            stealth: Some(0.0),
            ..StrainSpec::default()
        };
        let mut setup = Setup::new(config, &[unfalsifiable, falsifiable], 1);
        {
            let mut info = setup.info();
            info.belief[0] = 0.6;
            info.belief[1] = 0.6;
            info.exposure_today[0] = 0.3;
            info.exposure_today[1] = 0.3;
        }
        setup.run();
        let info = setup.info();
        assert!(info.belief[0] > info.belief[1]);
    }

    #[test]
    fn test_truth_protection_decays_misinformation() {
        let mut setup = Setup::new(Config::default(), &[misinfo_spec(), truth_spec()], 1);
        {
            let mut info = setup.info();
            info.belief[0] = 0.9;
            info.belief[1] = 0.95;
            info.exposure_today[0] = 0.3;
            info.exposure_today[1] = 0.3;
        }
        setup.run();
        let (after_one, truth_after) = {
            let info = setup.info();
            (info.belief[0], info.belief[1])
        };
        // The protected agent's misinformation belief shrinks faster than
        // plain decay: the protection multiplier applied on top.
        assert!(truth_after >= Config::default().belief_update.truth_protection_threshold);
        assert!(after_one < 0.9 * Config::default().belief_update.decay_rate_truth_protection + 0.05);
    }

    #[test]
    fn test_truth_protection_instant_mode() {
        let mut config = Config::default();
        config.belief_update.truth_protection_instant = true;
        let mut setup = Setup::new(config, &[misinfo_spec(), truth_spec()], 1);
        {
            let mut info = setup.info();
            info.belief[0] = 0.9;
            info.belief[1] = 0.95;
        }
        setup.run();
        let info = setup.info();
        assert_eq!(info.belief[0], 0.0);
        assert!(info.belief[1] > 0.0);
    }

    #[test]
    fn test_deliberation_gap_recorded() {
        let mut setup = Setup::new(Config::default(), &[misinfo_spec()], 2);
        {
            let mut info = setup.info();
            info.belief[0] = 0.9;
            info.trust_signal[0] = 0.9;
            info.exposure_today[0] = 0.5;
            info.exposure_today[1] = 0.5;
        }
        setup.run();
        let info = setup.info();
        assert!(info.deliberation_gap[0] >= 0.0);
        assert!(info.deliberation_gap.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_social_proof_pulls_toward_neighbors() {
        let mut config = Config::default();
        config.belief_update.identity_protection = 0.0;
        config.world.debunk_intensity = 0.0;

        let rng = RngService::new(1);
        let registry = StrainRegistry::load(&[misinfo_spec()], &rng).unwrap();
        let mut info = InfoState::new(3, 1).unwrap();
        // Agent 0 is connected to a believer (1) and isolated agent 2 is
        // the control.
        info.belief[1] = 1.0;
        for cell in 0..3 {
            info.exposure_today[cell] = 0.3;
        }

        let mut world = World::new();
        world.insert_resource(SimClock { day: 0 });
        world.insert_resource(config);
        world.insert_resource(test_agents(3));
        world.insert_resource(registry);
        world.insert_resource(SocialGraph::from_edges(3, &[(0, 1, 1.0)]));
        world.insert_resource(info);

        let mut schedule = Schedule::default();
        schedule.add_systems(update_beliefs);
        schedule.run(&mut world);

        let info = world.resource::<InfoState>();
        assert!(info.belief[0] > info.belief[2]);
    }
}
