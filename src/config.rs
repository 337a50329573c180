//! Configuration System
//!
//! Loads all tuning parameters from a TOML file. Every section rejects
//! unknown keys, and every numeric field has a documented literal default,
//! so a run is fully described by (config file, seed). Emotion presets and
//! the truth/misinformation default tables live here; strain specs are
//! resolved against them by the strain registry at load time.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{SimError, SimResult};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level configuration structure.
#[derive(Resource, Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sim: SimConfig,
    pub belief_update: BeliefUpdateConfig,
    pub sharing: SharingConfig,
    pub world: WorldConfig,
    pub sedpnr: SedpnrConfig,
    pub town: TownConfig,
    pub network: NetworkConfig,
    pub strains: Vec<StrainSpec>,
}

/// Compute device requested for the vectorized kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Cpu,
    Gpu,
    Auto,
}

/// Core run parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of simulated days.
    pub steps: u32,
    pub n_agents: usize,
    pub seed: u64,
    /// Belief level at which an agent counts as having adopted a claim.
    pub adoption_threshold: f32,
    /// Positive shares after which a spreader becomes restrained.
    pub restrained_threshold: u32,
    /// Fraction of agents initially seeded with each claim.
    pub seed_fraction: f32,
    /// Days between full belief/state snapshots.
    pub snapshot_interval: u32,
    pub device: Device,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 60,
            n_agents: 1000,
            seed: 42,
            adoption_threshold: 0.75,
            restrained_threshold: 3,
            seed_fraction: 0.01,
            snapshot_interval: 30,
            device: Device::Cpu,
        }
    }
}

/// Dual-process belief update coefficients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeliefUpdateConfig {
    pub learning_rate: f32,
    pub social_proof_weight: f32,
    pub skepticism_dampening: f32,
    /// Per-day decay before persistence adjustment.
    pub base_decay: f32,
    /// Correction effectiveness multiplier on debunk pressure.
    pub rho: f32,
    /// |b1 - b2| gap above which System 2 engages.
    pub deliberation_threshold: f32,
    /// Extra System-2 weight when deliberation engages.
    pub deliberation_boost: f32,
    pub s1_emotional_weight: f32,
    pub cognitive_load_s1_boost: f32,
    /// Belief penalty scale for identity-incongruent claims.
    pub identity_protection: f32,
    /// Cultural-match value for claims not targeting the agent's group.
    pub cultural_match_baseline: f32,
    /// Truth belief at which misinformation protection activates.
    pub truth_protection_threshold: f32,
    /// Daily multiplier applied to misinformation beliefs of protected agents.
    pub decay_rate_truth_protection: f32,
    /// Zero misinformation beliefs immediately instead of decaying them.
    pub truth_protection_instant: bool,
}

impl Default for BeliefUpdateConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.15,
            social_proof_weight: 0.22,
            skepticism_dampening: 0.4,
            base_decay: 0.02,
            rho: 0.25,
            deliberation_threshold: 0.4,
            deliberation_boost: 0.25,
            s1_emotional_weight: 0.4,
            cognitive_load_s1_boost: 0.3,
            identity_protection: 0.1,
            cultural_match_baseline: 0.55,
            truth_protection_threshold: 0.75,
            decay_rate_truth_protection: 0.92,
            truth_protection_instant: false,
        }
    }
}

/// Age-band share multipliers. Seniors share roughly seven times as often
/// as young adults; children share half as often.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgeMultipliers {
    pub under_18: f32,
    pub from_18_to_34: f32,
    pub from_35_to_54: f32,
    pub from_55_to_64: f32,
    pub over_65: f32,
}

impl Default for AgeMultipliers {
    fn default() -> Self {
        Self {
            under_18: 0.5,
            from_18_to_34: 1.0,
            from_35_to_54: 2.0,
            from_55_to_64: 4.0,
            over_65: 7.0,
        }
    }
}

impl AgeMultipliers {
    /// Multiplier for an agent of the given age in years.
    pub fn for_age(&self, age: u32) -> f32 {
        match age {
            0..=17 => self.under_18,
            18..=34 => self.from_18_to_34,
            35..=54 => self.from_35_to_54,
            55..=64 => self.from_55_to_64,
            _ => self.over_65,
        }
    }
}

/// Sharing behavior parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharingConfig {
    pub base_share_rate: f32,
    pub emotion_sensitivity: f32,
    pub age_multipliers: AgeMultipliers,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            base_share_rate: 0.015,
            emotion_sensitivity: 0.5,
            age_multipliers: AgeMultipliers::default(),
        }
    }
}

/// Mid-run intervention kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Moderation,
    Debunk,
}

/// Platform and institutional environment parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub moderation_strictness: f32,
    pub algorithmic_amplification: f32,
    pub outrage_amplification: f32,
    pub feed_injection_rate: f32,
    pub debunk_intensity: f32,
    pub truth_campaign_intensity: f32,
    /// Day lag used when computing R-effective from the cascades.
    pub generation_lag: u32,
    /// Day on which the intervention (if any) activates.
    pub intervention_day: Option<u32>,
    pub intervention_type: Option<InterventionType>,
    /// Relative boost applied to the intervened parameter.
    pub intervention_strength: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            moderation_strictness: 0.5,
            algorithmic_amplification: 0.3,
            outrage_amplification: 0.2,
            feed_injection_rate: 0.15,
            debunk_intensity: 0.25,
            truth_campaign_intensity: 0.3,
            generation_lag: 1,
            intervention_day: None,
            intervention_type: None,
            intervention_strength: 0.0,
        }
    }
}

impl WorldConfig {
    /// World parameters in effect on the given day, with any active
    /// intervention applied.
    pub fn effective(&self, day: u32) -> WorldConfig {
        let mut world = self.clone();
        if let (Some(start), Some(kind)) = (self.intervention_day, self.intervention_type) {
            if day >= start {
                match kind {
                    InterventionType::Moderation => {
                        world.moderation_strictness = (self.moderation_strictness
                            * (1.0 + self.intervention_strength))
                            .min(1.0);
                    }
                    InterventionType::Debunk => {
                        world.debunk_intensity =
                            (self.debunk_intensity * (1.0 + self.intervention_strength)).min(1.0);
                    }
                }
            }
        }
        world
    }
}

/// SEDPNR transition rates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SedpnrConfig {
    /// Scale on tanh(exposure) for the S -> E transition.
    pub alpha_exposure: f32,
    /// E -> D rate when deliberation engages.
    pub gamma: f32,
    /// E,D -> P rate scale.
    pub beta_pos: f32,
    /// E,D -> N rate scale.
    pub beta_neg: f32,
    /// E,D -> S recovery rate.
    pub mu: f32,
}

impl Default for SedpnrConfig {
    fn default() -> Self {
        Self {
            alpha_exposure: 0.9,
            gamma: 0.4,
            beta_pos: 0.6,
            beta_neg: 0.5,
            mu: 0.05,
        }
    }
}

/// Synthetic town shape parameters, consumed by the population generator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TownConfig {
    pub n_neighborhoods: usize,
    pub household_size_mean: f32,
    pub household_size_std: f32,
    pub workplace_size_mean: f32,
    pub school_size_mean: f32,
    pub church_size_mean: f32,
    pub church_attendance_rate: f32,
    pub children_fraction: f32,
    pub senior_fraction: f32,
    /// Population fractions of the four cultural groups.
    pub cultural_mix: [f32; 4],
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            n_neighborhoods: 5,
            household_size_mean: 3.0,
            household_size_std: 1.0,
            workplace_size_mean: 18.0,
            school_size_mean: 22.0,
            church_size_mean: 40.0,
            church_attendance_rate: 0.25,
            children_fraction: 0.22,
            senior_fraction: 0.16,
            cultural_mix: [0.55, 0.20, 0.15, 0.10],
        }
    }
}

/// Per-layer contact weights for the multilayer social graph.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayerWeights {
    pub family: f32,
    pub workplace: f32,
    pub school: f32,
    pub church: f32,
    pub neighborhood: f32,
}

impl Default for LayerWeights {
    fn default() -> Self {
        Self {
            family: 1.6,
            workplace: 1.1,
            school: 1.0,
            church: 1.2,
            neighborhood: 0.8,
        }
    }
}

/// Network generation parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub layer_weights: LayerWeights,
    /// Mean random contacts per agent within their neighborhood.
    pub neighborhood_mean_degree: f32,
    /// Largest group size wired as a full clique; larger groups are
    /// sparsified to this many contacts per member.
    pub max_clique_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layer_weights: LayerWeights::default(),
            neighborhood_mean_degree: 4.0,
            max_clique_size: 12,
        }
    }
}

/// Emotional fingerprint of a strain.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmotionProfile {
    pub fear: f32,
    pub anger: f32,
    pub hope: f32,
}

/// Emotion profile as written in a config file: a preset name, the
/// literal `"random"`, or explicit values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EmotionSpec {
    Preset(String),
    Profile(EmotionProfile),
}

/// One strain as written in a config file. Unspecified numeric fields
/// fall to the truth or general-misinformation default table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrainSpec {
    pub name: String,
    pub topic: String,
    pub memeticity: Option<f32>,
    pub emotional_profile: Option<EmotionSpec>,
    pub falsifiability: Option<f32>,
    pub stealth: Option<f32>,
    pub virality: Option<f32>,
    pub mutation_rate: Option<f32>,
    pub violation_risk: Option<f32>,
    pub persistence: Option<f32>,
    pub is_true: bool,
    /// Explicit cultural target (-1 for none); inferred from the name
    /// when absent.
    pub target_cultural_group: Option<i8>,
}

/// Numeric defaults applied to unspecified strain fields.
#[derive(Debug, Clone, Copy)]
pub struct StrainDefaults {
    pub memeticity: f32,
    pub virality: f32,
    pub falsifiability: f32,
    pub stealth: f32,
    pub mutation_rate: f32,
    pub violation_risk: f32,
    pub persistence: f32,
}

/// Defaults for general misinformation. False news spreads roughly six
/// times as readily as truth; the virality ratio preserves that.
pub const MISINFORMATION_DEFAULTS: StrainDefaults = StrainDefaults {
    memeticity: 0.25,
    virality: 0.3,
    falsifiability: 0.40,
    stealth: 0.55,
    mutation_rate: 0.06,
    violation_risk: 0.35,
    persistence: 0.25,
};

/// Defaults for truthful claims: fully verifiable, transparent, slow.
pub const TRUTH_DEFAULTS: StrainDefaults = StrainDefaults {
    memeticity: 0.08,
    virality: 0.05,
    falsifiability: 1.0,
    stealth: 0.0,
    mutation_rate: 0.0,
    violation_risk: 0.0,
    persistence: 0.75,
};

/// Misinformation emotion presets. The `"random"` spec draws from this
/// subset only.
pub const MISINFORMATION_PRESETS: &[(&str, EmotionProfile)] = &[
    ("fear_panic", EmotionProfile { fear: 0.65, anger: 0.25, hope: 0.10 }),
    ("anger_outrage", EmotionProfile { fear: 0.30, anger: 0.60, hope: 0.10 }),
    ("balanced_negative", EmotionProfile { fear: 0.50, anger: 0.40, hope: 0.10 }),
    ("conspiracy", EmotionProfile { fear: 0.40, anger: 0.55, hope: 0.05 }),
    ("stealth_moderate", EmotionProfile { fear: 0.35, anger: 0.35, hope: 0.30 }),
];

/// Truth emotion presets.
pub const TRUTH_PRESETS: &[(&str, EmotionProfile)] = &[
    ("truth_factual", EmotionProfile { fear: 0.05, anger: 0.00, hope: 0.55 }),
    ("truth_neutral", EmotionProfile { fear: 0.10, anger: 0.00, hope: 0.20 }),
];

/// Looks up a preset by name across both tables.
pub fn lookup_preset(name: &str) -> Option<EmotionProfile> {
    MISINFORMATION_PRESETS
        .iter()
        .chain(TRUTH_PRESETS.iter())
        .find(|(preset, _)| *preset == name)
        .map(|(_, profile)| *profile)
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SimError::Config(format!("cannot read config: {}", e)))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks range constraints and strain-list consistency.
    pub fn validate(&self) -> SimResult<()> {
        if self.sim.steps == 0 {
            return Err(SimError::Config("sim.steps must be at least 1".to_string()));
        }
        if self.sim.n_agents == 0 {
            return Err(SimError::Config("sim.n_agents must be at least 1".to_string()));
        }
        let unit_fields = [
            ("sim.adoption_threshold", self.sim.adoption_threshold),
            ("sim.seed_fraction", self.sim.seed_fraction),
            ("belief_update.learning_rate", self.belief_update.learning_rate),
            ("belief_update.base_decay", self.belief_update.base_decay),
            ("belief_update.rho", self.belief_update.rho),
            ("belief_update.s1_emotional_weight", self.belief_update.s1_emotional_weight),
            (
                "belief_update.decay_rate_truth_protection",
                self.belief_update.decay_rate_truth_protection,
            ),
            ("sharing.base_share_rate", self.sharing.base_share_rate),
            ("world.moderation_strictness", self.world.moderation_strictness),
            ("world.feed_injection_rate", self.world.feed_injection_rate),
            ("world.debunk_intensity", self.world.debunk_intensity),
            ("sedpnr.alpha_exposure", self.sedpnr.alpha_exposure),
            ("sedpnr.gamma", self.sedpnr.gamma),
            ("sedpnr.beta_pos", self.sedpnr.beta_pos),
            ("sedpnr.beta_neg", self.sedpnr.beta_neg),
            ("sedpnr.mu", self.sedpnr.mu),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(SimError::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.world.intervention_day.is_some() && self.world.intervention_type.is_none() {
            return Err(SimError::Config(
                "world.intervention_day requires world.intervention_type".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for spec in &self.strains {
            if !seen.insert(spec.name.as_str()) {
                return Err(SimError::Config(format!(
                    "duplicate strain name: {}",
                    spec.name
                )));
            }
            if let Some(EmotionSpec::Preset(name)) = &spec.emotional_profile {
                if name != "random" && lookup_preset(name).is_none() {
                    return Err(SimError::Config(format!(
                        "unknown emotion preset: {}",
                        name
                    )));
                }
            }
            if let Some(group) = spec.target_cultural_group {
                if !(-1..=3).contains(&group) {
                    return Err(SimError::Config(format!(
                        "strain {}: target_cultural_group must be -1..=3",
                        spec.name
                    )));
                }
            }
            for (field, value) in [
                ("memeticity", spec.memeticity),
                ("falsifiability", spec.falsifiability),
                ("stealth", spec.stealth),
                ("mutation_rate", spec.mutation_rate),
                ("violation_risk", spec.violation_risk),
                ("persistence", spec.persistence),
            ] {
                if let Some(v) = value {
                    if !(0.0..=1.0).contains(&v) || !v.is_finite() {
                        return Err(SimError::Config(format!(
                            "strain {}: {} must lie in [0, 1]",
                            spec.name, field
                        )));
                    }
                }
            }
            if let Some(v) = spec.virality {
                if v <= 0.0 || !v.is_finite() {
                    return Err(SimError::Config(format!(
                        "strain {}: virality must be positive",
                        spec.name
                    )));
                }
            }
        }
        Ok(())
    }
}
