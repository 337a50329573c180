//! Strain Registry
//!
//! Resolved strain records and their mutation lineages. Each claim index
//! owns one lineage: the original strain plus any mutated children. The
//! newest child is the "active" strain whose properties drive every
//! per-day computation; metrics always aggregate to the claim index, so
//! mutations never allocate new claims.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::config::{
    lookup_preset, EmotionProfile, EmotionSpec, StrainSpec, MISINFORMATION_DEFAULTS,
    MISINFORMATION_PRESETS, TRUTH_DEFAULTS,
};
use crate::error::{SimError, SimResult};
use crate::rng::{RngService, Stream};

/// Identity-targeting constants. Claims aimed at an agent's own cultural
/// group land harder; the effect scales with how salient group identity
/// is for that group.
pub mod identity_constants {
    /// Susceptibility increase for identity-relevant claims.
    pub const CULTURAL_BONUS_STRENGTH: f32 = 0.30;

    /// Baseline identity salience per cultural group.
    pub const GROUP_IDENTITY_STRENGTH: [f32; 4] = [0.25, 0.35, 0.40, 0.30];

    /// Exposure multiplier bonus for agents in a claim's target group.
    pub fn identity_bonus(group: usize) -> f32 {
        CULTURAL_BONUS_STRENGTH * GROUP_IDENTITY_STRENGTH[group]
    }
}

/// Mutation perturbation sizes.
mod mutation_constants {
    /// Stealth shift magnitude per mutation (sign is random).
    pub const STEALTH_SHIFT: f32 = 0.05;
    /// Falsifiability loss per mutation.
    pub const FALSIFIABILITY_DROP: f32 = 0.03;
    /// Mutations never push falsifiability below this floor.
    pub const FALSIFIABILITY_FLOOR: f32 = 0.1;
}

/// One information strain with all properties resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Strain {
    pub name: String,
    pub topic: String,
    pub memeticity: f32,
    pub emotional_profile: EmotionProfile,
    pub falsifiability: f32,
    pub stealth: f32,
    pub virality: f32,
    pub mutation_rate: f32,
    pub violation_risk: f32,
    pub persistence: f32,
    pub is_true: bool,
    pub target_cultural_group: Option<u8>,
}

impl Strain {
    /// Moderation evasion factor: scales every exposure and share term.
    pub fn evasion(&self, moderation_strictness: f32) -> f32 {
        (1.0 - moderation_strictness * self.violation_risk * (1.0 - self.stealth)).max(0.0)
    }

    /// Church channels boost claims touching morality or spirituality.
    pub fn is_moral_or_spiritual(&self) -> bool {
        self.topic.contains("moral") || self.topic.contains("spiritual")
    }
}

/// The original strain of a claim plus its mutated descendants.
#[derive(Debug, Clone)]
pub struct StrainLineage {
    pub root: Strain,
    pub children: Vec<Strain>,
}

impl StrainLineage {
    /// The strain whose properties drive today's computations.
    pub fn active(&self) -> &Strain {
        self.children.last().unwrap_or(&self.root)
    }
}

/// Registry of all claims' strain lineages.
#[derive(Resource, Debug, Clone, Default)]
pub struct StrainRegistry {
    lineages: Vec<StrainLineage>,
    truth_claims: Vec<usize>,
    claim_keys: Vec<u64>,
}

/// Stable 64-bit key of a strain name, used to index per-claim RNG draws
/// so that permuting the configured strain list only relabels claims.
fn name_key(name: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

impl StrainRegistry {
    /// Resolves strain specs into a registry: presets looked up (or drawn
    /// on the preset-selection stream for `"random"`), numeric defaults
    /// filled from the truth or misinformation table, cultural targets
    /// attached.
    pub fn load(specs: &[StrainSpec], rng: &RngService) -> SimResult<Self> {
        let specs = if specs.is_empty() {
            default_strain_specs()
        } else {
            specs.to_vec()
        };

        let mut lineages = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let defaults = if spec.is_true {
                TRUTH_DEFAULTS
            } else {
                MISINFORMATION_DEFAULTS
            };

            let emotional_profile = match &spec.emotional_profile {
                None => {
                    let preset = if spec.is_true { "truth_factual" } else { "balanced_negative" };
                    lookup_preset(preset).expect("default preset exists")
                }
                Some(EmotionSpec::Profile(profile)) => *profile,
                Some(EmotionSpec::Preset(name)) if name == "random" => {
                    let mut preset_rng =
                        rng.cell_rng(Stream::PresetSelection, 0, index as u32, 0);
                    let pick = preset_rng.gen_range(0..MISINFORMATION_PRESETS.len());
                    MISINFORMATION_PRESETS[pick].1
                }
                Some(EmotionSpec::Preset(name)) => lookup_preset(name).ok_or_else(|| {
                    SimError::Config(format!("unknown emotion preset: {}", name))
                })?,
            };

            let strain = Strain {
                name: spec.name.clone(),
                topic: spec.topic.clone(),
                memeticity: spec.memeticity.unwrap_or(defaults.memeticity),
                emotional_profile,
                falsifiability: spec.falsifiability.unwrap_or(defaults.falsifiability),
                stealth: spec.stealth.unwrap_or(defaults.stealth),
                virality: spec.virality.unwrap_or(defaults.virality),
                mutation_rate: spec.mutation_rate.unwrap_or(defaults.mutation_rate),
                violation_risk: spec.violation_risk.unwrap_or(defaults.violation_risk),
                persistence: spec.persistence.unwrap_or(defaults.persistence),
                is_true: spec.is_true,
                target_cultural_group: match spec.target_cultural_group {
                    Some(-1) => None,
                    Some(group) => Some(group as u8),
                    None => None,
                },
            };
            lineages.push(StrainLineage {
                root: strain,
                children: Vec::new(),
            });
        }

        let mut registry = Self {
            truth_claims: lineages
                .iter()
                .enumerate()
                .filter(|(_, l)| l.root.is_true)
                .map(|(c, _)| c)
                .collect(),
            claim_keys: lineages.iter().map(|l| name_key(&l.root.name)).collect(),
            lineages,
        };
        registry.map_targets();
        Ok(registry)
    }

    /// Stable RNG key of a claim; mutations keep the parent's key.
    pub fn claim_key(&self, claim: usize) -> u64 {
        self.claim_keys[claim]
    }

    /// Attaches cultural targets by name pattern for strains that did not
    /// declare one explicitly.
    pub fn map_targets(&mut self) {
        for lineage in &mut self.lineages {
            if lineage.root.target_cultural_group.is_none() {
                lineage.root.target_cultural_group = infer_cultural_target(&lineage.root.name);
            }
        }
    }

    pub fn n_claims(&self) -> usize {
        self.lineages.len()
    }

    /// Active strain for a claim (latest mutation, else the original).
    pub fn active(&self, claim: usize) -> &Strain {
        self.lineages[claim].active()
    }

    /// The original, never-mutated strain of a claim.
    pub fn root(&self, claim: usize) -> &Strain {
        &self.lineages[claim].root
    }

    pub fn lineage(&self, claim: usize) -> &StrainLineage {
        &self.lineages[claim]
    }

    pub fn is_true(&self, claim: usize) -> bool {
        self.lineages[claim].root.is_true
    }

    /// Claim indices carrying truthful strains.
    pub fn truth_claims(&self) -> &[usize] {
        &self.truth_claims
    }

    /// Number of mutated children across all claims.
    pub fn mutation_count(&self) -> usize {
        self.lineages.iter().map(|l| l.children.len()).sum()
    }

    /// Spawns a mutated child of the claim's active strain: stealth
    /// shifted by ±0.05, falsifiability reduced by 0.03, name suffixed
    /// `_m`. The claim index is unchanged.
    pub fn mutate(&mut self, claim: usize, rng: &mut impl Rng) {
        let active = self.lineages[claim].active();
        let sign = if rng.gen::<f32>() < 0.5 { -1.0 } else { 1.0 };
        let child = Strain {
            name: format!("{}_m", active.name),
            stealth: (active.stealth + sign * mutation_constants::STEALTH_SHIFT).clamp(0.0, 1.0),
            falsifiability: (active.falsifiability - mutation_constants::FALSIFIABILITY_DROP)
                .clamp(mutation_constants::FALSIFIABILITY_FLOOR, 1.0),
            ..active.clone()
        };
        self.lineages[claim].children.push(child);
    }
}

/// Infers which cultural group a strain targets from keywords in its name.
fn infer_cultural_target(name: &str) -> Option<u8> {
    let name = name.to_lowercase();
    const PATTERNS: [&[&str]; 4] = [
        &["white_", "anglo", "conservative", "patriot", "traditional"],
        &["hispanic_", "latino", "immigration", "border", "family_values"],
        &["black_", "systemic", "justice", "disparity"],
        &["asian_", "model_minority", "cultural_erosion", "discrimination"],
    ];
    for (group, keywords) in PATTERNS.iter().enumerate() {
        if keywords.iter().any(|k| name.contains(k)) {
            return Some(group as u8);
        }
    }
    None
}

/// Built-in strain set used when the configuration lists none.
pub fn default_strain_specs() -> Vec<StrainSpec> {
    let spec = |name: &str, topic: &str, memeticity, fear, anger, hope, falsifiability, stealth| {
        StrainSpec {
            name: name.to_string(),
            topic: topic.to_string(),
            memeticity: Some(memeticity),
            emotional_profile: Some(EmotionSpec::Profile(EmotionProfile { fear, anger, hope })),
            falsifiability: Some(falsifiability),
            stealth: Some(stealth),
            ..StrainSpec::default()
        }
    };
    vec![
        spec("silver_river", "health_rumor", 0.55, 0.6, 0.2, 0.2, 0.7, 0.4),
        spec("market_shiver", "economic_panic", 0.6, 0.5, 0.3, 0.2, 0.6, 0.45),
        spec("temple_echo", "moral_spiral", 0.5, 0.3, 0.4, 0.3, 0.5, 0.55),
        spec("signal_fog", "tech_conspiracy", 0.58, 0.2, 0.5, 0.3, 0.65, 0.5),
        spec("border_whisper", "outsider_threat", 0.62, 0.4, 0.4, 0.2, 0.55, 0.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrainSpec;

    fn load(specs: &[StrainSpec]) -> StrainRegistry {
        StrainRegistry::load(specs, &RngService::new(42)).unwrap()
    }

    #[test]
    fn test_default_strains_loaded_when_empty() {
        let registry = load(&[]);
        assert_eq!(registry.n_claims(), 5);
        assert_eq!(registry.active(0).name, "silver_river");
        assert!(registry.truth_claims().is_empty());
    }

    #[test]
    fn test_misinformation_defaults_applied() {
        let registry = load(&[StrainSpec {
            name: "bare".to_string(),
            topic: "health_rumor".to_string(),
            ..StrainSpec::default()
        }]);
        let strain = registry.active(0);
        assert_eq!(strain.virality, MISINFORMATION_DEFAULTS.virality);
        assert_eq!(strain.stealth, MISINFORMATION_DEFAULTS.stealth);
        // Unspecified misinformation defaults to the balanced profile.
        assert_eq!(strain.emotional_profile, lookup_preset("balanced_negative").unwrap());
    }

    #[test]
    fn test_truth_defaults_applied() {
        let registry = load(&[StrainSpec {
            name: "town_report".to_string(),
            topic: "health_rumor".to_string(),
            is_true: true,
            ..StrainSpec::default()
        }]);
        let strain = registry.active(0);
        assert!(strain.is_true);
        assert_eq!(strain.virality, TRUTH_DEFAULTS.virality);
        assert_eq!(strain.stealth, 0.0);
        assert_eq!(strain.mutation_rate, 0.0);
        assert_eq!(registry.truth_claims(), &[0]);
    }

    #[test]
    fn test_random_preset_draws_misinformation_subset() {
        let registry = load(&[StrainSpec {
            name: "wildcard".to_string(),
            topic: "tech_conspiracy".to_string(),
            emotional_profile: Some(EmotionSpec::Preset("random".to_string())),
            ..StrainSpec::default()
        }]);
        let profile = registry.active(0).emotional_profile;
        assert!(MISINFORMATION_PRESETS.iter().any(|(_, p)| *p == profile));

        // Same seed, same selection.
        let again = load(&[StrainSpec {
            name: "wildcard".to_string(),
            topic: "tech_conspiracy".to_string(),
            emotional_profile: Some(EmotionSpec::Preset("random".to_string())),
            ..StrainSpec::default()
        }]);
        assert_eq!(again.active(0).emotional_profile, profile);
    }

    #[test]
    fn test_cultural_target_inferred_from_name() {
        let registry = load(&[
            StrainSpec {
                name: "border_invasion".to_string(),
                topic: "outsider_threat".to_string(),
                ..StrainSpec::default()
            },
            StrainSpec {
                name: "plain_rumor".to_string(),
                topic: "health_rumor".to_string(),
                ..StrainSpec::default()
            },
        ]);
        assert_eq!(registry.active(0).target_cultural_group, Some(1));
        assert_eq!(registry.active(1).target_cultural_group, None);
    }

    #[test]
    fn test_explicit_target_overrides_inference() {
        let registry = load(&[StrainSpec {
            name: "border_invasion".to_string(),
            topic: "outsider_threat".to_string(),
            target_cultural_group: Some(-1),
            ..StrainSpec::default()
        }]);
        assert_eq!(registry.active(0).target_cultural_group, None);
    }

    #[test]
    fn test_mutation_perturbs_child_only() {
        let mut registry = load(&[]);
        let before = registry.root(0).clone();

        let service = RngService::new(7);
        let mut rng = service.stream(Stream::Mutation, 1);
        registry.mutate(0, &mut rng);

        assert_eq!(registry.mutation_count(), 1);
        let child = registry.active(0);
        assert_eq!(child.name, "silver_river_m");
        assert!(((child.stealth - before.stealth).abs() - 0.05).abs() < 1e-6);
        assert!((before.falsifiability - child.falsifiability - 0.03).abs() < 1e-6);
        // The original record is untouched.
        assert_eq!(registry.root(0), &before);
    }

    #[test]
    fn test_repeated_mutation_chains_suffix() {
        let mut registry = load(&[]);
        let service = RngService::new(7);
        let mut rng = service.stream(Stream::Mutation, 1);
        registry.mutate(0, &mut rng);
        registry.mutate(0, &mut rng);
        assert_eq!(registry.active(0).name, "silver_river_m_m");
        assert_eq!(registry.n_claims(), 5);
    }

    #[test]
    fn test_falsifiability_floor() {
        let mut registry = load(&[StrainSpec {
            name: "slippery".to_string(),
            topic: "tech_conspiracy".to_string(),
            falsifiability: Some(0.11),
            ..StrainSpec::default()
        }]);
        let service = RngService::new(7);
        let mut rng = service.stream(Stream::Mutation, 1);
        registry.mutate(0, &mut rng);
        registry.mutate(0, &mut rng);
        assert!(registry.active(0).falsifiability >= 0.1);
    }

    #[test]
    fn test_evasion_factor() {
        let registry = load(&[]);
        let strain = registry.active(0);
        // stealth 0.4, violation_risk default 0.35
        let evasion = strain.evasion(1.0);
        assert!((evasion - (1.0 - 0.35 * 0.6)).abs() < 1e-6);
        assert_eq!(strain.evasion(0.0), 1.0);
    }

    #[test]
    fn test_identity_bonus_constants() {
        for group in 0..4 {
            let bonus = identity_constants::identity_bonus(group);
            assert!(bonus > 0.0 && bonus < 0.2);
        }
    }
}
