//! Agent State Store
//!
//! Structure-of-arrays storage for everything that is fixed per agent:
//! demographics, cognitive and emotional traits, institutional trust, and
//! media channel weights. All arrays have length `n_agents` and are built
//! once at run start; the daily pipeline only reads them.

use bevy_ecs::prelude::*;

use crate::config::EmotionProfile;

/// Number of institutional exposure channels.
pub const N_CHANNELS: usize = 4;

/// Institutional media channels reaching agents directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Tv,
    LocalNews,
    Gov,
    Church,
}

impl Channel {
    pub const ALL: [Channel; N_CHANNELS] =
        [Channel::Tv, Channel::LocalNews, Channel::Gov, Channel::Church];

    /// Position of this channel in per-agent weight vectors.
    pub fn index(self) -> usize {
        match self {
            Channel::Tv => 0,
            Channel::LocalNews => 1,
            Channel::Gov => 2,
            Channel::Church => 3,
        }
    }

    /// Population reach of the channel.
    pub fn reach(self) -> f32 {
        match self {
            Channel::Tv => 0.35,
            Channel::LocalNews => 0.4,
            Channel::Gov => 0.3,
            Channel::Church => 0.4,
        }
    }

    /// Relative affinity of this channel for a claim topic. The dedicated
    /// moral/spiritual church bonus is applied separately by the exposure
    /// engine.
    pub fn topic_affinity(self, topic: &str) -> f32 {
        match self {
            Channel::Tv => {
                if topic.contains("health") || topic.contains("economic") {
                    1.15
                } else if topic.contains("conspiracy") {
                    0.9
                } else {
                    1.0
                }
            }
            Channel::LocalNews => {
                if topic.contains("health") || topic.contains("outsider") {
                    1.2
                } else {
                    1.0
                }
            }
            Channel::Gov => {
                if topic.contains("economic") {
                    1.2
                } else if topic.contains("conspiracy") {
                    0.7
                } else {
                    1.0
                }
            }
            Channel::Church => 1.0,
        }
    }
}

/// Fixed per-agent attributes in structure-of-arrays layout.
#[derive(Resource, Debug, Clone, Default)]
pub struct AgentStore {
    pub n_agents: usize,

    // Demographics
    pub age: Vec<u32>,
    pub ethnicity_id: Vec<u8>,
    pub neighborhood_id: Vec<u16>,
    pub cultural_group_id: Vec<u8>,

    // Traits, each in [0, 1]
    pub skepticism: Vec<f32>,
    pub conformity: Vec<f32>,
    pub numeracy: Vec<f32>,
    pub conspiratorial: Vec<f32>,
    pub emotion_fear: Vec<f32>,
    pub emotion_anger: Vec<f32>,
    pub emotion_hope: Vec<f32>,
    pub cognitive_load: Vec<f32>,

    // Institutional trust, each in [0, 1]
    pub trust_gov: Vec<f32>,
    pub trust_media: Vec<f32>,
    pub trust_church: Vec<f32>,
    pub trust_peers: Vec<f32>,

    /// Per-agent institutional channel weights; non-negative, summing to
    /// at most one.
    pub channel_weights: Vec<[f32; N_CHANNELS]>,
}

impl AgentStore {
    pub fn len(&self) -> usize {
        self.n_agents
    }

    pub fn is_empty(&self) -> bool {
        self.n_agents == 0
    }

    /// Cosine similarity between the agent's emotional disposition and a
    /// strain's emotional profile; zero when either vector vanishes.
    pub fn emotion_match(&self, agent: usize, profile: &EmotionProfile) -> f32 {
        let a = [
            self.emotion_fear[agent],
            self.emotion_anger[agent],
            self.emotion_hope[agent],
        ];
        let s = [profile.fear, profile.anger, profile.hope];
        let dot: f32 = a.iter().zip(&s).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_s: f32 = s.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a <= f32::EPSILON || norm_s <= f32::EPSILON {
            0.0
        } else {
            dot / (norm_a * norm_s)
        }
    }

    /// Mean trust in institutional sources (government, media, church).
    pub fn institutional_trust(&self, agent: usize) -> f32 {
        (self.trust_gov[agent] + self.trust_media[agent] + self.trust_church[agent]) / 3.0
    }
}
