//! Cascade Event Types
//!
//! Share events are the atomic units of cascade genealogy. Each event
//! records one agent re-sharing a claim, linked to the event that exposed
//! them, so that per-claim cascade trees can be reconstructed from the
//! event table alone.

use serde::{Deserialize, Serialize};

/// Valence of a share: positively-infected agents amplify the claim,
/// negatively-infected agents spread warnings about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareChannel {
    Positive,
    Negative,
}

impl ShareChannel {
    /// Returns the channel label used in output tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareChannel::Positive => "positive",
            ShareChannel::Negative => "negative",
        }
    }
}

/// A single share event in a cascade genealogy.
///
/// `source_agent` is the agent whose earlier share exposed `target_agent`
/// to the claim; for seed events the two coincide and `parent_event_id`
/// is absent. Events are append-only and totally ordered by
/// `(day, claim_id, source_agent)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareEvent {
    /// Run-unique, monotonically assigned identifier.
    pub event_id: u64,
    /// Simulation day the share occurred.
    pub day: u32,
    /// Claim index (mutated strains keep the parent's index).
    pub claim_id: u32,
    /// Agent whose share exposed the target; equals target for seeds.
    pub source_agent: u32,
    /// The agent performing this share.
    pub target_agent: u32,
    /// Event that exposed the target, absent for seed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<u64>,
    pub channel: ShareChannel,
}

impl ShareEvent {
    /// Creates a seed (root) event for an agent initially holding a claim.
    pub fn seed(event_id: u64, day: u32, claim_id: u32, agent: u32, channel: ShareChannel) -> Self {
        Self {
            event_id,
            day,
            claim_id,
            source_agent: agent,
            target_agent: agent,
            parent_event_id: None,
            channel,
        }
    }

    /// Returns true if this is a cascade root.
    pub fn is_seed(&self) -> bool {
        self.parent_event_id.is_none()
    }

    /// Total-order key for deterministic output.
    pub fn sort_key(&self) -> (u32, u32, u32) {
        (self.day, self.claim_id, self.source_agent)
    }

    /// Serializes the event to a JSON line (for JSONL output).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
