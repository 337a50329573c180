//! Cascade Tracker
//!
//! Append-only genealogy of share events, sharded per claim to keep
//! appends contention-free. Events are never mutated; structural metrics
//! (depth, breadth, size, structural virality, R-effective) are computed
//! on demand from the stored parent links.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use sim_records::{CascadeSummary, ShareChannel, ShareEvent};

/// Events of a single claim, in append order.
#[derive(Debug, Clone, Default)]
pub struct ClaimCascade {
    pub events: Vec<ShareEvent>,
}

impl ClaimCascade {
    /// Children indices per event, keyed by event id.
    fn child_map(&self) -> HashMap<u64, Vec<usize>> {
        let mut children: HashMap<u64, Vec<usize>> = HashMap::new();
        for (index, event) in self.events.iter().enumerate() {
            if let Some(parent) = event.parent_event_id {
                children.entry(parent).or_default().push(index);
            }
        }
        children
    }

    /// Generation of each event (seeds are generation zero).
    fn generations(&self) -> Vec<u32> {
        let index_of: HashMap<u64, usize> = self
            .events
            .iter()
            .enumerate()
            .map(|(i, e)| (e.event_id, i))
            .collect();
        // Parents always precede children in append order.
        let mut generations = vec![0u32; self.events.len()];
        for (i, event) in self.events.iter().enumerate() {
            if let Some(parent) = event.parent_event_id {
                if let Some(&p) = index_of.get(&parent) {
                    generations[i] = generations[p] + 1;
                }
            }
        }
        generations
    }

    /// Longest root-to-leaf path in generations.
    pub fn depth(&self) -> u32 {
        self.generations().into_iter().max().unwrap_or(0)
    }

    /// Largest direct fanout of any single event.
    pub fn max_breadth(&self) -> u32 {
        self.child_map()
            .values()
            .map(|c| c.len() as u32)
            .max()
            .unwrap_or(0)
    }

    pub fn size(&self) -> usize {
        self.events.len()
    }

    /// Mean pairwise distance between events of the cascade forest,
    /// computed per tree via the edge decomposition: an edge splitting a
    /// tree of n nodes into (k, n - k) lies on k * (n - k) paths.
    pub fn structural_virality(&self) -> f64 {
        let children = self.child_map();

        // Subtree sizes, leaves first (children have larger indices).
        let mut subtree = vec![1u64; self.events.len()];
        for i in (0..self.events.len()).rev() {
            if let Some(kids) = children.get(&self.events[i].event_id) {
                for &k in kids {
                    subtree[i] += subtree[k];
                }
            }
        }

        let mut total_distance = 0.0f64;
        let mut total_pairs = 0.0f64;
        for (i, event) in self.events.iter().enumerate() {
            if event.parent_event_id.is_some() {
                continue;
            }
            let n = subtree[i];
            if n < 2 {
                continue;
            }
            // Walk the tree rooted here; each edge contributes
            // child_subtree * (n - child_subtree) paths of length one.
            let mut distance_sum = 0.0f64;
            let mut stack = vec![i];
            while let Some(node) = stack.pop() {
                if let Some(kids) = children.get(&self.events[node].event_id) {
                    for &k in kids {
                        distance_sum += subtree[k] as f64 * (n - subtree[k]) as f64;
                        stack.push(k);
                    }
                }
            }
            total_distance += distance_sum;
            total_pairs += n as f64 * (n - 1) as f64 / 2.0;
        }
        if total_pairs == 0.0 {
            0.0
        } else {
            total_distance / total_pairs
        }
    }

    /// Mean out-degree of events that occurred on the given day.
    pub fn mean_out_degree_on_day(&self, day: u32) -> Option<f64> {
        let children = self.child_map();
        let mut events_on_day = 0u64;
        let mut offspring = 0u64;
        for event in &self.events {
            if event.day == day {
                events_on_day += 1;
                offspring += children
                    .get(&event.event_id)
                    .map(|c| c.len() as u64)
                    .unwrap_or(0);
            }
        }
        if events_on_day == 0 {
            None
        } else {
            Some(offspring as f64 / events_on_day as f64)
        }
    }

    /// Structural summary of this claim's cascades.
    pub fn summary(&self) -> CascadeSummary {
        CascadeSummary {
            events: self.size(),
            depth: self.depth(),
            max_breadth: self.max_breadth(),
            structural_virality: self.structural_virality(),
        }
    }
}

/// Append-only cascade store for all claims.
#[derive(Resource, Debug, Clone, Default)]
pub struct CascadeLog {
    shards: Vec<ClaimCascade>,
    next_event_id: u64,
}

impl CascadeLog {
    pub fn new(n_claims: usize) -> Self {
        Self {
            shards: vec![ClaimCascade::default(); n_claims],
            next_event_id: 0,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }

    /// Emits a root event for an initially seeded agent.
    pub fn seed(&mut self, claim: u32, agent: u32, day: u32) -> u64 {
        let id = self.allocate_id();
        self.shards[claim as usize]
            .events
            .push(ShareEvent::seed(id, day, claim, agent, ShareChannel::Positive));
        id
    }

    /// Appends a share event; `source` is the agent whose earlier share
    /// (the `parent` event) exposed the sharing `target` agent.
    pub fn append(
        &mut self,
        day: u32,
        claim: u32,
        source: u32,
        target: u32,
        parent: Option<u64>,
        channel: ShareChannel,
    ) -> u64 {
        let id = self.allocate_id();
        self.shards[claim as usize].events.push(ShareEvent {
            event_id: id,
            day,
            claim_id: claim,
            source_agent: source,
            target_agent: target,
            parent_event_id: parent,
            channel,
        });
        id
    }

    /// The cascade shard of one claim.
    pub fn query(&self, claim: usize) -> &ClaimCascade {
        &self.shards[claim]
    }

    pub fn n_claims(&self) -> usize {
        self.shards.len()
    }

    pub fn total_events(&self) -> usize {
        self.shards.iter().map(|s| s.size()).sum()
    }

    /// R-effective for a claim on `day`: mean out-degree of the events
    /// `generation_lag` days back. 0 when that day had no events.
    pub fn r_effective(&self, claim: usize, day: u32, generation_lag: u32) -> f64 {
        let Some(source_day) = day.checked_sub(generation_lag) else {
            return 0.0;
        };
        self.shards[claim]
            .mean_out_degree_on_day(source_day)
            .unwrap_or(0.0)
    }

    /// All events across claims in total order `(day, claim, source)`.
    pub fn sorted_events(&self) -> Vec<&ShareEvent> {
        let mut events: Vec<&ShareEvent> =
            self.shards.iter().flat_map(|s| s.events.iter()).collect();
        events.sort_by_key(|e| (e.sort_key(), e.event_id));
        events
    }

    /// Writes all events as JSONL in total order.
    pub fn write_jsonl(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        use std::io::Write;
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        for event in self.sorted_events() {
            let json = event
                .to_jsonl()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()
    }
}
