//! Multilayer Social Graph
//!
//! The five contact layers (family, workplace, school, church,
//! neighborhood) are generated separately, weighted by their layer
//! multipliers, and aggregated into one undirected CSR adjacency. Edges
//! are static for the whole run; the per-agent neighbor weight sums used
//! for social proof normalization are precomputed.

use bevy_ecs::prelude::*;

/// Aggregated contact graph in compressed sparse row form.
#[derive(Resource, Debug, Clone, Default)]
pub struct SocialGraph {
    pub n_agents: usize,
    offsets: Vec<usize>,
    targets: Vec<u32>,
    weights: Vec<f32>,
    weight_sums: Vec<f32>,
}

impl SocialGraph {
    /// Builds the graph from weighted undirected edges. Parallel edges
    /// (the same pair on several layers) merge by summing weights;
    /// self-loops are dropped.
    pub fn from_edges(n_agents: usize, edges: &[(u32, u32, f32)]) -> Self {
        let mut directed: Vec<(u32, u32, f32)> = Vec::with_capacity(edges.len() * 2);
        for &(a, b, w) in edges {
            if a == b || w <= 0.0 {
                continue;
            }
            directed.push((a, b, w));
            directed.push((b, a, w));
        }
        directed.sort_by_key(|&(src, dst, _)| (src, dst));

        let mut offsets = vec![0usize; n_agents + 1];
        let mut targets = Vec::with_capacity(directed.len());
        let mut weights = Vec::with_capacity(directed.len());

        let mut iter = directed.into_iter().peekable();
        while let Some((src, dst, mut weight)) = iter.next() {
            while let Some(&(next_src, next_dst, next_w)) = iter.peek() {
                if next_src == src && next_dst == dst {
                    weight += next_w;
                    iter.next();
                } else {
                    break;
                }
            }
            targets.push(dst);
            weights.push(weight);
            offsets[src as usize + 1] += 1;
        }
        for i in 0..n_agents {
            offsets[i + 1] += offsets[i];
        }

        let weight_sums = (0..n_agents)
            .map(|i| weights[offsets[i]..offsets[i + 1]].iter().sum())
            .collect();

        Self {
            n_agents,
            offsets,
            targets,
            weights,
            weight_sums,
        }
    }

    /// Neighbor ids and aggregated weights of one agent.
    pub fn neighbors(&self, agent: usize) -> (&[u32], &[f32]) {
        let range = self.offsets[agent]..self.offsets[agent + 1];
        (&self.targets[range.clone()], &self.weights[range])
    }

    /// Sum of this agent's neighbor weights; zero for isolated agents.
    pub fn weight_sum(&self, agent: usize) -> f32 {
        self.weight_sums[agent]
    }

    pub fn degree(&self, agent: usize) -> usize {
        self.offsets[agent + 1] - self.offsets[agent]
    }

    /// Number of undirected edges after aggregation.
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }
}
