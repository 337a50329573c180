//! Multilayer Network Generation
//!
//! Builds the five contact layers by group assignment: households,
//! workplaces, schools, and churches are partitions with normal-ish group
//! sizes wired as capped cliques; the neighborhood layer adds random
//! within-neighborhood contacts. Layers carry their configured weight
//! multipliers and aggregate into one CSR graph.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::agents::AgentStore;
use crate::components::network::SocialGraph;
use crate::config::Config;
use crate::rng::{RngService, Stream};

/// Partitions `members` into groups with sizes drawn around the mean.
fn assign_groups(
    rng: &mut SmallRng,
    members: &[u32],
    mean_size: f32,
    std_size: f32,
) -> Vec<Vec<u32>> {
    let mut shuffled = members.to_vec();
    shuffled.shuffle(rng);

    let mut groups = Vec::new();
    let mut index = 0;
    while index < shuffled.len() {
        let noise = (rng.gen::<f32>() + rng.gen::<f32>() - 1.0) * std_size;
        let size = ((mean_size + noise).round().max(1.0) as usize).min(shuffled.len() - index);
        groups.push(shuffled[index..index + size].to_vec());
        index += size;
    }
    groups
}

/// Wires a group as a clique, or as a ring of `cap` nearest members when
/// the group is too large for full wiring.
fn wire_group(group: &[u32], weight: f32, cap: usize, edges: &mut Vec<(u32, u32, f32)>) {
    if group.len() <= cap {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                edges.push((a, b, weight));
            }
        }
    } else {
        let half_cap = (cap / 2).max(1);
        for (i, &a) in group.iter().enumerate() {
            for step in 1..=half_cap {
                let b = group[(i + step) % group.len()];
                edges.push((a, b, weight));
            }
        }
    }
}

/// Builds the aggregated multilayer contact graph for the population.
pub fn generate_network(config: &Config, agents: &AgentStore, rng: &RngService) -> SocialGraph {
    let n = agents.len();
    let net = &config.network;
    let town = &config.town;
    let weights = &net.layer_weights;
    let mut stream = rng.stream(Stream::Network, 0);
    let mut edges: Vec<(u32, u32, f32)> = Vec::new();

    let everyone: Vec<u32> = (0..n as u32).collect();

    // Family layer: everyone lives in a household.
    for group in assign_groups(
        &mut stream,
        &everyone,
        town.household_size_mean,
        town.household_size_std,
    ) {
        wire_group(&group, weights.family, net.max_clique_size, &mut edges);
    }

    // Workplace layer: working-age adults.
    let workers: Vec<u32> = everyone
        .iter()
        .copied()
        .filter(|&a| (18..65).contains(&agents.age[a as usize]))
        .collect();
    for group in assign_groups(&mut stream, &workers, town.workplace_size_mean, town.workplace_size_mean * 0.3) {
        wire_group(&group, weights.workplace, net.max_clique_size, &mut edges);
    }

    // School layer: school-age children.
    let students: Vec<u32> = everyone
        .iter()
        .copied()
        .filter(|&a| (5..18).contains(&agents.age[a as usize]))
        .collect();
    for group in assign_groups(&mut stream, &students, town.school_size_mean, town.school_size_mean * 0.3) {
        wire_group(&group, weights.school, net.max_clique_size, &mut edges);
    }

    // Church layer: a configured fraction of the town attends.
    let attendees: Vec<u32> = everyone
        .iter()
        .copied()
        .filter(|_| stream.gen::<f32>() < town.church_attendance_rate)
        .collect();
    for group in assign_groups(&mut stream, &attendees, town.church_size_mean, town.church_size_mean * 0.3) {
        wire_group(&group, weights.church, net.max_clique_size, &mut edges);
    }

    // Neighborhood layer: random contacts within the same neighborhood.
    let mut by_neighborhood: Vec<Vec<u32>> = vec![Vec::new(); town.n_neighborhoods.max(1)];
    for &a in &everyone {
        by_neighborhood[agents.neighborhood_id[a as usize] as usize].push(a);
    }
    let contacts = net.neighborhood_mean_degree.round().max(0.0) as usize;
    for residents in &by_neighborhood {
        if residents.len() < 2 {
            continue;
        }
        for &a in residents {
            for _ in 0..contacts {
                let b = residents[stream.gen_range(0..residents.len())];
                if a != b {
                    edges.push((a, b, weights.neighborhood));
                }
            }
        }
    }

    SocialGraph::from_edges(n, &edges)
}
