//! World Effects
//!
//! Environment-level processes that act uniformly on the population. The
//! moderation evasion factor and removal draws, media campaigns, and
//! algorithmic amplification are pure functions woven into the exposure
//! and sharing phases; this module owns the remaining daily step, strain
//! mutation.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::strain::StrainRegistry;
use crate::rng::{RngService, Stream};
use crate::systems::SimClock;

/// System: one mutation check per claim per day. A successful check
/// replaces the claim's active strain with a perturbed child; the claim
/// index and the metrics aggregation never change. Draws are keyed per
/// claim so claims mutate independently of their position in the list.
pub fn run_mutations(
    clock: Res<SimClock>,
    rng: Res<RngService>,
    mut strains: ResMut<StrainRegistry>,
) {
    for claim in 0..strains.n_claims() {
        let rate = strains.active(claim).mutation_rate;
        if rate <= 0.0 {
            continue;
        }
        let mut cell_rng = rng.cell_rng(Stream::Mutation, clock.day, 0, strains.claim_key(claim));
        if cell_rng.gen::<f32>() < rate {
            strains.mutate(claim, &mut cell_rng);
        }
    }
}
