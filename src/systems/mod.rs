//! Daily Simulation Pipeline
//!
//! One simulated day is a fixed chain of phases: exposure, belief update,
//! SEDPNR transitions, share sampling (feeding the cascades and the next
//! day's exposure), then strain mutation and the metrics snapshot. The
//! ordering is a contract; each phase reads a consistent snapshot left by
//! the previous one and the chain forms the barrier between them.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::IntoSystemConfigs;

pub mod belief;
pub mod exposure;
pub mod sedpnr;
pub mod sharing;
pub mod world_effects;

/// Current day of the run.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    pub day: u32,
}

/// Builds the per-day schedule with the mandatory phase ordering.
pub fn build_day_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            exposure::compute_exposure,
            belief::update_beliefs,
            sedpnr::apply_transitions,
            sharing::sample_shares,
            world_effects::run_mutations,
            crate::output::metrics::record_daily_metrics,
        )
            .chain(),
    );
    schedule
}
