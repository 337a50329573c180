//! Simulation Driver
//!
//! Builds the world from a validated configuration, runs the fixed day
//! loop, validates invariants at every day boundary, and writes all
//! outputs. A run is a pure function of (configuration, seed): identical
//! inputs produce byte-identical output files.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;

use sim_records::{DailyMetricsRow, RunSummary};

use crate::components::claims::InfoState;
use crate::components::strain::StrainRegistry;
use crate::config::Config;
use crate::error::{SimError, SimResult};
use crate::events::CascadeLog;
use crate::output::metrics::{write_metrics_csv, MetricsCollector};
use crate::output::snapshot::{write_snapshot_csv, SnapshotCollector};
use crate::output::summary::{build_summary, write_summary_json};
use crate::output::RunMetadata;
use crate::rng::RngService;
use crate::setup::{generate_network, generate_population, seed_claims};
use crate::systems::{build_day_schedule, SimClock};

/// In-memory results of a completed run, alongside the files on disk.
#[derive(Debug)]
pub struct SimulationOutputs {
    pub metrics: Vec<DailyMetricsRow>,
    pub summary: RunSummary,
    pub metadata: RunMetadata,
}

/// Runs the simulation and writes outputs into `out_dir`.
///
/// On an invariant or numeric violation the loop stops, partial outputs
/// up to the last completed day are still written, the metadata is
/// marked incomplete, and the error is returned.
pub fn run_simulation(config: Config, out_dir: impl AsRef<Path>) -> SimResult<SimulationOutputs> {
    config.validate()?;
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|e| {
        SimError::Resource(format!("cannot create {}: {}", out_dir.display(), e))
    })?;

    let rng = RngService::new(config.sim.seed);
    let strains = StrainRegistry::load(&config.strains, &rng)?;
    let n_claims = strains.n_claims();
    let mut metadata = RunMetadata::new(&config, n_claims)?;

    let agents = generate_population(&config, &rng);
    let graph = generate_network(&config, &agents, &rng);
    let mut info = InfoState::new(config.sim.n_agents, n_claims)?;
    let mut cascades = CascadeLog::new(n_claims);
    seed_claims(&config, &rng, &strains, &mut info, &mut cascades);

    let steps = config.sim.steps;
    let snapshot_interval = config.sim.snapshot_interval;
    let restrained_threshold = config.sim.restrained_threshold;

    let mut world = World::new();
    world.insert_resource(SimClock { day: 0 });
    world.insert_resource(rng);
    world.insert_resource(config);
    world.insert_resource(agents);
    world.insert_resource(strains);
    world.insert_resource(graph);
    world.insert_resource(info);
    world.insert_resource(cascades);
    world.insert_resource(MetricsCollector::new());
    world.insert_resource(SnapshotCollector::new());

    let mut schedule = build_day_schedule();
    let mut failure: Option<SimError> = None;

    for day in 0..steps {
        world.resource_mut::<SimClock>().day = day;
        schedule.run(&mut world);

        // Day boundary: every invariant must hold before the next phase
        // chain observes the state.
        if let Err(err) = world
            .resource::<InfoState>()
            .validate(day, restrained_threshold)
        {
            failure = Some(err);
            break;
        }

        if SnapshotCollector::due(day, snapshot_interval, steps) {
            let rows = world.resource::<InfoState>().snapshot_rows(day);
            world.resource_mut::<SnapshotCollector>().rows.extend(rows);
        }
        metadata.steps_completed = day + 1;
    }
    metadata.complete = failure.is_none() && metadata.steps_completed == steps;

    let collector = world.remove_resource::<MetricsCollector>().expect("metrics collector");
    let snapshots = world.remove_resource::<SnapshotCollector>().expect("snapshot collector");
    let cascades = world.remove_resource::<CascadeLog>().expect("cascade log");
    let strains = world.remove_resource::<StrainRegistry>().expect("strain registry");
    let config = world.remove_resource::<Config>().expect("config");

    let summary = build_summary(
        &collector,
        &strains,
        &cascades,
        &config.world,
        metadata.steps_completed,
    );

    write_metrics_csv(&collector.rows, out_dir.join("daily_metrics.csv"))?;
    write_snapshot_csv(&snapshots.rows, out_dir.join("snapshots.csv"))?;
    cascades.write_jsonl(out_dir.join("cascades.jsonl"))?;
    write_summary_json(&summary, out_dir.join("summary.json"))?;
    metadata.write(out_dir.join("run_metadata.json"))?;

    match failure {
        Some(err) => Err(err),
        None => Ok(SimulationOutputs {
            metrics: collector.rows,
            summary,
            metadata,
        }),
    }
}
