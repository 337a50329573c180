//! Misinformation Contagion Simulator
//!
//! Command-line driver: loads a TOML configuration, applies overrides,
//! runs the deterministic day loop, and reports where the outputs landed.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use contagion_sim::config::{Config, Device, DEFAULT_CONFIG_PATH};
use contagion_sim::run_simulation;

/// Command line arguments for the simulation.
#[derive(Parser, Debug)]
#[command(name = "contagion_sim")]
#[command(about = "A town-scale misinformation contagion simulator")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed override for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of days override
    #[arg(long)]
    steps: Option<u32>,

    /// Agent count override
    #[arg(long)]
    agents: Option<usize>,

    /// Output directory
    #[arg(long, default_value = "output")]
    out: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = if args.config.exists() {
        match Config::load(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        eprintln!(
            "Warning: {} not found. Using built-in defaults.",
            args.config.display()
        );
        Config::default()
    };

    if let Some(seed) = args.seed {
        config.sim.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.sim.steps = steps;
    }
    if let Some(agents) = args.agents {
        config.sim.n_agents = agents;
    }
    if config.sim.device != Device::Cpu {
        eprintln!("Warning: no vector device available; falling back to cpu.");
        config.sim.device = Device::Cpu;
    }

    println!("Contagion Simulator");
    println!("===================");
    println!("Seed: {}", config.sim.seed);
    println!("Agents: {}", config.sim.n_agents);
    println!("Days: {}", config.sim.steps);
    println!(
        "Strains: {}",
        if config.strains.is_empty() {
            "built-in defaults".to_string()
        } else {
            config.strains.len().to_string()
        }
    );
    println!();

    match run_simulation(config, &args.out) {
        Ok(outputs) => {
            println!("Simulation complete. Ran {} days.", outputs.metadata.steps_completed);
            for claim in &outputs.summary.claims {
                println!(
                    "  {} ({}): peak adoption {:.3} on day {}, final {:.3}, {} cascade events",
                    claim.name,
                    if claim.is_true { "truth" } else { "misinformation" },
                    claim.peak_adoption,
                    claim.peak_day,
                    claim.final_adoption,
                    claim.cascade.events,
                );
            }
            println!();
            println!("Outputs written to {}", args.out.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Partial outputs (if any) written to {}", args.out.display());
            ExitCode::FAILURE
        }
    }
}
