//! Town-Scale Misinformation Contagion Simulator
//!
//! Public API for the simulation engine: deterministic, vectorized
//! agent-based spread of competing information strains over a multilayer
//! social graph, with per-agent dual-process belief updates and a
//! six-state (SEDPNR) information status machine.

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod rng;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::{AgentStore, InfoState, SedpnrState, SocialGraph, Strain, StrainRegistry};
pub use config::Config;
pub use error::{SimError, SimResult};
pub use events::CascadeLog;
pub use rng::{RngService, Stream};
pub use simulation::{run_simulation, SimulationOutputs};
