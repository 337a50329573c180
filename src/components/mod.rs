//! Simulation state components: agent store, per-claim information state,
//! strain registry, and the multilayer social graph.

pub mod agents;
pub mod claims;
pub mod network;
pub mod strain;

pub use agents::{AgentStore, Channel, N_CHANNELS};
pub use claims::{InfoState, SedpnrState};
pub use network::SocialGraph;
pub use strain::{Strain, StrainRegistry};
