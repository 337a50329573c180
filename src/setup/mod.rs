//! World setup: synthetic population, multilayer contact network, and
//! initial claim seeding. Everything here runs once before the day loop
//! and draws only from the setup streams.

pub mod network;
pub mod town;

pub use network::generate_network;
pub use town::{generate_population, seed_claims};
