//! Run Metadata
//!
//! Seed, configuration hash, and completion status written alongside the
//! data files. The configuration hash is a stable 64-bit fold over the
//! canonical JSON serialization, so any parameter change is visible in
//! the metadata of the runs it produced.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{SimError, SimResult};

/// Metadata document for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub seed: u64,
    pub config_hash: String,
    pub engine_version: String,
    pub n_agents: usize,
    pub n_claims: usize,
    pub steps_requested: u32,
    pub steps_completed: u32,
    /// False when the run aborted on an invariant or numeric error.
    pub complete: bool,
}

impl RunMetadata {
    pub fn new(config: &Config, n_claims: usize) -> SimResult<Self> {
        Ok(Self {
            seed: config.sim.seed,
            config_hash: format!("{:016x}", config_hash(config)?),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            n_agents: config.sim.n_agents,
            n_claims,
            steps_requested: config.sim.steps,
            steps_completed: 0,
            complete: false,
        })
    }

    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        fs::write(path, json)
    }
}

/// Stable 64-bit hash of the canonical config serialization.
pub fn config_hash(config: &Config) -> SimResult<u64> {
    let canonical = serde_json::to_string(config)
        .map_err(|e| SimError::Config(format!("cannot serialize config: {}", e)))?;
    let mut hash = 0xcbf29ce484222325u64;
    for byte in canonical.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    Ok(hash)
}
