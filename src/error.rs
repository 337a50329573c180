//! Error Types
//!
//! All simulation failures fold into [`SimError`]. Configuration problems
//! abort before the day loop starts; invariant and numeric violations
//! abort mid-run, carrying the day and the first offending (agent, claim)
//! so the failure can be reproduced from the same seed.

use thiserror::Error;

/// Root error type for simulation failures.
#[derive(Error, Debug)]
pub enum SimError {
    /// Missing field, out-of-range value, unknown preset, duplicate strain.
    #[error("config error: {0}")]
    Config(String),

    /// A state invariant failed at a day boundary.
    #[error("invariant violation on day {day} (agent {agent}, claim {claim}): {detail}")]
    Invariant {
        day: u32,
        agent: u32,
        claim: u32,
        detail: String,
    },

    /// NaN or infinity in belief or exposure arrays.
    #[error("numeric error on day {day} (agent {agent}, claim {claim}): {detail}")]
    Numeric {
        day: u32,
        agent: u32,
        claim: u32,
        detail: String,
    },

    /// State array allocation or output writing failed.
    #[error("resource error: {0}")]
    Resource(String),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Resource(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::Invariant {
            day: 4,
            agent: 17,
            claim: 1,
            detail: "belief above 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invariant violation on day 4 (agent 17, claim 1): belief above 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: SimError = io.into();
        assert!(matches!(err, SimError::Resource(_)));
    }
}
