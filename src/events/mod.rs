//! Cascade genealogy tracking.

pub mod cascade;

pub use cascade::CascadeLog;
