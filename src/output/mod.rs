//! Run outputs: daily metrics, belief snapshots, the summary document,
//! and run metadata. All writers produce byte-identical files for
//! identical (configuration, seed) pairs.

pub mod metadata;
pub mod metrics;
pub mod snapshot;
pub mod summary;

pub use metadata::RunMetadata;
pub use metrics::MetricsCollector;
pub use snapshot::SnapshotCollector;
