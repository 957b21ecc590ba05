//! Provider implementations backed by concrete data sources.

pub mod snapshot;

pub use snapshot::SnapshotSource;
