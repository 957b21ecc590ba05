//! Wire/boundary support for the care record payloads the worklist consumes.
//!
//! This crate provides **wire models** and **translation helpers** for the data returned by the
//! assignment, bed-assignment, vital-sign and assessment services, and for the care snapshot
//! file that bundles all four for offline use.
//!
//! This crate focuses on:
//! - strict serialisation/deserialisation (unknown keys are rejected)
//! - normalising the several timestamp fields a record may carry into one canonical
//!   `occurred_at`
//! - translation between wire structs and domain-level carrier types
//!
//! It knows nothing about "today", tasks or worklists; that lives in `worklist-core`.

pub mod activity;
pub mod bed;
pub mod snapshot;

// Re-export facades
pub use snapshot::CareSnapshot;

// Re-export public domain-level types
pub use activity::{canonical_occurred_at, ActivityData};
pub use bed::BedData;
pub use snapshot::{AssignmentData, CaregiverData, SnapshotData};

/// Errors returned by the `care-records` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`RecordsError`].
pub type RecordsResult<T> = Result<T, RecordsError>;
