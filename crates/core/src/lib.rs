//! # Worklist Core
//!
//! Core business logic for the caregiver daily worklist.
//!
//! This crate turns a caregiver's resident assignments into a synthetic, per-day task list:
//! - one vital-signs task and one assessment task per assigned resident
//! - completion decided by whether a matching record exists for *today* in the facility's
//!   reference timezone
//! - best-effort enrichment with room/bed labels, degrading instead of failing
//! - pure filter/search/sort views over a built worklist
//!
//! Upstream services are reached only through the traits in [`providers`], so the engine never
//! knows whether it is reading a live API, a snapshot file or a test double.
//!
//! **No API concerns**: HTTP servers, authentication headers and CLI parsing belong in
//! `api-rest`, `api-shared` and `cli`.

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod day_boundary;
pub mod error;
pub mod model;
pub mod providers;
pub mod refresh;
pub mod sources;
pub mod summary;
pub mod synthesizer;
pub mod view;

#[cfg(test)]
mod testing;

pub use aggregator::{WorklistAggregator, WorklistSources};
pub use config::{fetch_timeout_from_env_value, reference_zone_from_env_value, WorklistConfig};
pub use day_boundary::{same_local_day, same_local_day_str, ReferenceZone};
pub use error::{
    AggregationError, ProviderError, ProviderResult, WorklistError, WorklistResult,
};
pub use model::{
    ActivityKind, ActivityRecord, AssessmentRecord, Assignment, ResidentLocation, Task, TaskId,
    TaskStatus, VitalSignRecord,
};
pub use providers::{
    AssessmentProvider, AssignmentProvider, Clock, FixedClock, LocationResolver, SystemClock,
    VitalSignsProvider,
};
pub use refresh::{RefreshCoordinator, RefreshOutcome, WorklistSnapshot};
pub use sources::SnapshotSource;
pub use summary::WorklistSummary;
pub use view::{SortKey, StatusFilter, WorklistQuery};

pub use worklist_types::{NonEmptyText, ResidentRef};
