//! Contracts for the upstream services the worklist reads from.
//!
//! All four are read-only from the engine's point of view and may fail. Implementations own
//! normalisation: records handed to the engine already carry one canonical `occurred_at`.

use crate::error::ProviderResult;
use crate::model::{Assignment, AssessmentRecord, ResidentLocation, VitalSignRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use worklist_types::ResidentRef;

/// Current caregiver's resident assignments.
#[async_trait]
pub trait AssignmentProvider: Send + Sync {
    /// Returns [`ProviderError::Unauthenticated`](crate::ProviderError::Unauthenticated) when
    /// there is no session.
    async fn my_assignments(&self) -> ProviderResult<Vec<Assignment>>;
}

/// Best-effort room/bed lookup.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve_location(&self, resident_ref: &ResidentRef)
        -> ProviderResult<ResidentLocation>;
}

#[async_trait]
pub trait VitalSignsProvider: Send + Sync {
    async fn vital_sign_records(&self, resident_ref: &ResidentRef)
        -> ProviderResult<Vec<VitalSignRecord>>;
}

#[async_trait]
pub trait AssessmentProvider: Send + Sync {
    async fn assessment_records(&self, resident_ref: &ResidentRef)
        -> ProviderResult<Vec<AssessmentRecord>>;
}

/// Source of "now" for a build.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
