//! Providers backed by a care snapshot file.
//!
//! One [`SnapshotSource`] answers all four provider contracts from the same in-memory snapshot.
//! The snapshot is shared; scoping it to a caregiver is a cheap clone.

use crate::error::{ProviderError, ProviderResult};
use crate::model::{Assignment, AssessmentRecord, ResidentLocation, VitalSignRecord};
use crate::providers::{
    AssessmentProvider, AssignmentProvider, LocationResolver, VitalSignsProvider,
};
use async_trait::async_trait;
use care_records::{
    ActivityData, AssignmentData, BedData, CareSnapshot, RecordsResult, SnapshotData,
};
use std::path::Path;
use std::sync::Arc;
use worklist_types::ResidentRef;

#[derive(Clone, Debug)]
pub struct SnapshotSource {
    data: Arc<SnapshotData>,
    caregiver_ref: Option<String>,
}

impl SnapshotSource {
    /// A source with no signed-in caregiver. Use [`SnapshotSource::for_caregiver`] to scope it.
    pub fn new(data: SnapshotData) -> Self {
        Self {
            data: Arc::new(data),
            caregiver_ref: None,
        }
    }

    /// Load a YAML or JSON snapshot from disk.
    ///
    /// # Errors
    ///
    /// Propagates the [`care_records::RecordsError`] from reading or parsing the file.
    pub fn load(path: &Path) -> RecordsResult<Self> {
        let data = CareSnapshot::load(path)?;
        tracing::debug!(
            path = %path.display(),
            caregivers = data.caregivers.len(),
            "care snapshot loaded"
        );
        Ok(Self::new(data))
    }

    /// The same snapshot, seen by `caregiver_ref`. `None` (or blank) means no session.
    pub fn for_caregiver(&self, caregiver_ref: Option<&str>) -> Self {
        Self {
            data: Arc::clone(&self.data),
            caregiver_ref: caregiver_ref
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
        }
    }

    pub fn caregiver_ref(&self) -> Option<&str> {
        self.caregiver_ref.as_deref()
    }

    pub fn data(&self) -> &SnapshotData {
        &self.data
    }
}

fn to_assignment(data: &AssignmentData) -> Assignment {
    Assignment {
        resident_ref: data.resident_ref.clone(),
        resident_name: data.resident_name.clone(),
    }
}

fn to_location(bed: &BedData) -> ResidentLocation {
    ResidentLocation::from_parts(bed.room.as_deref(), bed.bed.as_deref())
}

fn to_vital_sign(record: ActivityData) -> VitalSignRecord {
    VitalSignRecord {
        record_id: record.record_id,
        occurred_at: record.occurred_at,
    }
}

fn to_assessment(record: ActivityData) -> AssessmentRecord {
    AssessmentRecord {
        record_id: record.record_id,
        occurred_at: record.occurred_at,
    }
}

#[async_trait]
impl AssignmentProvider for SnapshotSource {
    async fn my_assignments(&self) -> ProviderResult<Vec<Assignment>> {
        let Some(caregiver_ref) = self.caregiver_ref.as_deref() else {
            return Err(ProviderError::Unauthenticated);
        };

        // A caregiver with no roster entry simply has nothing assigned today.
        Ok(self
            .data
            .assignments_for(caregiver_ref)
            .unwrap_or_default()
            .iter()
            .map(to_assignment)
            .collect())
    }
}

#[async_trait]
impl LocationResolver for SnapshotSource {
    async fn resolve_location(
        &self,
        resident_ref: &ResidentRef,
    ) -> ProviderResult<ResidentLocation> {
        self.data
            .bed_for(resident_ref)
            .map(to_location)
            .ok_or_else(|| ProviderError::NotFound(format!("no bed for resident {resident_ref}")))
    }
}

#[async_trait]
impl VitalSignsProvider for SnapshotSource {
    async fn vital_sign_records(
        &self,
        resident_ref: &ResidentRef,
    ) -> ProviderResult<Vec<VitalSignRecord>> {
        Ok(self
            .data
            .vital_signs_for(resident_ref)
            .into_iter()
            .map(to_vital_sign)
            .collect())
    }
}

#[async_trait]
impl AssessmentProvider for SnapshotSource {
    async fn assessment_records(
        &self,
        resident_ref: &ResidentRef,
    ) -> ProviderResult<Vec<AssessmentRecord>> {
        Ok(self
            .data
            .assessments_for(resident_ref)
            .into_iter()
            .map(to_assessment)
            .collect())
    }
}
