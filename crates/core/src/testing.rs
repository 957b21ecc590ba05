//! In-memory provider used by unit tests across the crate.

use crate::error::{ProviderError, ProviderResult};
use crate::model::{Assignment, AssessmentRecord, ResidentLocation, VitalSignRecord};
use crate::providers::{
    AssessmentProvider, AssignmentProvider, LocationResolver, VitalSignsProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use worklist_types::{NonEmptyText, ResidentRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Source {
    Location,
    Vitals,
    Assessments,
}

pub(crate) struct FakeCare {
    assignments: ProviderResult<Vec<Assignment>>,
    assignment_delays: Mutex<VecDeque<Duration>>,
    locations: HashMap<String, ProviderResult<ResidentLocation>>,
    vitals: HashMap<String, ProviderResult<Vec<VitalSignRecord>>>,
    assessments: HashMap<String, ProviderResult<Vec<AssessmentRecord>>>,
    delays: HashMap<(Source, String), Duration>,
    pub(crate) assignment_calls: AtomicUsize,
}

impl FakeCare {
    pub(crate) fn new() -> Self {
        Self {
            assignments: Ok(Vec::new()),
            assignment_delays: Mutex::new(VecDeque::new()),
            locations: HashMap::new(),
            vitals: HashMap::new(),
            assessments: HashMap::new(),
            delays: HashMap::new(),
            assignment_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn assign(mut self, resident_ref: &str, name: &str) -> Self {
        let assignment = Assignment {
            resident_ref: ResidentRef::new(resident_ref).unwrap(),
            resident_name: NonEmptyText::new(name).unwrap(),
        };
        if let Ok(list) = self.assignments.as_mut() {
            list.push(assignment);
        }
        self
    }

    pub(crate) fn assignments_fail(mut self, err: ProviderError) -> Self {
        self.assignments = Err(err);
        self
    }

    /// Each call to `my_assignments` sleeps for the next queued delay, if any.
    pub(crate) fn assignment_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.assignment_delays.lock().unwrap().extend(delays);
        self
    }

    pub(crate) fn room_bed(mut self, resident_ref: &str, room: &str, bed: &str) -> Self {
        self.locations.insert(
            resident_ref.into(),
            Ok(ResidentLocation::from_parts(Some(room), Some(bed))),
        );
        self
    }

    pub(crate) fn vitals_at(mut self, resident_ref: &str, at: DateTime<Utc>) -> Self {
        if let Ok(list) = self
            .vitals
            .entry(resident_ref.into())
            .or_insert_with(|| Ok(Vec::new()))
        {
            list.push(VitalSignRecord {
                record_id: None,
                occurred_at: Some(at),
            });
        }
        self
    }

    pub(crate) fn assessment_at(mut self, resident_ref: &str, at: DateTime<Utc>) -> Self {
        if let Ok(list) = self
            .assessments
            .entry(resident_ref.into())
            .or_insert_with(|| Ok(Vec::new()))
        {
            list.push(AssessmentRecord {
                record_id: None,
                occurred_at: Some(at),
            });
        }
        self
    }

    pub(crate) fn fail(mut self, source: Source, resident_ref: &str) -> Self {
        let err = ProviderError::Unavailable(format!("{source:?} down for {resident_ref}"));
        match source {
            Source::Location => {
                self.locations.insert(resident_ref.into(), Err(err));
            }
            Source::Vitals => {
                self.vitals.insert(resident_ref.into(), Err(err));
            }
            Source::Assessments => {
                self.assessments.insert(resident_ref.into(), Err(err));
            }
        }
        self
    }

    pub(crate) fn delay(mut self, source: Source, resident_ref: &str, delay: Duration) -> Self {
        self.delays.insert((source, resident_ref.into()), delay);
        self
    }

    async fn pause(&self, source: Source, resident_ref: &ResidentRef) {
        if let Some(delay) = self.delays.get(&(source, resident_ref.as_str().to_string())) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl AssignmentProvider for FakeCare {
    async fn my_assignments(&self) -> ProviderResult<Vec<Assignment>> {
        self.assignment_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.assignment_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.assignments.clone()
    }
}

#[async_trait]
impl LocationResolver for FakeCare {
    async fn resolve_location(
        &self,
        resident_ref: &ResidentRef,
    ) -> ProviderResult<ResidentLocation> {
        self.pause(Source::Location, resident_ref).await;
        self.locations
            .get(resident_ref.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::NotFound(resident_ref.to_string())))
    }
}

#[async_trait]
impl VitalSignsProvider for FakeCare {
    async fn vital_sign_records(
        &self,
        resident_ref: &ResidentRef,
    ) -> ProviderResult<Vec<VitalSignRecord>> {
        self.pause(Source::Vitals, resident_ref).await;
        self.vitals
            .get(resident_ref.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl AssessmentProvider for FakeCare {
    async fn assessment_records(
        &self,
        resident_ref: &ResidentRef,
    ) -> ProviderResult<Vec<AssessmentRecord>> {
        self.pause(Source::Assessments, resident_ref).await;
        self.assessments
            .get(resident_ref.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub(crate) fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}
