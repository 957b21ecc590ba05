//! Builds the caregiver's full worklist from the four upstream sources.
//!
//! ## Failure policy
//! Only the assignment fetch can fail a build. Everything per resident is best effort:
//! - location lookup failure → unresolved location
//! - vital-sign or assessment fetch failure → that task stays `Pending`
//! - any per-fetch timeout → treated exactly like a failure
//!
//! Degradations are logged, never surfaced. The result always holds two tasks per assignment.
//!
//! ## Concurrency
//! Residents are processed concurrently and, within a resident, the location, vital-sign and
//! assessment lookups run concurrently too. Nothing shared is written during the fan-out; each
//! branch returns its own task pair. Output order is unspecified; sort with
//! [`crate::view::apply`].

use crate::config::WorklistConfig;
use crate::constants::ASSIGNMENTS_SOURCE;
use crate::error::{AggregationError, ProviderError, ProviderResult};
use crate::model::{Assignment, ResidentLocation, Task};
use crate::providers::{
    AssessmentProvider, AssignmentProvider, Clock, LocationResolver, SystemClock,
    VitalSignsProvider,
};
use crate::synthesizer::{has_activity_today, synthesize};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The four upstream sources a build reads from.
#[derive(Clone)]
pub struct WorklistSources {
    pub assignments: Arc<dyn AssignmentProvider>,
    pub locations: Arc<dyn LocationResolver>,
    pub vital_signs: Arc<dyn VitalSignsProvider>,
    pub assessments: Arc<dyn AssessmentProvider>,
}

impl WorklistSources {
    /// Use one value that implements all four contracts.
    pub fn from_single<P>(provider: Arc<P>) -> Self
    where
        P: AssignmentProvider
            + LocationResolver
            + VitalSignsProvider
            + AssessmentProvider
            + 'static,
    {
        Self {
            assignments: provider.clone(),
            locations: provider.clone(),
            vital_signs: provider.clone(),
            assessments: provider,
        }
    }
}

/// Why a per-resident fetch produced nothing.
#[derive(Debug)]
enum FetchFailure {
    Provider(ProviderError),
    TimedOut(Duration),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Provider(err) => write!(f, "{err}"),
            FetchFailure::TimedOut(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
        }
    }
}

/// Orchestrates a worklist build for the current caregiver.
#[derive(Clone)]
pub struct WorklistAggregator {
    cfg: Arc<WorklistConfig>,
    sources: WorklistSources,
    clock: Arc<dyn Clock>,
}

impl WorklistAggregator {
    pub fn new(cfg: Arc<WorklistConfig>, sources: WorklistSources) -> Self {
        Self {
            cfg,
            sources,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a [`FixedClock`](crate::FixedClock).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &WorklistConfig {
        &self.cfg
    }

    /// The instant this aggregator considers "now".
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Build the worklist as of the aggregator's clock.
    ///
    /// # Errors
    ///
    /// - [`AggregationError::Unauthenticated`] if the assignment source reports no session.
    /// - [`AggregationError::SourceUnavailable`] if assignments cannot be fetched in time.
    pub async fn build_worklist(&self) -> Result<Vec<Task>, AggregationError> {
        self.build_worklist_at(self.clock.now()).await
    }

    /// Build the worklist as of `now`.
    ///
    /// # Errors
    ///
    /// Same as [`WorklistAggregator::build_worklist`].
    pub async fn build_worklist_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Task>, AggregationError> {
        let started = Instant::now();
        let assignments = self.fetch_assignments().await?;

        let pairs = join_all(
            assignments
                .iter()
                .map(|assignment| self.build_resident(assignment, now)),
        )
        .await;

        let tasks: Vec<Task> = pairs
            .into_iter()
            .flat_map(|(vitals, assessment)| [vitals, assessment])
            .collect();

        tracing::info!(
            residents = assignments.len(),
            tasks = tasks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worklist built"
        );

        Ok(tasks)
    }

    async fn fetch_assignments(&self) -> Result<Vec<Assignment>, AggregationError> {
        match self.bounded(self.sources.assignments.my_assignments()).await {
            Ok(assignments) => Ok(assignments),
            Err(FetchFailure::Provider(ProviderError::Unauthenticated)) => {
                tracing::warn!("assignment fetch rejected: no authenticated session");
                Err(AggregationError::Unauthenticated)
            }
            Err(reason) => {
                tracing::error!(%reason, "assignment fetch failed");
                Err(AggregationError::SourceUnavailable(
                    ASSIGNMENTS_SOURCE.to_string(),
                ))
            }
        }
    }

    async fn build_resident(&self, assignment: &Assignment, now: DateTime<Utc>) -> (Task, Task) {
        let resident = &assignment.resident_ref;
        let zone = self.cfg.reference_zone();

        let (location, vitals, assessments) = tokio::join!(
            self.bounded(self.sources.locations.resolve_location(resident)),
            self.bounded(self.sources.vital_signs.vital_sign_records(resident)),
            self.bounded(self.sources.assessments.assessment_records(resident)),
        );

        let location = location.unwrap_or_else(|reason| {
            tracing::warn!(resident_ref = %resident, source = "location", %reason, "degraded to unresolved location");
            ResidentLocation::Unresolved
        });

        let has_vitals_today = match vitals {
            Ok(records) => has_activity_today(&records, now, zone),
            Err(reason) => {
                tracing::warn!(resident_ref = %resident, source = "vital_signs", %reason, "degraded to pending");
                false
            }
        };

        let has_assessment_today = match assessments {
            Ok(records) => has_activity_today(&records, now, zone),
            Err(reason) => {
                tracing::warn!(resident_ref = %resident, source = "assessments", %reason, "degraded to pending");
                false
            }
        };

        synthesize(
            assignment,
            &location,
            has_vitals_today,
            has_assessment_today,
            now,
            zone,
        )
    }

    async fn bounded<T>(
        &self,
        fetch: impl Future<Output = ProviderResult<T>>,
    ) -> Result<T, FetchFailure> {
        let limit = self.cfg.fetch_timeout();
        match tokio::time::timeout(limit, fetch).await {
            Ok(result) => result.map_err(FetchFailure::Provider),
            Err(_) => Err(FetchFailure::TimedOut(limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_boundary::ReferenceZone;
    use crate::model::{ActivityKind, TaskStatus};
    use crate::providers::FixedClock;
    use crate::testing::{at, FakeCare, Source};
    use std::collections::HashSet;

    fn config(timeout_ms: u64) -> Arc<WorklistConfig> {
        Arc::new(
            WorklistConfig::new(
                "+07:00".parse::<ReferenceZone>().unwrap(),
                Duration::from_millis(timeout_ms),
            )
            .unwrap(),
        )
    }

    fn aggregator(fake: FakeCare, now: DateTime<Utc>) -> WorklistAggregator {
        WorklistAggregator::new(config(1_000), WorklistSources::from_single(Arc::new(fake)))
            .with_clock(Arc::new(FixedClock(now)))
    }

    fn task<'a>(tasks: &'a [Task], id: &str) -> &'a Task {
        tasks
            .iter()
            .find(|task| task.id.as_str() == id)
            .unwrap_or_else(|| panic!("missing task {id}"))
    }

    #[tokio::test]
    async fn resident_with_vitals_this_morning() {
        let now = at("2024-05-01T14:00:00+07:00");
        let fake = FakeCare::new()
            .assign("r-a", "Nguyễn Văn A")
            .room_bed("r-a", "101", "2")
            .vitals_at("r-a", at("2024-05-01T09:00:00+07:00"));

        let tasks = aggregator(fake, now).build_worklist().await.unwrap();

        assert_eq!(tasks.len(), 2);
        let vitals = task(&tasks, "vital_signs:r-a");
        assert_eq!(vitals.kind, ActivityKind::VitalSigns);
        assert_eq!(vitals.status, TaskStatus::Completed);
        assert_eq!(vitals.resident_name.as_str(), "Nguyễn Văn A");
        assert_eq!(vitals.location.label(), "Room 101 - Bed 2");
        let assessment = task(&tasks, "assessment:r-a");
        assert_eq!(assessment.kind, ActivityKind::Assessment);
        assert_eq!(assessment.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn records_from_yesterday_do_not_count() {
        let now = at("2024-05-01T00:30:00+07:00");
        let fake = FakeCare::new()
            .assign("r-a", "A")
            .vitals_at("r-a", at("2024-04-30T23:59:00+07:00"))
            .assessment_at("r-a", at("2024-05-01T00:10:00+07:00"));

        let tasks = aggregator(fake, now).build_worklist().await.unwrap();
        assert_eq!(task(&tasks, "vital_signs:r-a").status, TaskStatus::Pending);
        assert_eq!(task(&tasks, "assessment:r-a").status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn every_assignment_gets_both_tasks_despite_failures() {
        let now = at("2024-05-01T10:00:00+07:00");
        let mut fake = FakeCare::new();
        for i in 0..6 {
            let resident = format!("r-{i}");
            fake = fake
                .assign(&resident, &format!("Resident {i}"))
                .vitals_at(&resident, now)
                .assessment_at(&resident, now);
        }
        let fake = fake
            .fail(Source::Vitals, "r-0")
            .fail(Source::Assessments, "r-1")
            .fail(Source::Location, "r-2")
            .fail(Source::Vitals, "r-3")
            .fail(Source::Assessments, "r-3")
            .fail(Source::Location, "r-3");

        let tasks = aggregator(fake, now).build_worklist().await.unwrap();

        assert_eq!(tasks.len(), 12);
        let ids: HashSet<_> = tasks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), 12);

        assert_eq!(task(&tasks, "vital_signs:r-0").status, TaskStatus::Pending);
        assert_eq!(task(&tasks, "assessment:r-0").status, TaskStatus::Completed);
        assert_eq!(task(&tasks, "assessment:r-1").status, TaskStatus::Pending);
        assert!(!task(&tasks, "vital_signs:r-2").location.is_resolved());
        assert_eq!(task(&tasks, "vital_signs:r-2").status, TaskStatus::Completed);
        assert_eq!(task(&tasks, "vital_signs:r-3").status, TaskStatus::Pending);
        assert_eq!(task(&tasks, "assessment:r-3").status, TaskStatus::Pending);
        assert_eq!(task(&tasks, "vital_signs:r-3").location.label(), "—");
        assert_eq!(task(&tasks, "vital_signs:r-5").status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn no_assignments_is_an_empty_worklist() {
        let tasks = aggregator(FakeCare::new(), at("2024-05-01T10:00:00Z"))
            .build_worklist()
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_ids() {
        let now = at("2024-05-01T10:00:00+07:00");
        let fake = Arc::new(
            FakeCare::new()
                .assign("r-1", "Bảo")
                .assign("r-2", "An")
                .vitals_at("r-2", now),
        );
        let aggregator = WorklistAggregator::new(config(1_000), WorklistSources::from_single(fake))
            .with_clock(Arc::new(FixedClock(now)));

        let first: HashSet<_> = aggregator
            .build_worklist()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        let second: HashSet<_> = aggregator
            .build_worklist()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[tokio::test]
    async fn unauthenticated_assignment_fetch_is_fatal() {
        let fake = FakeCare::new().assignments_fail(ProviderError::Unauthenticated);
        let err = aggregator(fake, at("2024-05-01T10:00:00Z"))
            .build_worklist()
            .await
            .unwrap_err();
        assert_eq!(err, AggregationError::Unauthenticated);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn unavailable_assignment_source_is_fatal() {
        for failure in [
            ProviderError::Unavailable("502".into()),
            ProviderError::NotFound("roster".into()),
        ] {
            let fake = FakeCare::new().assignments_fail(failure);
            let err = aggregator(fake, at("2024-05-01T10:00:00Z"))
                .build_worklist()
                .await
                .unwrap_err();
            assert_eq!(
                err,
                AggregationError::SourceUnavailable("assignments".to_string())
            );
            assert!(err.is_retryable());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sub_fetch_degrades_instead_of_stalling() {
        let now = at("2024-05-01T10:00:00+07:00");
        let fake = FakeCare::new()
            .assign("r-slow", "Slow")
            .assign("r-fast", "Fast")
            .room_bed("r-slow", "1", "1")
            .vitals_at("r-slow", now)
            .vitals_at("r-fast", now)
            .delay(Source::Vitals, "r-slow", Duration::from_secs(60))
            .delay(Source::Location, "r-slow", Duration::from_secs(60));

        let started = tokio::time::Instant::now();
        let tasks = aggregator(fake, now).build_worklist().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(tasks.len(), 4);
        assert_eq!(task(&tasks, "vital_signs:r-slow").status, TaskStatus::Pending);
        assert!(!task(&tasks, "vital_signs:r-slow").location.is_resolved());
        assert_eq!(task(&tasks, "vital_signs:r-fast").status, TaskStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn residents_are_fetched_concurrently() {
        let now = at("2024-05-01T10:00:00+07:00");
        let mut fake = FakeCare::new();
        for i in 0..5 {
            let resident = format!("r-{i}");
            fake = fake
                .assign(&resident, "Someone")
                .delay(Source::Location, &resident, Duration::from_millis(300))
                .delay(Source::Vitals, &resident, Duration::from_millis(300))
                .delay(Source::Assessments, &resident, Duration::from_millis(300));
        }

        let started = tokio::time::Instant::now();
        let tasks = aggregator(fake, now).build_worklist().await.unwrap();

        // Sequential would take 5 residents x 3 lookups x 300ms.
        assert!(started.elapsed() < Duration::from_millis(600));
        assert_eq!(tasks.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_assignment_fetch_is_source_unavailable() {
        let fake = FakeCare::new()
            .assign("r-1", "A")
            .assignment_delays([Duration::from_secs(30)]);
        let err = aggregator(fake, at("2024-05-01T10:00:00Z"))
            .build_worklist()
            .await
            .unwrap_err();
        assert!(matches!(err, AggregationError::SourceUnavailable(_)));
    }
}
