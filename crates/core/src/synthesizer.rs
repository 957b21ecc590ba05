//! Turns one assignment into its daily tasks.

use crate::day_boundary::{same_local_day, ReferenceZone};
use crate::model::{
    ActivityKind, ActivityRecord, Assignment, ResidentLocation, Task, TaskId, TaskStatus,
};
use chrono::{DateTime, Utc};

/// Whether any record in `records` happened on the same local day as `now`.
pub fn has_activity_today<R: ActivityRecord>(
    records: &[R],
    now: DateTime<Utc>,
    zone: &ReferenceZone,
) -> bool {
    records
        .iter()
        .any(|record| same_local_day(now, record.occurred_at(), zone))
}

/// Produce the `(vital signs, assessment)` task pair for one assignment.
///
/// Pure: the same inputs always give the same tasks. `due_at` is the end of the local day that
/// contains `now`, so it is recomputed on every run.
pub fn synthesize(
    assignment: &Assignment,
    location: &ResidentLocation,
    has_vitals_today: bool,
    has_assessment_today: bool,
    now: DateTime<Utc>,
    zone: &ReferenceZone,
) -> (Task, Task) {
    let due_at = zone.end_of_day(now);
    let make = |kind: ActivityKind, done: bool| {
        let name = assignment.resident_name.as_str();
        Task {
            id: TaskId::new(kind, &assignment.resident_ref),
            kind,
            resident_ref: assignment.resident_ref.clone(),
            resident_name: assignment.resident_name.clone(),
            location: location.clone(),
            title: kind.title(name),
            description: kind.description(name),
            due_at,
            status: TaskStatus::from_done(done),
        }
    };

    (
        make(ActivityKind::VitalSigns, has_vitals_today),
        make(ActivityKind::Assessment, has_assessment_today),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VitalSignRecord;
    use worklist_types::{NonEmptyText, ResidentRef};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn assignment() -> Assignment {
        Assignment {
            resident_ref: ResidentRef::new("r-1").unwrap(),
            resident_name: NonEmptyText::new("Nguyễn Văn A").unwrap(),
        }
    }

    #[test]
    fn status_follows_the_flags() {
        let zone: ReferenceZone = "+07:00".parse().unwrap();
        let now = at("2024-05-01T09:30:00+07:00");
        let location = ResidentLocation::from_parts(Some("101"), Some("2"));

        let (vitals, assessment) = synthesize(&assignment(), &location, true, false, now, &zone);

        assert_eq!(vitals.kind, ActivityKind::VitalSigns);
        assert_eq!(vitals.status, TaskStatus::Completed);
        assert_eq!(vitals.id.as_str(), "vital_signs:r-1");
        assert_eq!(assessment.kind, ActivityKind::Assessment);
        assert_eq!(assessment.status, TaskStatus::Pending);
        assert_eq!(assessment.id.as_str(), "assessment:r-1");

        for task in [&vitals, &assessment] {
            assert_eq!(task.due_at, at("2024-05-01T23:59:59.999+07:00"));
            assert_eq!(task.location.label(), "Room 101 - Bed 2");
            assert!(task.title.contains("Nguyễn Văn A"));
            assert!(task.description.contains("Nguyễn Văn A"));
        }
    }

    #[test]
    fn due_time_tracks_the_current_day() {
        let zone: ReferenceZone = "+07:00".parse().unwrap();
        let location = ResidentLocation::Unresolved;
        let noon = at("2024-05-01T12:00:00+07:00");
        let next_midnight = at("2024-05-02T00:00:00+07:00");
        let (today, _) = synthesize(&assignment(), &location, false, false, noon, &zone);
        let (tomorrow, _) = synthesize(&assignment(), &location, false, false, next_midnight, &zone);
        assert_eq!(tomorrow.due_at - today.due_at, chrono::Duration::days(1));
    }

    #[test]
    fn activity_today_ignores_undated_and_other_days() {
        let zone: ReferenceZone = "Asia/Ho_Chi_Minh".parse().unwrap();
        let now = at("2024-05-01T09:00:00+07:00");
        let records = vec![
            VitalSignRecord {
                record_id: None,
                occurred_at: None,
            },
            VitalSignRecord {
                record_id: Some("v-old".into()),
                occurred_at: Some(at("2024-04-30T23:59:59+07:00")),
            },
        ];
        assert!(!has_activity_today(&records, now, &zone));

        let mut with_today = records.clone();
        with_today.push(VitalSignRecord {
            record_id: Some("v-new".into()),
            occurred_at: Some(at("2024-05-01T00:00:00+07:00")),
        });
        assert!(has_activity_today(&with_today, now, &zone));
        assert!(!has_activity_today::<VitalSignRecord>(&[], now, &zone));
    }
}
