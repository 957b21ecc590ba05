//! Domain types the worklist is built from and made of.

use crate::constants::UNRESOLVED_LOCATION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use worklist_types::{NonEmptyText, ResidentRef};

/// The current caregiver's responsibility for one resident.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub resident_ref: ResidentRef,
    pub resident_name: NonEmptyText,
}

/// Human-readable room/bed label for a resident.
///
/// `Unresolved` is a normal outcome (no bed recorded, or the lookup failed), shown as `—`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResidentLocation {
    RoomAndBed { room: String, bed: String },
    Room(String),
    Bed(String),
    Unresolved,
}

impl ResidentLocation {
    /// Build a location from optional parts. Blank parts count as missing.
    pub fn from_parts(room: Option<&str>, bed: Option<&str>) -> Self {
        let room = room.map(str::trim).filter(|r| !r.is_empty());
        let bed = bed.map(str::trim).filter(|b| !b.is_empty());
        match (room, bed) {
            (Some(room), Some(bed)) => ResidentLocation::RoomAndBed {
                room: room.to_string(),
                bed: bed.to_string(),
            },
            (Some(room), None) => ResidentLocation::Room(room.to_string()),
            (None, Some(bed)) => ResidentLocation::Bed(bed.to_string()),
            (None, None) => ResidentLocation::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, ResidentLocation::Unresolved)
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResidentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResidentLocation::RoomAndBed { room, bed } => write!(f, "Room {room} - Bed {bed}"),
            ResidentLocation::Room(room) => write!(f, "Room {room}"),
            ResidentLocation::Bed(bed) => write!(f, "Bed {bed}"),
            ResidentLocation::Unresolved => f.write_str(UNRESOLVED_LOCATION),
        }
    }
}

impl Serialize for ResidentLocation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Something that happened to a resident at (maybe) a known instant.
pub trait ActivityRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VitalSignRecord {
    pub record_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ActivityRecord for VitalSignRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentRecord {
    pub record_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ActivityRecord for AssessmentRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
    }
}

/// The daily activities tracked per resident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    VitalSigns,
    Assessment,
}

impl ActivityKind {
    /// Every kind, in synthesis order.
    pub const ALL: [ActivityKind; 2] = [ActivityKind::VitalSigns, ActivityKind::Assessment];

    /// Stable identifier used in task ids and by callers routing to the matching screen.
    pub fn slug(self) -> &'static str {
        match self {
            ActivityKind::VitalSigns => "vital_signs",
            ActivityKind::Assessment => "assessment",
        }
    }

    /// Fixed priority rank; lower sorts first. Assessments come before vital signs.
    pub fn priority_rank(self) -> u8 {
        match self {
            ActivityKind::Assessment => 0,
            ActivityKind::VitalSigns => 1,
        }
    }

    pub fn title(self, resident_name: &str) -> String {
        match self {
            ActivityKind::VitalSigns => format!("Vital signs - {resident_name}"),
            ActivityKind::Assessment => format!("Daily assessment - {resident_name}"),
        }
    }

    pub fn description(self, resident_name: &str) -> String {
        match self {
            ActivityKind::VitalSigns => format!(
                "Measure and record today's vital signs (pulse, blood pressure, temperature, SpO2) for {resident_name}."
            ),
            ActivityKind::Assessment => {
                format!("Complete today's care assessment for {resident_name}.")
            }
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Completion state of a task, decided once when the task is synthesized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn from_done(done: bool) -> Self {
        if done {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

/// Deterministic task identity: `{kind}:{resident_ref}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(kind: ActivityKind, resident_ref: &ResidentRef) -> Self {
        Self(format!("{}:{}", kind.slug(), resident_ref))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One synthetic worklist entry. Rebuilt from scratch on every aggregation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: ActivityKind,
    pub resident_ref: ResidentRef,
    pub resident_name: NonEmptyText,
    pub location: ResidentLocation,
    pub title: String,
    pub description: String,
    pub due_at: DateTime<Utc>,
    pub status: TaskStatus,
}

impl Task {
    /// Pending and past its due time.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.due_at < now
    }
}
