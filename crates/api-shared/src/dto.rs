//! JSON request/response types shared by the API surfaces.
//!
//! These mirror the core types but flatten them to plain strings and numbers so the OpenAPI
//! schema stays simple and stable.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use worklist_core::{Task, WorklistQuery, WorklistResult, WorklistSnapshot, WorklistSummary};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One worklist entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskRes {
    /// `{kind}:{resident_ref}`, stable across rebuilds.
    pub id: String,
    /// `vital_signs` or `assessment`.
    pub kind: String,
    pub resident_ref: String,
    pub resident_name: String,
    /// Room/bed label, `—` when unknown.
    pub location: String,
    pub title: String,
    pub description: String,
    /// RFC 3339, end of the local day.
    pub due_at: String,
    /// `pending` or `completed`.
    pub status: String,
    /// Pending and past due when the response was built.
    pub overdue: bool,
}

impl TaskRes {
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id.to_string(),
            kind: task.kind.slug().to_string(),
            resident_ref: task.resident_ref.to_string(),
            resident_name: task.resident_name.to_string(),
            location: task.location.label(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_at: rfc3339(task.due_at),
            status: match task.status {
                worklist_core::TaskStatus::Pending => "pending".into(),
                worklist_core::TaskStatus::Completed => "completed".into(),
            },
            overdue: task.is_overdue(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorklistRes {
    /// The instant the worklist was built against.
    pub generated_at: String,
    /// Reference timezone "today" was evaluated in.
    pub timezone: String,
    pub tasks: Vec<TaskRes>,
}

impl WorklistRes {
    pub fn new(tasks: &[Task], now: DateTime<Utc>, timezone: String) -> Self {
        Self {
            generated_at: rfc3339(now),
            timezone,
            tasks: tasks.iter().map(|task| TaskRes::from_task(task, now)).collect(),
        }
    }
}

/// A worklist published by `POST /worklist/refresh`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RefreshRes {
    /// Increases with every refresh the caregiver requests.
    pub generation: u64,
    pub worklist: WorklistRes,
}

impl RefreshRes {
    pub fn new(snapshot: &WorklistSnapshot, timezone: String) -> Self {
        Self {
            generation: snapshot.generation,
            worklist: WorklistRes::new(&snapshot.tasks, snapshot.built_at, timezone),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryRes {
    pub generated_at: String,
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
    pub residents: usize,
}

impl SummaryRes {
    pub fn new(summary: WorklistSummary, now: DateTime<Utc>) -> Self {
        Self {
            generated_at: rfc3339(now),
            total: summary.total,
            pending: summary.pending,
            completed: summary.completed,
            overdue: summary.overdue,
            residents: summary.residents,
        }
    }
}

/// Query string for `GET /worklist`.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorklistParams {
    /// Case-insensitive text matched against title, resident name and location.
    pub search: Option<String>,
    /// `all`, `pending`, `completed` or `overdue`.
    pub status: Option<String>,
    /// `due_time`, `priority` or `resident_name`.
    pub sort: Option<String>,
}

impl WorklistParams {
    /// Parse into a core query. Missing values take the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`worklist_core::WorklistError`] for an unknown status or sort value.
    pub fn to_query(&self) -> WorklistResult<WorklistQuery> {
        Ok(WorklistQuery::new(
            self.search.clone(),
            self.status.as_deref().unwrap_or_default().parse()?,
            self.sort.as_deref().unwrap_or_default().parse()?,
        ))
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
