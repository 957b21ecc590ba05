//! Filtering, searching and sorting an already-built worklist.
//!
//! Views are pure projections: they never mutate the worklist they are given and never refetch.
//! "Overdue" is derived here from `now`, it is not a stored status.

use crate::error::WorklistError;
use crate::model::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Pending tasks whose due time has passed.
    Overdue,
}

impl StatusFilter {
    fn keeps(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => task.status == TaskStatus::Pending,
            StatusFilter::Completed => task.status == TaskStatus::Completed,
            StatusFilter::Overdue => task.is_overdue(now),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
            StatusFilter::Overdue => "overdue",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = WorklistError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            "overdue" => Ok(StatusFilter::Overdue),
            other => Err(WorklistError::UnknownStatusFilter(other.to_string())),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Earliest due first.
    #[default]
    DueTime,
    /// Assessments before vital signs, then by due time and resident.
    Priority,
    /// Case-insensitive by resident name.
    ResidentName,
}

impl SortKey {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::DueTime => a.due_at.cmp(&b.due_at).then_with(|| a.id.cmp(&b.id)),
            SortKey::Priority => a
                .kind
                .priority_rank()
                .cmp(&b.kind.priority_rank())
                .then_with(|| a.due_at.cmp(&b.due_at))
                .then_with(|| folded_name(a).cmp(&folded_name(b)))
                .then_with(|| a.id.cmp(&b.id)),
            SortKey::ResidentName => folded_name(a)
                .cmp(&folded_name(b))
                .then_with(|| a.resident_name.cmp(&b.resident_name))
                .then_with(|| a.id.cmp(&b.id)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DueTime => "due_time",
            SortKey::Priority => "priority",
            SortKey::ResidentName => "resident_name",
        }
    }
}

impl FromStr for SortKey {
    type Err = WorklistError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "due_time" => Ok(SortKey::DueTime),
            "priority" => Ok(SortKey::Priority),
            "resident_name" => Ok(SortKey::ResidentName),
            other => Err(WorklistError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-chosen projection of a worklist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorklistQuery {
    /// Free-text search over title, resident name and location. Blank means no search.
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort: SortKey,
}

impl WorklistQuery {
    pub fn new(search: Option<String>, status: StatusFilter, sort: SortKey) -> Self {
        Self {
            search,
            status,
            sort,
        }
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

fn folded_name(task: &Task) -> String {
    task.resident_name.as_str().to_lowercase()
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task.resident_name.as_str().to_lowercase().contains(needle)
        || task.location.label().to_lowercase().contains(needle)
}

/// Apply `query` to `tasks` as of `now`, returning a new list.
///
/// Ordering is total: ties on the chosen key fall back to the task id, so the same worklist and
/// query always give the same order.
pub fn apply(tasks: &[Task], query: &WorklistQuery, now: DateTime<Utc>) -> Vec<Task> {
    let needle = query.needle();

    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|task| query.status.keeps(task, now))
        .filter(|task| {
            needle
                .as_deref()
                .map_or(true, |needle| matches_search(task, needle))
        })
        .cloned()
        .collect();

    view.sort_by(|a, b| query.sort.compare(a, b));
    view
}
