//! Headline counts for a worklist.

use crate::model::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorklistSummary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Pending tasks already past due at the time the summary was taken.
    pub overdue: usize,
    /// Distinct residents with at least one task.
    pub residents: usize,
}

impl WorklistSummary {
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut summary = WorklistSummary {
            total: tasks.len(),
            ..Default::default()
        };
        let mut residents = HashSet::new();

        for task in tasks {
            residents.insert(task.resident_ref.as_str());
            match task.status {
                TaskStatus::Pending => summary.pending += 1,
                TaskStatus::Completed => summary.completed += 1,
            }
            if task.is_overdue(now) {
                summary.overdue += 1;
            }
        }

        summary.residents = residents.len();
        summary
    }
}
