//! Latest-request-wins publication of rebuilt worklists.
//!
//! Every refresh takes a ticket. A build may only publish if its ticket is still the newest one
//! issued when it finishes; an older build that completes late is reported as superseded and its
//! result dropped. A failed build never replaces the last good snapshot.

use crate::aggregator::WorklistAggregator;
use crate::error::AggregationError;
use crate::model::Task;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A published worklist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorklistSnapshot {
    /// Ticket of the refresh that produced this snapshot. Strictly increasing.
    pub generation: u64,
    /// The `now` the worklist was built against.
    pub built_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This refresh published; the snapshot is now current.
    Current(Arc<WorklistSnapshot>),
    /// A newer refresh was requested while this one ran. Nothing was published.
    Superseded { ticket: u64, latest: u64 },
}

pub struct RefreshCoordinator {
    aggregator: WorklistAggregator,
    issued: AtomicU64,
    current: RwLock<Option<Arc<WorklistSnapshot>>>,
}

impl RefreshCoordinator {
    pub fn new(aggregator: WorklistAggregator) -> Self {
        Self {
            aggregator,
            issued: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    pub fn aggregator(&self) -> &WorklistAggregator {
        &self.aggregator
    }

    /// The last published snapshot, if any build has succeeded yet.
    pub async fn latest(&self) -> Option<Arc<WorklistSnapshot>> {
        self.current.read().await.clone()
    }

    /// Rebuild the worklist and publish it unless a newer refresh has started meanwhile.
    ///
    /// # Errors
    ///
    /// Returns the build's [`AggregationError`] if this refresh is still the newest. A
    /// superseded refresh reports [`RefreshOutcome::Superseded`] even if its build failed.
    pub async fn refresh(&self) -> Result<RefreshOutcome, AggregationError> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let built_at = self.aggregator.now();

        let result = self.aggregator.build_worklist_at(built_at).await;

        let latest = self.issued.load(Ordering::SeqCst);
        if latest != ticket {
            tracing::debug!(ticket, latest, "discarding superseded worklist build");
            return Ok(RefreshOutcome::Superseded { ticket, latest });
        }

        let tasks = result?;
        let snapshot = Arc::new(WorklistSnapshot {
            generation: ticket,
            built_at,
            tasks,
        });

        let mut current = self.current.write().await;
        // A newer ticket may have been issued while waiting for the lock.
        let latest = self.issued.load(Ordering::SeqCst);
        if latest != ticket {
            tracing::debug!(ticket, latest, "discarding superseded worklist build");
            return Ok(RefreshOutcome::Superseded { ticket, latest });
        }
        *current = Some(snapshot.clone());

        Ok(RefreshOutcome::Current(snapshot))
    }
}
