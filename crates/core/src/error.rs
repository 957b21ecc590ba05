/// Errors raised while resolving configuration or validating caller input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorklistError {
    #[error("unknown reference timezone: {0}")]
    UnknownTimezone(String),
    #[error("invalid fetch timeout: {0}")]
    InvalidTimeout(String),
    #[error("unknown status filter: {0}")]
    UnknownStatusFilter(String),
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

pub type WorklistResult<T> = std::result::Result<T, WorklistError>;

/// Failure reported by one of the upstream data providers.
///
/// Per-resident provider failures never reach the caller of a worklist build; they are absorbed
/// into degraded task state. Only a failure of the assignment fetch is escalated, as an
/// [`AggregationError`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no authenticated session")]
    Unauthenticated,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Fatal outcome of a worklist build. No partial worklist accompanies these.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("caller is not authenticated")]
    Unauthenticated,
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),
}

impl AggregationError {
    /// Whether the caller can reasonably offer a retry.
    ///
    /// An unavailable source may recover; an unauthenticated caller must sign in again first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AggregationError::SourceUnavailable(_))
    }
}
