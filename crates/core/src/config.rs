//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. The
//! helpers here take the raw environment *values* rather than reading the environment
//! themselves, so binaries decide where values come from and tests never touch process-wide
//! state.

use crate::constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_REFERENCE_ZONE, MAX_FETCH_TIMEOUT_MS};
use crate::day_boundary::ReferenceZone;
use crate::error::{WorklistError, WorklistResult};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorklistConfig {
    reference_zone: ReferenceZone,
    fetch_timeout: Duration,
}

impl WorklistConfig {
    /// Create a new `WorklistConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`WorklistError::InvalidTimeout`] if `fetch_timeout` is zero.
    pub fn new(reference_zone: ReferenceZone, fetch_timeout: Duration) -> WorklistResult<Self> {
        if fetch_timeout.is_zero() {
            return Err(WorklistError::InvalidTimeout(
                "fetch timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            reference_zone,
            fetch_timeout,
        })
    }

    /// Timezone in which "today" is evaluated.
    pub fn reference_zone(&self) -> &ReferenceZone {
        &self.reference_zone
    }

    /// Upper bound for each individual provider call.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

impl Default for WorklistConfig {
    fn default() -> Self {
        Self {
            reference_zone: ReferenceZone::default(),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

/// Parse the reference zone from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default facility zone.
pub fn reference_zone_from_env_value(value: Option<String>) -> WorklistResult<ReferenceZone> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    value
        .as_deref()
        .unwrap_or(DEFAULT_REFERENCE_ZONE)
        .parse::<ReferenceZone>()
}

/// Parse the per-fetch timeout (milliseconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn fetch_timeout_from_env_value(value: Option<String>) -> WorklistResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(raw) = value else {
        return Ok(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS));
    };

    let millis = raw.parse::<u64>().map_err(|_| {
        WorklistError::InvalidTimeout(format!("'{raw}' is not a whole number of milliseconds"))
    })?;

    if millis == 0 || millis > MAX_FETCH_TIMEOUT_MS {
        return Err(WorklistError::InvalidTimeout(format!(
            "{millis}ms is outside 1..={MAX_FETCH_TIMEOUT_MS}ms"
        )));
    }

    Ok(Duration::from_millis(millis))
}
