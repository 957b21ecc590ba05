//! Constants used throughout the worklist core crate.

/// Reference timezone used when none is configured: the facility's local zone.
pub const DEFAULT_REFERENCE_ZONE: &str = "Asia/Ho_Chi_Minh";

/// Per-fetch timeout used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Upper bound accepted for a configured per-fetch timeout (ten minutes).
pub const MAX_FETCH_TIMEOUT_MS: u64 = 600_000;

/// Label shown when a resident's room and bed could not be resolved.
pub const UNRESOLVED_LOCATION: &str = "—";

/// Source name reported when the assignment fetch fails.
pub const ASSIGNMENTS_SOURCE: &str = "assignments";
