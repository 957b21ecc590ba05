//! # API Shared
//!
//! Shared utilities and definitions for the worklist APIs.
//!
//! Contains:
//! - Response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Authentication utilities (API key check, caregiver identity header)
//!
//! Used by `api-rest` and the `worklist-run` binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::AuthError;
pub use dto::{HealthRes, RefreshRes, SummaryRes, TaskRes, WorklistParams, WorklistRes};
pub use health::HealthService;
