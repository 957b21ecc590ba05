//! Vital-sign and assessment record wire models.
//!
//! Upstream services are inconsistent about which field carries the time a record was taken:
//! some send `created_at`, some `record_date`, older payloads `recorded_at` or plain `date`.
//! The wire models accept all of them and translation collapses them into one canonical
//! `occurred_at`, so nothing downstream has to guess.
//!
//! Resolution order is `created_at`, `record_date`, `recorded_at`, `date`. The first present,
//! non-blank field wins and only that field is parsed. If it is not RFC 3339 the record has no
//! `occurred_at`, even when a later field would parse; that is a valid outcome, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use worklist_types::ResidentRef;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for one activity record (vital signs or assessment).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityData {
    /// Resident the record belongs to.
    pub resident_ref: ResidentRef,

    /// Upstream record identifier, when the service supplies one.
    pub record_id: Option<String>,

    /// Canonical "occurred at" instant, if any timestamp field could be resolved.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Resolve the canonical occurrence instant from candidate timestamp fields, in priority order.
///
/// Missing and blank candidates are skipped. A garbled winner yields `None`; later fields are not
/// consulted.
pub fn canonical_occurred_at<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<DateTime<Utc>> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|raw| !raw.is_empty())
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

// ============================================================================
// Wire types
// ============================================================================

/// Wire representation of a vital-sign record.
///
/// Measurement fields are carried so real payloads validate, but the worklist only needs the
/// resident and the time.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct VitalSignWire {
    pub resident_ref: ResidentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Wire representation of an assessment record.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct AssessmentWire {
    pub resident_ref: ResidentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

pub(crate) fn vital_sign_to_domain(wire: VitalSignWire) -> ActivityData {
    let occurred_at = canonical_occurred_at([
        wire.created_at.as_deref(),
        wire.record_date.as_deref(),
        wire.recorded_at.as_deref(),
        wire.date.as_deref(),
    ]);
    ActivityData {
        resident_ref: wire.resident_ref,
        record_id: wire.id,
        occurred_at,
    }
}

pub(crate) fn assessment_to_domain(wire: AssessmentWire) -> ActivityData {
    let occurred_at = canonical_occurred_at([
        wire.created_at.as_deref(),
        wire.record_date.as_deref(),
        wire.recorded_at.as_deref(),
        wire.date.as_deref(),
    ]);
    ActivityData {
        resident_ref: wire.resident_ref,
        record_id: wire.id,
        occurred_at,
    }
}

/// Render domain data back to wire form, always using the canonical `created_at` field.
pub(crate) fn vital_sign_to_wire(data: &ActivityData) -> VitalSignWire {
    VitalSignWire {
        resident_ref: data.resident_ref.clone(),
        id: data.record_id.clone(),
        created_at: data.occurred_at.map(|at| at.to_rfc3339()),
        record_date: None,
        recorded_at: None,
        date: None,
        pulse: None,
        temperature: None,
        blood_pressure: None,
        respiratory_rate: None,
        spo2: None,
        note: None,
    }
}

pub(crate) fn assessment_to_wire(data: &ActivityData) -> AssessmentWire {
    AssessmentWire {
        resident_ref: data.resident_ref.clone(),
        id: data.record_id.clone(),
        created_at: data.occurred_at.map(|at| at.to_rfc3339()),
        record_date: None,
        recorded_at: None,
        date: None,
        assessor: None,
        summary: None,
        note: None,
    }
}
