//! Care snapshot wire model and translation helpers.
//!
//! A care snapshot bundles, in one YAML or JSON document, everything the four upstream services
//! would return for a facility at a point in time: caregiver-to-resident assignments, bed
//! assignments, vital-sign records and assessment records. It backs the CLI, the REST server's
//! file-backed provider and integration tests.
//!
//! Responsibilities:
//! - Define public domain-level carrier types
//! - Define a strict wire model for serialisation/deserialisation
//! - Validate cross-record structure (no duplicate caregivers or assignments)
//! - Report schema mismatches with the path of the failing field

use crate::activity::{
    assessment_to_domain, assessment_to_wire, vital_sign_to_domain, vital_sign_to_wire,
    ActivityData, AssessmentWire, VitalSignWire,
};
use crate::bed::{bed_to_domain, bed_to_wire, BedData, BedWire};
use crate::{RecordsError, RecordsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use worklist_types::{NonEmptyText, ResidentRef};

// ============================================================================
// Public domain-level types
// ============================================================================

/// One caregiver-to-resident assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignmentData {
    pub resident_ref: ResidentRef,
    pub resident_name: NonEmptyText,
}

/// A caregiver and the residents currently assigned to them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaregiverData {
    pub caregiver_ref: NonEmptyText,
    pub assignments: Vec<AssignmentData>,
}

/// Domain-level carrier for a whole care snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotData {
    pub caregivers: Vec<CaregiverData>,
    pub beds: Vec<BedData>,
    pub vital_signs: Vec<ActivityData>,
    pub assessments: Vec<ActivityData>,
}

impl SnapshotData {
    /// Assignments for the given caregiver, or `None` if the caregiver is unknown.
    pub fn assignments_for(&self, caregiver_ref: &str) -> Option<&[AssignmentData]> {
        self.caregivers
            .iter()
            .find(|caregiver| caregiver.caregiver_ref.as_str() == caregiver_ref)
            .map(|caregiver| caregiver.assignments.as_slice())
    }

    /// Bed assignment for the given resident, if one is recorded.
    pub fn bed_for(&self, resident_ref: &ResidentRef) -> Option<&BedData> {
        self.beds.iter().find(|bed| &bed.resident_ref == resident_ref)
    }

    /// All vital-sign records for the given resident.
    pub fn vital_signs_for(&self, resident_ref: &ResidentRef) -> Vec<ActivityData> {
        filter_by_resident(&self.vital_signs, resident_ref)
    }

    /// All assessment records for the given resident.
    pub fn assessments_for(&self, resident_ref: &ResidentRef) -> Vec<ActivityData> {
        filter_by_resident(&self.assessments, resident_ref)
    }
}

fn filter_by_resident(records: &[ActivityData], resident_ref: &ResidentRef) -> Vec<ActivityData> {
    records
        .iter()
        .filter(|record| &record.resident_ref == resident_ref)
        .cloned()
        .collect()
}

// ============================================================================
// Public CareSnapshot operations
// ============================================================================

/// Care snapshot operations.
///
/// Zero-sized namespace for snapshot parsing and rendering.
pub struct CareSnapshot;

impl CareSnapshot {
    /// Parse a care snapshot from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Translation`] if the YAML does not match the wire schema (the
    /// message names the failing path) or if the snapshot fails structural validation.
    pub fn parse_yaml(yaml_text: &str) -> RecordsResult<SnapshotData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire = serde_path_to_error::deserialize::<_, SnapshotWire>(deserializer)
            .map_err(|err| schema_mismatch(err.path().to_string(), err.into_inner()))?;
        wire_to_domain(wire)
    }

    /// Parse a care snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Same as [`CareSnapshot::parse_yaml`].
    pub fn parse_json(json_text: &str) -> RecordsResult<SnapshotData> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let wire = serde_path_to_error::deserialize::<_, SnapshotWire>(&mut deserializer)
            .map_err(|err| schema_mismatch(err.path().to_string(), err.into_inner()))?;
        wire_to_domain(wire)
    }

    /// Load a care snapshot from disk. Files ending in `.json` are parsed as JSON, anything else
    /// as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Io`] if the file cannot be read, otherwise as for the parse
    /// functions.
    pub fn load(path: &Path) -> RecordsResult<SnapshotData> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::parse_json(&text)
        } else {
            Self::parse_yaml(&text)
        }
    }

    /// Render a care snapshot as YAML text.
    ///
    /// Activity timestamps are always written to the canonical `created_at` field.
    pub fn render_yaml(data: &SnapshotData) -> RecordsResult<String> {
        let wire = domain_to_wire(data);
        serde_yaml::to_string(&wire)
            .map_err(|e| RecordsError::Translation(format!("Failed to serialise snapshot: {e}")))
    }
}

fn schema_mismatch(path: String, source: impl std::fmt::Display) -> RecordsError {
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    RecordsError::Translation(format!("Care snapshot schema mismatch at {path}: {source}"))
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct SnapshotWire {
    #[serde(default)]
    caregivers: Vec<CaregiverWire>,
    #[serde(default)]
    beds: Vec<BedWire>,
    #[serde(default)]
    vital_signs: Vec<VitalSignWire>,
    #[serde(default)]
    assessments: Vec<AssessmentWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct CaregiverWire {
    caregiver_ref: NonEmptyText,
    #[serde(default)]
    assignments: Vec<AssignmentData>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: SnapshotWire) -> RecordsResult<SnapshotData> {
    let mut seen_caregivers = HashSet::new();
    for caregiver in &wire.caregivers {
        if !seen_caregivers.insert(caregiver.caregiver_ref.as_str()) {
            return Err(RecordsError::InvalidInput(format!(
                "caregiver '{}' appears more than once",
                caregiver.caregiver_ref
            )));
        }

        let mut seen_residents = HashSet::new();
        for assignment in &caregiver.assignments {
            if !seen_residents.insert(&assignment.resident_ref) {
                return Err(RecordsError::InvalidInput(format!(
                    "resident '{}' is assigned to caregiver '{}' more than once",
                    assignment.resident_ref, caregiver.caregiver_ref
                )));
            }
        }
    }

    let mut seen_beds = HashSet::new();
    for bed in &wire.beds {
        if !seen_beds.insert(&bed.resident_ref) {
            return Err(RecordsError::InvalidInput(format!(
                "resident '{}' has more than one bed assignment",
                bed.resident_ref
            )));
        }
    }

    Ok(SnapshotData {
        caregivers: wire
            .caregivers
            .into_iter()
            .map(|caregiver| CaregiverData {
                caregiver_ref: caregiver.caregiver_ref,
                assignments: caregiver.assignments,
            })
            .collect(),
        beds: wire.beds.into_iter().map(bed_to_domain).collect(),
        vital_signs: wire
            .vital_signs
            .into_iter()
            .map(vital_sign_to_domain)
            .collect(),
        assessments: wire
            .assessments
            .into_iter()
            .map(assessment_to_domain)
            .collect(),
    })
}

fn domain_to_wire(data: &SnapshotData) -> SnapshotWire {
    SnapshotWire {
        caregivers: data
            .caregivers
            .iter()
            .map(|caregiver| CaregiverWire {
                caregiver_ref: caregiver.caregiver_ref.clone(),
                assignments: caregiver.assignments.clone(),
            })
            .collect(),
        beds: data.beds.iter().map(bed_to_wire).collect(),
        vital_signs: data.vital_signs.iter().map(vital_sign_to_wire).collect(),
        assessments: data.assessments.iter().map(assessment_to_wire).collect(),
    }
}
