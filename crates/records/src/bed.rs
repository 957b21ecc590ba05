//! Bed-assignment wire model.
//!
//! The bed service reports where a resident currently sleeps. Room and bed numbers arrive as
//! either strings or bare numbers depending on the facility's configuration; both are accepted
//! and carried as trimmed text. Blank values are treated as absent.

use serde::{Deserialize, Serialize};
use worklist_types::ResidentRef;

/// Domain-level carrier for a resident's bed assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BedData {
    pub resident_ref: ResidentRef,
    pub room: Option<String>,
    pub bed: Option<String>,
}

/// Room or bed label as it appears on the wire.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub(crate) enum LabelWire {
    Number(u64),
    Text(String),
}

impl LabelWire {
    fn into_label(self) -> Option<String> {
        match self {
            LabelWire::Number(n) => Some(n.to_string()),
            LabelWire::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct BedWire {
    pub resident_ref: ResidentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<LabelWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed: Option<LabelWire>,
}

pub(crate) fn bed_to_domain(wire: BedWire) -> BedData {
    BedData {
        resident_ref: wire.resident_ref,
        room: wire.room.and_then(LabelWire::into_label),
        bed: wire.bed.and_then(LabelWire::into_label),
    }
}

pub(crate) fn bed_to_wire(data: &BedData) -> BedWire {
    BedWire {
        resident_ref: data.resident_ref.clone(),
        room: data.room.clone().map(LabelWire::Text),
        bed: data.bed.clone().map(LabelWire::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_and_text_labels() {
        let wire: BedWire =
            serde_yaml::from_str("resident_ref: r-1\nroom: 101\nbed: \"B\"\n").expect("valid bed");
        let data = bed_to_domain(wire);
        assert_eq!(data.room.as_deref(), Some("101"));
        assert_eq!(data.bed.as_deref(), Some("B"));
    }

    #[test]
    fn blank_labels_become_absent() {
        let wire: BedWire =
            serde_yaml::from_str("resident_ref: r-1\nroom: \"  \"\n").expect("valid bed");
        let data = bed_to_domain(wire);
        assert_eq!(data.room, None);
        assert_eq!(data.bed, None);
    }
}
