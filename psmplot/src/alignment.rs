//! Theoretical fragment ions aligned against the observed peaks of one scan
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The backbone fragment ion series a theoretical ion belongs to.
///
/// The scoring engine only ever produces [`FragmentKind::B`] and [`FragmentKind::Y`]
/// today, but the other cleavage families are part of the same closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FragmentKind {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

impl FragmentKind {
    /// The lowercase letter used in annotation labels
    pub fn letter(&self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }
}

impl Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The experimental peak a theoretical ion was matched to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedPeak {
    pub mz: f64,
    pub intensity: f32,
    pub charge: u8,
}

impl ObservedPeak {
    pub fn new(mz: f64, intensity: f32, charge: u8) -> Self {
        Self {
            mz,
            intensity,
            charge,
        }
    }
}

/// Reasons an alignment payload is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentShapeError {
    #[error(
        "{kind}{index} has a partial observation (m/z: {mz}, intensity: {intensity}, charge: {charge}), \
         they must be all present or all absent"
    )]
    PartialObservation {
        kind: FragmentKind,
        index: f64,
        mz: bool,
        intensity: bool,
        charge: bool,
    },
    #[error("{kind} fragment index {index} is not a positive position")]
    InvalidIndex { kind: FragmentKind, index: f64 },
}

/// The scoring engine's `MatchedPeaks` record, with independently nullable observed fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatchedPeakRecord {
    mz: Option<f64>,
    intensity: Option<f32>,
    charge: Option<u8>,
    fragment_mz: f64,
    #[serde(default)]
    fragment_loss: f64,
    fragment_kind: FragmentKind,
    fragment_idx: f64,
}

impl TryFrom<MatchedPeakRecord> for AlignmentRecord {
    type Error = AlignmentShapeError;

    fn try_from(value: MatchedPeakRecord) -> Result<Self, Self::Error> {
        if !(value.fragment_idx.is_finite() && value.fragment_idx > 0.0) {
            return Err(AlignmentShapeError::InvalidIndex {
                kind: value.fragment_kind,
                index: value.fragment_idx,
            });
        }
        let observed = match (value.mz, value.intensity, value.charge) {
            (Some(mz), Some(intensity), Some(charge)) => {
                Some(ObservedPeak::new(mz, intensity, charge))
            }
            (None, None, None) => None,
            (mz, intensity, charge) => {
                return Err(AlignmentShapeError::PartialObservation {
                    kind: value.fragment_kind,
                    index: value.fragment_idx,
                    mz: mz.is_some(),
                    intensity: intensity.is_some(),
                    charge: charge.is_some(),
                })
            }
        };
        Ok(AlignmentRecord {
            fragment_mz: value.fragment_mz,
            fragment_loss: value.fragment_loss,
            fragment_kind: value.fragment_kind,
            fragment_idx: value.fragment_idx,
            observed,
        })
    }
}

impl From<AlignmentRecord> for MatchedPeakRecord {
    fn from(value: AlignmentRecord) -> Self {
        let observed = value.observed;
        Self {
            mz: observed.map(|o| o.mz),
            intensity: observed.map(|o| o.intensity),
            charge: observed.map(|o| o.charge),
            fragment_mz: value.fragment_mz,
            fragment_loss: value.fragment_loss,
            fragment_kind: value.fragment_kind,
            fragment_idx: value.fragment_idx,
        }
    }
}

/// One theoretical fragment ion of one candidate peptide against one scan, and
/// the observed peak it matched, if any.
///
/// `fragment_kind` and `fragment_idx` identify the ion within the peptide's fragment set.
/// An unmatched ion is an ordinary, expected outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatchedPeakRecord", into = "MatchedPeakRecord")]
pub struct AlignmentRecord {
    /// The singly charged theoretical m/z
    pub fragment_mz: f64,
    /// The neutral loss mass, 0 when there is none
    pub fragment_loss: f64,
    pub fragment_kind: FragmentKind,
    /// The 1-based position along the backbone, fractional for sub-variants
    pub fragment_idx: f64,
    observed: Option<ObservedPeak>,
}

impl AlignmentRecord {
    /// A theoretical ion with no observed peak
    pub fn unmatched(
        fragment_kind: FragmentKind,
        fragment_idx: f64,
        fragment_mz: f64,
        fragment_loss: f64,
    ) -> Self {
        Self {
            fragment_mz,
            fragment_loss,
            fragment_kind,
            fragment_idx,
            observed: None,
        }
    }

    /// A theoretical ion matched to `observed`
    pub fn matched(
        fragment_kind: FragmentKind,
        fragment_idx: f64,
        fragment_mz: f64,
        fragment_loss: f64,
        observed: ObservedPeak,
    ) -> Self {
        Self {
            observed: Some(observed),
            ..Self::unmatched(fragment_kind, fragment_idx, fragment_mz, fragment_loss)
        }
    }

    pub fn observed(&self) -> Option<&ObservedPeak> {
        self.observed.as_ref()
    }

    pub fn is_matched(&self) -> bool {
        self.observed.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_observed_fields_all_present() {
        let payload = r#"{"mz": 175.119, "intensity": 1200.0, "charge": 1,
            "fragment_mz": 175.1190, "fragment_loss": 0.0, "fragment_kind": "Y", "fragment_idx": 1}"#;
        let record: AlignmentRecord = serde_json::from_str(payload).unwrap();
        assert!(record.is_matched());
        assert_eq!(record.observed().unwrap().charge, 1);
        assert_eq!(record.fragment_idx, 1.0);
    }

    #[test]
    fn test_observed_fields_all_absent() {
        let payload = r#"{"mz": null, "intensity": null, "charge": null,
            "fragment_mz": 262.151, "fragment_loss": 0.0, "fragment_kind": "B", "fragment_idx": 2}"#;
        let record: AlignmentRecord = serde_json::from_str(payload).unwrap();
        assert!(!record.is_matched());
        assert_eq!(record.fragment_kind, FragmentKind::B);
    }

    #[test]
    fn test_partial_observation_rejected() {
        let payload = r#"{"mz": 175.119, "intensity": null, "charge": 1,
            "fragment_mz": 175.1190, "fragment_kind": "Y", "fragment_idx": 1}"#;
        let err = serde_json::from_str::<AlignmentRecord>(payload).unwrap_err();
        assert!(err.to_string().contains("partial observation"), "{err}");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let payload = r#"{"mz": null, "intensity": null, "charge": null,
            "fragment_mz": 175.1190, "fragment_kind": "Q", "fragment_idx": 1}"#;
        assert!(serde_json::from_str::<AlignmentRecord>(payload).is_err());
    }

    #[test]
    fn test_zero_index_rejected() {
        let payload = r#"{"mz": null, "intensity": null, "charge": null,
            "fragment_mz": 175.1190, "fragment_kind": "Y", "fragment_idx": 0}"#;
        assert!(serde_json::from_str::<AlignmentRecord>(payload).is_err());
    }

    #[test]
    fn test_serializes_nullable_fields() {
        let record = AlignmentRecord::unmatched(FragmentKind::Y, 3.0, 347.2, 0.0);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["mz"].is_null());
        assert!(value["charge"].is_null());
        assert_eq!(value["fragment_kind"], "Y");
    }
}
