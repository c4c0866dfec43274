//! Turn [`AlignmentRecord`]s into drawable fragment ion labels.
//!
//! Everything here is a pure function of its inputs so it can be exercised without
//! any drawing surface.
//!
//! A label reads as the lowercase ion series letter, the backbone position, one `+`
//! per charge and an optional neutral loss tag, e.g. `y7++-H2O`. Neutral losses are
//! classified by mass threshold, testing water before ammonia:
//!
//! | loss mass       | suffix |
//! |-----------------|--------|
//! | `>= 18`         | `-H2O` |
//! | `>= 17`, `< 18` | `-NH3` |
//! | `< 17`          | none   |
use crate::alignment::{AlignmentRecord, FragmentKind};
use crate::mirror::MirrorSign;

/// The height an unmatched theoretical ion is marked at, just clear of the baseline
pub const UNMATCHED_SENTINEL_HEIGHT: f32 = 20.0;

/// Labels are drawn rotated this many degrees from horizontal, reading upwards
pub const LABEL_ROTATION_DEGREES: f32 = 90.0;

const WATER_LOSS_THRESHOLD: f64 = 18.0;
const AMMONIA_LOSS_THRESHOLD: f64 = 17.0;

/// Which palette entry an annotation is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    BIon,
    YIon,
    /// A theoretical ion with no observed peak
    Unmatched,
}

impl ColorClass {
    /// B ions get their own color, every other series shares the y ion color
    pub fn for_kind(kind: FragmentKind) -> Self {
        match kind {
            FragmentKind::B => Self::BIon,
            _ => Self::YIon,
        }
    }
}

/// Where a label is anchored, which is also the top of the stem beneath it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f32,
}

impl Placement {
    pub fn new(x: f64, y: f32) -> Self {
        Self { x, y }
    }

    pub fn signed(self, sign: MirrorSign) -> Self {
        Self {
            x: self.x,
            y: sign.apply(self.y),
        }
    }
}

pub fn loss_suffix(loss: f64) -> &'static str {
    if loss >= WATER_LOSS_THRESHOLD {
        "-H2O"
    } else if loss >= AMMONIA_LOSS_THRESHOLD {
        "-NH3"
    } else {
        ""
    }
}

fn format_index(index: f64) -> String {
    if index.fract() == 0.0 {
        format!("{index:.0}")
    } else {
        index.to_string()
    }
}

/// Build the textual label for a fragment ion
pub fn label_text(kind: FragmentKind, index: f64, charge: u8, loss: f64) -> String {
    let mut label = String::with_capacity(8 + charge as usize);
    label.push(kind.letter());
    label.push_str(&format_index(index));
    for _ in 0..charge {
        label.push('+');
    }
    label.push_str(loss_suffix(loss));
    label
}

/// A synthesized fragment ion annotation, in unmirrored coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub label: String,
    pub placement: Placement,
    pub color: ColorClass,
    pub kind: FragmentKind,
    pub matched: bool,
}

impl Annotation {
    /// Build an annotation for `record` with an explicit charge state and neutral loss mass.
    ///
    /// Matched records are placed on top of their observed peak. Unmatched records are
    /// placed at their theoretical m/z at [`UNMATCHED_SENTINEL_HEIGHT`] and colored
    /// [`ColorClass::Unmatched`].
    pub fn synthesize(record: &AlignmentRecord, charge: u8, loss: f64) -> Self {
        let label = label_text(record.fragment_kind, record.fragment_idx, charge, loss);
        let (placement, color) = match record.observed() {
            Some(observed) => (
                Placement::new(observed.mz, observed.intensity),
                ColorClass::for_kind(record.fragment_kind),
            ),
            None => (
                Placement::new(record.fragment_mz, UNMATCHED_SENTINEL_HEIGHT),
                ColorClass::Unmatched,
            ),
        };
        Self {
            label,
            placement,
            color,
            kind: record.fragment_kind,
            matched: record.is_matched(),
        }
    }

    /// Build an annotation using the record's own observed charge and neutral loss.
    ///
    /// Theoretical fragment m/z values are singly charged, so an unmatched record is
    /// labeled as charge 1.
    pub fn from_record(record: &AlignmentRecord) -> Self {
        let charge = record.observed().map(|o| o.charge).unwrap_or(1);
        Self::synthesize(record, charge, record.fragment_loss)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alignment::ObservedPeak;

    fn matched_y7() -> AlignmentRecord {
        AlignmentRecord::matched(
            FragmentKind::Y,
            7.0,
            1001.47,
            0.0,
            ObservedPeak::new(1001.471, 5321.0, 2),
        )
    }

    #[test]
    fn test_loss_suffix_thresholds() {
        assert_eq!(loss_suffix(0.0), "");
        assert_eq!(loss_suffix(16.999), "");
        assert_eq!(loss_suffix(17.0), "-NH3");
        assert_eq!(loss_suffix(17.026549), "-NH3");
        assert_eq!(loss_suffix(17.999), "-NH3");
        assert_eq!(loss_suffix(18.0), "-H2O");
        assert_eq!(loss_suffix(18.010565), "-H2O");
        assert_eq!(loss_suffix(36.02), "-H2O");
    }

    #[test]
    fn test_charge_markers() {
        for charge in 0..6u8 {
            let label = label_text(FragmentKind::B, 4.0, charge, 0.0);
            let plus = label.chars().rev().take_while(|c| *c == '+').count();
            assert_eq!(plus, charge as usize, "{label}");
        }
        assert_eq!(label_text(FragmentKind::B, 4.0, 0, 0.0), "b4");
    }

    #[test]
    fn test_label_text() {
        assert_eq!(label_text(FragmentKind::Y, 7.0, 2, 0.0), "y7++");
        assert_eq!(label_text(FragmentKind::B, 12.0, 1, 18.010565), "b12+-H2O");
        assert_eq!(label_text(FragmentKind::Y, 3.5, 1, 17.026549), "y3.5+-NH3");
    }

    #[test]
    fn test_matched_placement() {
        let record = matched_y7();
        let annotation = Annotation::from_record(&record);
        assert_eq!(annotation.label, "y7++");
        assert_eq!(annotation.placement, Placement::new(1001.471, 5321.0));
        assert_eq!(annotation.color, ColorClass::YIon);
        assert!(annotation.matched);
    }

    #[test]
    fn test_unmatched_placement() {
        let record = AlignmentRecord::unmatched(FragmentKind::B, 3.0, 262.15, 0.0);
        let annotation = Annotation::from_record(&record);
        assert_eq!(annotation.label, "b3+");
        assert_eq!(
            annotation.placement,
            Placement::new(262.15, UNMATCHED_SENTINEL_HEIGHT)
        );
        assert_eq!(annotation.color, ColorClass::Unmatched);
        assert!(!annotation.matched);
    }

    #[test]
    fn test_color_classes() {
        assert_eq!(ColorClass::for_kind(FragmentKind::B), ColorClass::BIon);
        for kind in [
            FragmentKind::A,
            FragmentKind::C,
            FragmentKind::X,
            FragmentKind::Y,
            FragmentKind::Z,
        ] {
            assert_eq!(ColorClass::for_kind(kind), ColorClass::YIon);
        }
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let record = matched_y7();
        let first = Annotation::synthesize(&record, 3, 18.0);
        let second = Annotation::synthesize(&record, 3, 18.0);
        assert_eq!(first, second);
        assert_eq!(first.label, "y7+++-H2O");
    }

    #[test]
    fn test_signed_placement() {
        let placement = Placement::new(500.0, 120.0);
        assert_eq!(placement.signed(MirrorSign::Upper), placement);
        assert_eq!(
            placement.signed(MirrorSign::Lower),
            Placement::new(500.0, -120.0)
        );
    }
}
