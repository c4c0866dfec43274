//! Orientation of a render pass on a shared mass axis
use std::fmt::Display;

use crate::annotation::Placement;

/// Which half of a mirrored plot a render pass draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MirrorSign {
    /// Heights point up from the baseline
    #[default]
    Upper,
    /// Heights point down from the baseline
    Lower,
}

impl MirrorSign {
    pub fn factor(&self) -> f32 {
        match self {
            Self::Upper => 1.0,
            Self::Lower => -1.0,
        }
    }

    #[inline]
    pub fn apply(&self, height: f32) -> f32 {
        height * self.factor()
    }

    pub fn flipped(&self) -> Self {
        match self {
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
        }
    }
}

impl Display for MirrorSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upper => f.write_str("+1"),
            Self::Lower => f.write_str("-1"),
        }
    }
}

/// The geometry of one render pass.
///
/// The sign is fixed when the pass begins, so every stem and label drawn
/// through the same `MirrorGeometry` agree on their orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorGeometry {
    sign: MirrorSign,
}

impl MirrorGeometry {
    pub fn new(sign: MirrorSign) -> Self {
        Self { sign }
    }

    pub fn sign(&self) -> MirrorSign {
        self.sign
    }

    /// The signed height of a stem of unsigned `height`
    pub fn stem_height(&self, height: f32) -> f32 {
        self.sign.apply(height)
    }

    pub fn place(&self, placement: Placement) -> Placement {
        placement.signed(self.sign)
    }
}

impl From<MirrorSign> for MirrorGeometry {
    fn from(value: MirrorSign) -> Self {
        Self::new(value)
    }
}
