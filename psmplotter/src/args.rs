use std::{error::Error, fmt::Display, num::ParseFloatError, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// A static modification given as `residue=delta`, e.g. `C=57.0215`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArgModification(pub char, pub f64);

#[derive(Debug)]
pub enum ModificationParseError {
    MissingDelimiter(String),
    InvalidResidue(String),
    MalformedDelta(ParseFloatError),
}

impl Display for ModificationParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationParseError::MissingDelimiter(s) => {
                write!(f, "Modification {s:?} must be written as residue=delta")
            }
            ModificationParseError::InvalidResidue(s) => {
                write!(f, "Modification residue {s:?} must be a single letter")
            }
            ModificationParseError::MalformedDelta(e) => {
                write!(f, "Failed to parse modification mass delta {e}")
            }
        }
    }
}

impl Error for ModificationParseError {}

impl FromStr for ArgModification {
    type Err = ModificationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (residue, delta) = s
            .split_once('=')
            .ok_or_else(|| ModificationParseError::MissingDelimiter(s.to_string()))?;
        let residue = residue.trim();
        let mut chars = residue.chars();
        let residue = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return Err(ModificationParseError::InvalidResidue(residue.to_string())),
        };
        let delta = delta
            .trim()
            .parse()
            .map_err(ModificationParseError::MalformedDelta)?;
        Ok(Self(residue, delta))
    }
}

impl TryFrom<String> for ArgModification {
    type Error = ModificationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArgModification> for String {
    fn from(value: ArgModification) -> Self {
        value.to_string()
    }
}

impl Display for ArgModification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.0, self.1)
    }
}

/// The size of the rendered image in pixels, denoted (width)x(height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dimensions(pub u32, pub u32);

impl Default for Dimensions {
    fn default() -> Self {
        Self(1200, 600)
    }
}

#[derive(Debug)]
pub enum DimensionsParseError {
    MissingDelimiter(String),
    MalformedWidth(ParseIntError),
    MalformedHeight(ParseIntError),
    Empty,
}

impl Display for DimensionsParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionsParseError::MissingDelimiter(s) => {
                write!(f, "Dimensions {s:?} must be written as (width)x(height)")
            }
            DimensionsParseError::MalformedWidth(e) => {
                write!(f, "Failed to parse image width {e}")
            }
            DimensionsParseError::MalformedHeight(e) => {
                write!(f, "Failed to parse image height {e}")
            }
            DimensionsParseError::Empty => f.write_str("Image dimensions must be non-zero"),
        }
    }
}

impl Error for DimensionsParseError {}

impl FromStr for Dimensions {
    type Err = DimensionsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
            .ok_or_else(|| DimensionsParseError::MissingDelimiter(s.to_string()))?;
        let width: u32 = width
            .parse()
            .map_err(DimensionsParseError::MalformedWidth)?;
        let height: u32 = height
            .parse()
            .map_err(DimensionsParseError::MalformedHeight)?;
        if width == 0 || height == 0 {
            return Err(DimensionsParseError::Empty);
        }
        Ok(Self(width, height))
    }
}

impl TryFrom<String> for Dimensions {
    type Error = DimensionsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dimensions> for String {
    fn from(value: Dimensions) -> Self {
        value.to_string()
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.0, self.1)
    }
}
