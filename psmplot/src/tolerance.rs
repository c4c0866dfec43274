use std::{fmt::Display, num::ParseFloatError, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A signed mass error window, serialized the way the scoring engine expects it,
/// e.g. `{"da": [-0.3, 0.3]}` or `{"ppm": [-10.0, 10.0]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    Da(f64, f64),
    Ppm(f64, f64),
}

impl Tolerance {
    pub fn da(width: f64) -> Self {
        Self::Da(-width.abs(), width.abs())
    }

    pub fn ppm(width: f64) -> Self {
        Self::Ppm(-width.abs(), width.abs())
    }

    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Self::Da(lo, hi) | Self::Ppm(lo, hi) => (*lo, *hi),
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Self::Da(_, _) => "da",
            Self::Ppm(_, _) => "ppm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToleranceParseError {
    #[error("Unknown tolerance unit {0:?}, expected `da` or `ppm`")]
    UnknownUnit(String),
    #[error("Failed to parse tolerance lower bound {0}")]
    MalformedLower(ParseFloatError),
    #[error("Failed to parse tolerance upper bound {0}")]
    MalformedUpper(ParseFloatError),
    #[error("Tolerance lower bound {0} is greater than upper bound {1}")]
    Inverted(f64, f64),
}

impl FromStr for Tolerance {
    type Err = ToleranceParseError;

    /// Parse `unit:width` for a symmetric window or `unit:lower,upper`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (unit, bounds) = s.split_once(':').unwrap_or(("ppm", s));
        let (lo, hi) = match bounds.split_once(',') {
            Some((lo, hi)) => (
                lo.trim()
                    .parse::<f64>()
                    .map_err(ToleranceParseError::MalformedLower)?,
                hi.trim()
                    .parse::<f64>()
                    .map_err(ToleranceParseError::MalformedUpper)?,
            ),
            None => {
                let width = bounds
                    .trim()
                    .parse::<f64>()
                    .map_err(ToleranceParseError::MalformedUpper)?
                    .abs();
                (-width, width)
            }
        };
        if lo > hi {
            return Err(ToleranceParseError::Inverted(lo, hi));
        }
        match unit.trim().to_lowercase().as_str() {
            "da" => Ok(Self::Da(lo, hi)),
            "ppm" => Ok(Self::Ppm(lo, hi)),
            _ => Err(ToleranceParseError::UnknownUnit(unit.to_string())),
        }
    }
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (lo, hi) = self.bounds();
        write!(f, "{}:{},{}", self.unit(), lo, hi)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tolerance_fromstr() -> Result<(), ToleranceParseError> {
        let t: Tolerance = "da:-0.3,0.3".parse()?;
        assert_eq!(t, Tolerance::Da(-0.3, 0.3));

        let t: Tolerance = "ppm:10".parse()?;
        assert_eq!(t, Tolerance::Ppm(-10.0, 10.0));

        let t: Tolerance = "da:0.3".parse()?;
        assert_eq!(t, Tolerance::da(0.3));
        assert_eq!(Tolerance::da(-0.3).bounds(), (-0.3, 0.3));

        let t: Tolerance = "DA:-3.6, 1.2".parse()?;
        assert_eq!(t, Tolerance::Da(-3.6, 1.2));

        let t: Tolerance = "20".parse()?;
        assert_eq!(t, Tolerance::ppm(20.0));

        let t: Tolerance = Tolerance::Da(-3.6, 1.2).to_string().parse()?;
        assert_eq!(t, Tolerance::Da(-3.6, 1.2));
        Ok(())
    }

    #[test]
    fn test_tolerance_fromstr_malformed() {
        assert!(matches!(
            "th:10".parse::<Tolerance>(),
            Err(ToleranceParseError::UnknownUnit(_))
        ));
        assert!(matches!(
            "da:a,1".parse::<Tolerance>(),
            Err(ToleranceParseError::MalformedLower(_))
        ));
        assert!(matches!(
            "da:-1,b".parse::<Tolerance>(),
            Err(ToleranceParseError::MalformedUpper(_))
        ));
        assert!(matches!(
            "da:1,-1".parse::<Tolerance>(),
            Err(ToleranceParseError::Inverted(_, _))
        ));
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(Tolerance::Da(-0.3, 0.3)).unwrap();
        assert_eq!(value, serde_json::json!({"da": [-0.3, 0.3]}));
        let t: Tolerance = serde_json::from_str(r#"{"ppm": [-10.0, 10.0]}"#).unwrap();
        assert_eq!(t, Tolerance::ppm(10.0));
    }
}
