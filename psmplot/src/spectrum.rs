//! The observed peak list of a single scan
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PROTON;

/// A single centroid, measured as a neutral mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mass: f64,
    pub intensity: f32,
}

impl Peak {
    pub fn new(mass: f64, intensity: f32) -> Self {
        Self { mass, intensity }
    }

    /// The singly protonated m/z this peak is drawn at
    pub fn mz(&self) -> f64 {
        self.mass + PROTON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precursor {
    pub mz: f64,
    #[serde(default)]
    pub intensity: Option<f32>,
    #[serde(default)]
    pub charge: Option<u8>,
    /// The scan this precursor was selected from, if it was not the preceding survey scan
    #[serde(default)]
    pub scan: Option<usize>,
}

impl Precursor {
    pub fn new(mz: f64, intensity: Option<f32>, charge: Option<u8>, scan: Option<usize>) -> Self {
        Self {
            mz,
            intensity,
            charge,
            scan,
        }
    }
}

/// Reasons a spectrum payload is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumShapeError {
    #[error("peak at mass {mass} has a negative intensity {intensity}")]
    NegativeIntensity { mass: f64, intensity: f32 },
    #[error("peak has a non-finite mass")]
    NonFiniteMass,
}

/// The wire shape of a spectrum, before peak ordering is established
#[derive(Debug, Clone, Deserialize)]
struct SpectrumRecord {
    #[serde(alias = "scan")]
    scan_id: usize,
    level: u8,
    #[serde(default)]
    rt: f32,
    #[serde(default)]
    ion_injection_time: f32,
    #[serde(default)]
    peaks: Vec<Peak>,
    #[serde(default)]
    precursors: Vec<Precursor>,
}

impl TryFrom<SpectrumRecord> for Spectrum {
    type Error = SpectrumShapeError;

    fn try_from(value: SpectrumRecord) -> Result<Self, Self::Error> {
        for peak in value.peaks.iter() {
            if !peak.mass.is_finite() {
                return Err(SpectrumShapeError::NonFiniteMass);
            }
            if peak.intensity < 0.0 {
                return Err(SpectrumShapeError::NegativeIntensity {
                    mass: peak.mass,
                    intensity: peak.intensity,
                });
            }
        }
        Ok(Spectrum::new(
            value.scan_id,
            value.level,
            value.rt,
            value.ion_injection_time,
            value.peaks,
            value.precursors,
        ))
    }
}

/// A processed scan as served by the scoring engine.
///
/// Peaks are always held in increasing mass order; construction sorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpectrumRecord")]
pub struct Spectrum {
    pub scan_id: usize,
    pub level: u8,
    pub rt: f32,
    pub ion_injection_time: f32,
    peaks: Vec<Peak>,
    precursors: Vec<Precursor>,
}

impl Spectrum {
    pub fn new(
        scan_id: usize,
        level: u8,
        rt: f32,
        ion_injection_time: f32,
        mut peaks: Vec<Peak>,
        precursors: Vec<Precursor>,
    ) -> Self {
        peaks.sort_by(|a, b| a.mass.total_cmp(&b.mass));
        Self {
            scan_id,
            level,
            rt,
            ion_injection_time,
            peaks,
            precursors,
        }
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn precursors(&self) -> &[Precursor] {
        &self.precursors
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// The charge of the first precursor that has one
    pub fn precursor_charge(&self) -> Option<u8> {
        self.precursors.iter().find_map(|p| p.charge)
    }

    /// The lowest and highest drawn m/z, if there are any peaks
    pub fn mz_range(&self) -> Option<(f64, f64)> {
        let first = self.peaks.first()?;
        let last = self.peaks.last()?;
        Some((first.mz(), last.mz()))
    }

    pub fn base_peak_intensity(&self) -> f32 {
        self.peaks
            .iter()
            .map(|p| p.intensity)
            .fold(0.0, f32::max)
    }

    /// Keep only the `max_peaks` most intense peaks, restoring mass order afterwards
    pub fn retain_most_intense(&mut self, max_peaks: usize) {
        if self.peaks.len() <= max_peaks {
            return;
        }
        self.peaks
            .sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        self.peaks.truncate(max_peaks);
        self.peaks.sort_by(|a, b| a.mass.total_cmp(&b.mass));
    }
}
