//! Ranked peptide identifications reported by the scoring engine
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::peptide::{PeptideError, PeptideSequence};

/// One ranked peptide-spectrum match for a scan.
///
/// Every score here is computed by the scoring engine and only carried along
/// for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The peptide sequence, possibly with inline modification notation
    pub peptide: String,
    pub peptide_len: usize,
    pub proteins: String,
    #[serde(default)]
    pub specid: usize,
    #[serde(default)]
    pub scannr: usize,
    /// Target (1) or decoy (-1)
    #[serde(default)]
    pub label: i32,
    #[serde(rename = "expmass")]
    pub experimental_mass: f64,
    #[serde(rename = "calcmass")]
    pub calculated_mass: f64,
    pub charge: u8,
    pub rt: f32,
    pub delta_mass: f64,
    pub hyperscore: f64,
    pub delta_hyperscore: f64,
    pub matched_peaks: u32,
    pub longest_b: u32,
    pub longest_y: u32,
    pub matched_intensity_pct: f32,
    pub scored_candidates: u32,
    pub poisson: f64,
    #[serde(default = "Candidate::unset_q_value")]
    pub q_value: f32,
}

impl Candidate {
    fn unset_q_value() -> f32 {
        1.0
    }

    /// A target candidate with only its identity and primary score filled in
    pub fn new(peptide: &str, charge: u8, hyperscore: f64) -> Self {
        let peptide_len = peptide.chars().filter(|c| c.is_alphabetic()).count();
        Self {
            peptide: peptide.to_string(),
            peptide_len,
            proteins: String::new(),
            specid: 0,
            scannr: 0,
            label: 1,
            experimental_mass: 0.0,
            calculated_mass: 0.0,
            charge,
            rt: 0.0,
            delta_mass: 0.0,
            hyperscore,
            delta_hyperscore: 0.0,
            matched_peaks: 0,
            longest_b: 0,
            longest_y: 0,
            matched_intensity_pct: 0.0,
            scored_candidates: 0,
            poisson: 0.0,
            q_value: Self::unset_q_value(),
        }
    }

    pub fn is_decoy(&self) -> bool {
        self.label < 0
    }

    /// Split the reported peptide into its lookup key and display form
    pub fn sequence(&self) -> Result<PeptideSequence, PeptideError> {
        self.peptide.parse()
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} z={} hyperscore={:0.3} (Δ{:0.3}) matched={} b={} y={} q={:0.4}",
            self.peptide,
            self.charge,
            self.hyperscore,
            self.delta_hyperscore,
            self.matched_peaks,
            self.longest_b,
            self.longest_y,
            self.q_value,
        )
    }
}
