//! Peptide strings carrying inline modification notation
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Static modifications keyed by residue letter, as mass deltas
pub type Modifications = BTreeMap<char, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeptideError {
    #[error("The peptide {0:?} has no residues once modification notation is removed")]
    NoResidues(String),
}

/// A peptide as reported, alongside the bare residue sequence used to request
/// fragment alignments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeptideSequence {
    display: String,
    stripped: String,
}

impl PeptideSequence {
    pub fn new(peptide: &str) -> Result<Self, PeptideError> {
        let stripped: String = peptide.chars().filter(|c| c.is_alphabetic()).collect();
        if stripped.is_empty() {
            return Err(PeptideError::NoResidues(peptide.to_string()));
        }
        Ok(Self {
            display: peptide.to_string(),
            stripped,
        })
    }

    /// The peptide exactly as it was given, for titles and logging
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Only the alphabetic characters of the peptide
    pub fn stripped(&self) -> &str {
        &self.stripped
    }

    pub fn len(&self) -> usize {
        self.stripped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stripped.is_empty()
    }
}

impl FromStr for PeptideSequence {
    type Err = PeptideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for PeptideSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}
