//! Access to a scoring engine's spectra, candidate rankings and fragment alignments.
//!
//! Each operation is independent and may fail on its own; a failure is returned as a
//! [`ServiceError`] carrying the diagnostic, never panicked on.
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alignment::AlignmentRecord;
use crate::candidate::Candidate;
use crate::peptide::{Modifications, PeptideSequence};
use crate::spectrum::Spectrum;
use crate::tolerance::Tolerance;

pub mod http;
pub mod memory;

pub use http::HttpSpectrumService;
pub use memory::InMemorySpectrumService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid spectrum service URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to reach the spectrum service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("The spectrum service responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to decode the spectrum service response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Scan {0} was not found")]
    ScanNotFound(usize),
    #[error("{operation} is not available for scan {scan_id}")]
    NotAvailable {
        operation: &'static str,
        scan_id: usize,
    },
    #[error("An IO error occurred: {0}")]
    Io(#[from] io::Error),
}

/// Peak list processing options for [`SpectrumService::fetch_spectrum`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumQuery {
    pub deisotope: bool,
    /// Keep at most this many of the most intense peaks
    pub max_peaks: usize,
}

impl Default for SpectrumQuery {
    fn default() -> Self {
        Self {
            deisotope: true,
            max_peaks: 150,
        }
    }
}

/// Database search options for [`SpectrumService::fetch_candidates`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub precursor_tolerance: Tolerance,
    pub fragment_tolerance: Tolerance,
    /// The number of ranked candidates to report
    pub report_psms: usize,
    /// Search for co-isolated peptides after the best match is found
    pub chimera: bool,
    pub deisotope: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            precursor_tolerance: Tolerance::Da(-3.6, 1.2),
            fragment_tolerance: Tolerance::ppm(10.0),
            report_psms: 10,
            chimera: true,
            deisotope: true,
        }
    }
}

/// The static parameters every alignment request of a session shares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub modifications: Modifications,
    /// A mass added to the peptide N-terminus, e.g. an isobaric label
    pub nterm: Option<f64>,
    pub fragment_tolerance: Tolerance,
    pub deisotope: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            modifications: Modifications::from([('C', 57.0215)]),
            nterm: None,
            fragment_tolerance: Tolerance::ppm(10.0),
            deisotope: false,
        }
    }
}

/// One peptide to align against a scan, in the scoring engine's request shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    /// The bare residue sequence
    pub sequence: String,
    pub modifications: Modifications,
    pub nterm: Option<f64>,
    pub fragment_tol: Tolerance,
    pub deisotope: Option<bool>,
}

impl AlignmentRequest {
    pub fn new(peptide: &PeptideSequence, config: &AlignmentConfig) -> Self {
        Self {
            sequence: peptide.stripped().to_string(),
            modifications: config.modifications.clone(),
            nterm: config.nterm,
            fragment_tol: config.fragment_tolerance,
            deisotope: Some(config.deisotope),
        }
    }
}

/// A source of spectra, candidate rankings and fragment alignments, addressed by scan number
pub trait SpectrumService {
    fn fetch_spectrum(&self, scan_id: usize, query: &SpectrumQuery)
        -> Result<Spectrum, ServiceError>;

    /// The ranked candidate peptides for a scan, best first
    fn fetch_candidates(
        &self,
        scan_id: usize,
        config: &SearchConfig,
    ) -> Result<Vec<Candidate>, ServiceError>;

    /// Align the theoretical fragments of one peptide against a scan
    fn fetch_alignment(
        &self,
        scan_id: usize,
        request: &AlignmentRequest,
    ) -> Result<Vec<AlignmentRecord>, ServiceError>;
}

impl<T: SpectrumService + ?Sized> SpectrumService for &T {
    fn fetch_spectrum(
        &self,
        scan_id: usize,
        query: &SpectrumQuery,
    ) -> Result<Spectrum, ServiceError> {
        (**self).fetch_spectrum(scan_id, query)
    }

    fn fetch_candidates(
        &self,
        scan_id: usize,
        config: &SearchConfig,
    ) -> Result<Vec<Candidate>, ServiceError> {
        (**self).fetch_candidates(scan_id, config)
    }

    fn fetch_alignment(
        &self,
        scan_id: usize,
        request: &AlignmentRequest,
    ) -> Result<Vec<AlignmentRecord>, ServiceError> {
        (**self).fetch_alignment(scan_id, request)
    }
}

impl<T: SpectrumService + ?Sized> SpectrumService for Box<T> {
    fn fetch_spectrum(
        &self,
        scan_id: usize,
        query: &SpectrumQuery,
    ) -> Result<Spectrum, ServiceError> {
        (**self).fetch_spectrum(scan_id, query)
    }

    fn fetch_candidates(
        &self,
        scan_id: usize,
        config: &SearchConfig,
    ) -> Result<Vec<Candidate>, ServiceError> {
        (**self).fetch_candidates(scan_id, config)
    }

    fn fetch_alignment(
        &self,
        scan_id: usize,
        request: &AlignmentRequest,
    ) -> Result<Vec<AlignmentRecord>, ServiceError> {
        (**self).fetch_alignment(scan_id, request)
    }
}
