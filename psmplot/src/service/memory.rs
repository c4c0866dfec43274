//! A [`SpectrumService`] answered from data held in memory, for offline rendering and testing
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AlignmentRequest, SearchConfig, ServiceError, SpectrumQuery, SpectrumService};
use crate::alignment::AlignmentRecord;
use crate::candidate::Candidate;
use crate::spectrum::Spectrum;

/// The operations of a [`SpectrumService`], for selectively disabling them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Spectrum,
    Candidates,
    Alignment,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::Spectrum => "fetch_spectrum",
            Self::Candidates => "fetch_candidates",
            Self::Alignment => "fetch_alignment",
        }
    }
}

/// The alignment of one peptide against one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAlignment {
    pub scan_id: usize,
    /// The bare residue sequence the alignment was computed for
    pub sequence: String,
    pub records: Vec<AlignmentRecord>,
}

/// The on-disk shape of an in-memory service's data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub spectra: Vec<Spectrum>,
    pub candidates: HashMap<usize, Vec<Candidate>>,
    pub alignments: Vec<StoredAlignment>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySpectrumService {
    fixture: Fixture,
    failing: HashSet<Operation>,
}

impl InMemorySpectrumService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON [`Fixture`] from `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let handle = io::BufReader::new(fs::File::open(path)?);
        let fixture: Fixture = serde_json::from_reader(handle)?;
        debug!(
            "Loaded {} spectra, {} candidate lists and {} alignments from {}",
            fixture.spectra.len(),
            fixture.candidates.len(),
            fixture.alignments.len(),
            path.display()
        );
        Ok(Self::from(fixture))
    }

    pub fn with_spectrum(mut self, spectrum: Spectrum) -> Self {
        self.fixture.spectra.retain(|s| s.scan_id != spectrum.scan_id);
        self.fixture.spectra.push(spectrum);
        self
    }

    pub fn with_candidates(mut self, scan_id: usize, candidates: Vec<Candidate>) -> Self {
        self.fixture.candidates.insert(scan_id, candidates);
        self
    }

    pub fn with_alignment(
        mut self,
        scan_id: usize,
        sequence: &str,
        records: Vec<AlignmentRecord>,
    ) -> Self {
        self.fixture.alignments.push(StoredAlignment {
            scan_id,
            sequence: sequence.to_string(),
            records,
        });
        self
    }

    /// Make every call to `operation` fail as though the service were unreachable
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    fn check(&self, operation: Operation, scan_id: usize) -> Result<(), ServiceError> {
        if self.failing.contains(&operation) {
            warn!("{} was configured to fail", operation.name());
            return Err(ServiceError::NotAvailable {
                operation: operation.name(),
                scan_id,
            });
        }
        Ok(())
    }

    fn find_spectrum(&self, scan_id: usize) -> Result<&Spectrum, ServiceError> {
        self.fixture
            .spectra
            .iter()
            .find(|s| s.scan_id == scan_id)
            .ok_or(ServiceError::ScanNotFound(scan_id))
    }
}

impl From<Fixture> for InMemorySpectrumService {
    fn from(fixture: Fixture) -> Self {
        Self {
            fixture,
            failing: HashSet::new(),
        }
    }
}

impl SpectrumService for InMemorySpectrumService {
    fn fetch_spectrum(
        &self,
        scan_id: usize,
        query: &SpectrumQuery,
    ) -> Result<Spectrum, ServiceError> {
        self.check(Operation::Spectrum, scan_id)?;
        let mut spectrum = self.find_spectrum(scan_id)?.clone();
        spectrum.retain_most_intense(query.max_peaks);
        Ok(spectrum)
    }

    fn fetch_candidates(
        &self,
        scan_id: usize,
        config: &SearchConfig,
    ) -> Result<Vec<Candidate>, ServiceError> {
        self.check(Operation::Candidates, scan_id)?;
        self.find_spectrum(scan_id)?;
        let mut candidates = self
            .fixture
            .candidates
            .get(&scan_id)
            .cloned()
            .ok_or(ServiceError::NotAvailable {
                operation: Operation::Candidates.name(),
                scan_id,
            })?;
        candidates.sort_by(|a, b| b.hyperscore.total_cmp(&a.hyperscore));
        candidates.truncate(config.report_psms);
        Ok(candidates)
    }

    fn fetch_alignment(
        &self,
        scan_id: usize,
        request: &AlignmentRequest,
    ) -> Result<Vec<AlignmentRecord>, ServiceError> {
        self.check(Operation::Alignment, scan_id)?;
        self.find_spectrum(scan_id)?;
        self.fixture
            .alignments
            .iter()
            .find(|a| a.scan_id == scan_id && a.sequence == request.sequence)
            .map(|a| a.records.clone())
            .ok_or(ServiceError::NotAvailable {
                operation: Operation::Alignment.name(),
                scan_id,
            })
    }
}
