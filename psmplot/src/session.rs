//! A render session draws one scan and any number of candidate overlays onto a surface it owns
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::annotation::{Annotation, Placement, LABEL_ROTATION_DEGREES};
use crate::candidate::Candidate;
use crate::mirror::{MirrorGeometry, MirrorSign};
use crate::peptide::{PeptideError, PeptideSequence};
use crate::service::{
    AlignmentConfig, AlignmentRequest, SearchConfig, ServiceError, SpectrumQuery, SpectrumService,
};
use crate::spectrum::Spectrum;
use crate::surface::{DrawingSurface, Handle, Ink, Label, Scene, Stem, StrokeWeight};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    InvalidPeptide(#[from] PeptideError),
    #[error("No spectrum is loaded for scan {0}")]
    NoSpectrum(usize),
    #[error("No candidates are loaded for scan {0}")]
    NoCandidates(usize),
    #[error("Candidate {index} was requested but only {available} were reported")]
    NoCandidate { index: usize, available: usize },
    #[error("Failed to align {peptide} against scan {scan_id}: {source}")]
    Alignment {
        peptide: String,
        scan_id: usize,
        source: ServiceError,
    },
}

/// One annotation as drawn, with the handles needed to move or remove it
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnAnnotation {
    pub annotation: Annotation,
    pub stem: Handle,
    pub label: Handle,
}

/// The annotations drawn for one candidate peptide in one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub peptide: PeptideSequence,
    pub sign: MirrorSign,
    pub annotations: Vec<DrawnAnnotation>,
}

impl Overlay {
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn matched(&self) -> usize {
        self.annotations
            .iter()
            .filter(|a| a.annotation.matched)
            .count()
    }
}

/// Renders a single scan against a [`SpectrumService`].
///
/// The spectrum and the ranked candidates are fetched once, when the session is opened.
/// Either may be absent if the service failed; the failure is kept so the caller can
/// decide whether to go on. Alignments are fetched per overlay.
pub struct RenderSession<Svc: SpectrumService, S: DrawingSurface = Scene> {
    service: Svc,
    scan_id: usize,
    alignment: AlignmentConfig,
    spectrum: Result<Spectrum, ServiceError>,
    candidates: Result<Vec<Candidate>, ServiceError>,
    surface: S,
    overlays: Vec<Overlay>,
}

impl<Svc: SpectrumService> RenderSession<Svc, Scene> {
    /// Open a session that records onto a fresh [`Scene`]
    pub fn open(
        service: Svc,
        scan_id: usize,
        query: &SpectrumQuery,
        search: &SearchConfig,
        alignment: AlignmentConfig,
    ) -> Self {
        Self::open_with_surface(service, Scene::new(), scan_id, query, search, alignment)
    }
}

impl<Svc: SpectrumService, S: DrawingSurface> RenderSession<Svc, S> {
    pub fn open_with_surface(
        service: Svc,
        surface: S,
        scan_id: usize,
        query: &SpectrumQuery,
        search: &SearchConfig,
        alignment: AlignmentConfig,
    ) -> Self {
        let spectrum = service.fetch_spectrum(scan_id, query);
        match spectrum.as_ref() {
            Ok(spectrum) => debug!(
                "Loaded scan {scan_id} with {} peaks (MS{})",
                spectrum.len(),
                spectrum.level
            ),
            Err(e) => warn!("Spectrum for scan {scan_id} is unavailable: {e}"),
        }

        let candidates = service.fetch_candidates(scan_id, search);
        match candidates.as_ref() {
            Ok(candidates) => {
                info!("Scan {scan_id} has {} candidates", candidates.len());
                for (rank, candidate) in candidates.iter().enumerate() {
                    info!("{}. {candidate}", rank + 1);
                }
            }
            Err(e) => warn!("Candidates for scan {scan_id} are unavailable: {e}"),
        }

        Self {
            service,
            scan_id,
            alignment,
            spectrum,
            candidates,
            surface,
            overlays: Vec::new(),
        }
    }

    pub fn scan_id(&self) -> usize {
        self.scan_id
    }

    pub fn spectrum(&self) -> Option<&Spectrum> {
        self.spectrum.as_ref().ok()
    }

    /// Why the spectrum is absent, if it is
    pub fn spectrum_error(&self) -> Option<&ServiceError> {
        self.spectrum.as_ref().err()
    }

    pub fn candidates(&self) -> Option<&[Candidate]> {
        self.candidates.as_deref().ok()
    }

    /// Why the candidate list is absent, if it is
    pub fn candidates_error(&self) -> Option<&ServiceError> {
        self.candidates.as_ref().err()
    }

    pub fn alignment_config(&self) -> &AlignmentConfig {
        &self.alignment
    }

    /// Change how later overlays are aligned, e.g. to redraw a candidate under a new
    /// fragment tolerance. Overlays already drawn are left as they are.
    pub fn alignment_config_mut(&mut self) -> &mut AlignmentConfig {
        &mut self.alignment
    }

    /// Draw every observed peak as a light background stem, oriented by `sign`.
    ///
    /// The surface is never reset, so drawing once with each sign gives a mirrored view.
    /// Returns the number of stems drawn.
    pub fn render_base(&mut self, sign: MirrorSign) -> Result<usize, RenderError> {
        let spectrum = self
            .spectrum
            .as_ref()
            .map_err(|_| RenderError::NoSpectrum(self.scan_id))?;
        let geometry = MirrorGeometry::new(sign);
        self.surface.baseline();
        for peak in spectrum.peaks() {
            self.surface.stem(Stem {
                x: peak.mz(),
                height: geometry.stem_height(peak.intensity),
                ink: Ink::Background,
                weight: StrokeWeight::Light,
            });
        }
        debug!(
            "Drew {} base stems for scan {} ({sign})",
            spectrum.len(),
            self.scan_id
        );
        Ok(spectrum.len())
    }

    /// Fetch the fragment alignment of `peptide` against this scan and overlay its annotations.
    ///
    /// `peptide` may carry inline modification notation, which is kept for the title but
    /// removed from the alignment request. Returns the number of annotations drawn.
    pub fn render_match(&mut self, peptide: &str, sign: MirrorSign) -> Result<usize, RenderError> {
        let peptide = PeptideSequence::new(peptide)?;
        let request = AlignmentRequest::new(&peptide, &self.alignment);
        let records = self
            .service
            .fetch_alignment(self.scan_id, &request)
            .map_err(|source| RenderError::Alignment {
                peptide: peptide.to_string(),
                scan_id: self.scan_id,
                source,
            })?;

        let geometry = MirrorGeometry::new(sign);
        let mut annotations = Vec::with_capacity(records.len());
        for record in records.iter() {
            let annotation = Annotation::from_record(record);
            let ink = Ink::from(annotation.color);
            // unmatched ions get a short flag at the sentinel height
            let stem = self.surface.stem(Stem {
                x: annotation.placement.x,
                height: geometry.stem_height(annotation.placement.y),
                ink,
                weight: if annotation.matched {
                    StrokeWeight::Regular
                } else {
                    StrokeWeight::Light
                },
            });
            let label = self.surface.label(Label {
                text: annotation.label.clone(),
                at: geometry.place(annotation.placement),
                ink,
                rotation: LABEL_ROTATION_DEGREES,
            });
            annotations.push(DrawnAnnotation {
                annotation,
                stem,
                label,
            });
        }
        self.surface.title(peptide.display());

        let overlay = Overlay {
            peptide,
            sign,
            annotations,
        };
        info!(
            "Annotated {} ({sign}) with {} fragments, {} matched",
            overlay.peptide,
            overlay.len(),
            overlay.matched()
        );
        let drawn = overlay.len();
        self.overlays.push(overlay);
        Ok(drawn)
    }

    /// Overlay the candidate ranked at `index`, counting from zero
    pub fn render_candidate(&mut self, index: usize, sign: MirrorSign) -> Result<usize, RenderError> {
        let candidates = self
            .candidates
            .as_ref()
            .map_err(|_| RenderError::NoCandidates(self.scan_id))?;
        let peptide = candidates
            .get(index)
            .map(|c| c.peptide.clone())
            .ok_or(RenderError::NoCandidate {
                index,
                available: candidates.len(),
            })?;
        self.render_match(&peptide, sign)
    }

    /// Overlay the best `n` candidates with the same `sign`, logging and skipping any that fail.
    ///
    /// Returns the number of overlays drawn.
    pub fn render_top(&mut self, n: usize, sign: MirrorSign) -> usize {
        let available = match self.candidates.as_ref() {
            Ok(candidates) => candidates.len(),
            Err(e) => {
                warn!("No candidates to overlay on scan {}: {e}", self.scan_id);
                return 0;
            }
        };
        let mut drawn = 0;
        for index in 0..n.min(available) {
            match self.render_candidate(index, sign) {
                Ok(_) => drawn += 1,
                Err(e) => error!("Skipping candidate {}: {e}", index + 1),
            }
        }
        drawn
    }

    /// Draw the spectrum both ways up, with candidate `first` above the baseline and
    /// candidate `second` below it.
    ///
    /// Only a missing spectrum is an error. A candidate that cannot be drawn is logged and
    /// skipped. Returns the number of overlays drawn.
    pub fn render_mirrored(&mut self, first: usize, second: usize) -> Result<usize, RenderError> {
        self.render_base(MirrorSign::Upper)?;
        self.render_base(MirrorSign::Lower)?;
        let mut drawn = 0;
        for (index, sign) in [(first, MirrorSign::Upper), (second, MirrorSign::Lower)] {
            match self.render_candidate(index, sign) {
                Ok(_) => drawn += 1,
                Err(e) => error!("Skipping candidate {} ({sign}): {e}", index + 1),
            }
        }
        Ok(drawn)
    }

    /// Move every overlay label `clearance` further from the baseline than its anchor
    pub fn relayout_labels(&mut self, clearance: f32) -> usize {
        let mut moved = 0;
        for overlay in self.overlays.iter() {
            let geometry = MirrorGeometry::new(overlay.sign);
            for drawn in overlay.annotations.iter() {
                let at = drawn.annotation.placement;
                let at = geometry.place(Placement::new(at.x, at.y + clearance));
                if self.surface.reposition(drawn.label, at) {
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Remove every overlay drawn so far, leaving the base stems in place.
    ///
    /// Returns the number of overlays removed.
    pub fn clear_overlays(&mut self) -> usize {
        let cleared = self.overlays.len();
        for overlay in self.overlays.drain(..) {
            for drawn in overlay.annotations {
                self.surface.remove(drawn.stem);
                self.surface.remove(drawn.label);
            }
        }
        self.surface.clear_title();
        debug!("Cleared {cleared} overlays from scan {}", self.scan_id);
        cleared
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alignment::{AlignmentRecord, FragmentKind, ObservedPeak};
    use crate::annotation::{ColorClass, UNMATCHED_SENTINEL_HEIGHT};
    use crate::service::memory::{InMemorySpectrumService, Operation};
    use crate::spectrum::Peak;
    use crate::surface::Mark;

    fn service() -> InMemorySpectrumService {
        let spectrum = Spectrum::new(
            4,
            2,
            10.0,
            5.0,
            vec![
                Peak::new(146.105, 300.0),
                Peak::new(243.158, 150.0),
                Peak::new(400.2, 80.0),
            ],
            vec![],
        );
        InMemorySpectrumService::new()
            .with_spectrum(spectrum)
            .with_candidates(
                4,
                vec![
                    Candidate::new("PEK", 1, 20.0),
                    Candidate::new("[+42.0106]-PEK", 1, 10.0),
                ],
            )
            .with_alignment(
                4,
                "PEK",
                vec![
                    AlignmentRecord::matched(
                        FragmentKind::Y,
                        1.0,
                        147.1128,
                        0.0,
                        ObservedPeak::new(147.112, 300.0, 1),
                    ),
                    AlignmentRecord::unmatched(FragmentKind::B, 2.0, 227.1026, 0.0),
                ],
            )
    }

    fn open(service: InMemorySpectrumService) -> RenderSession<InMemorySpectrumService> {
        RenderSession::open(
            service,
            4,
            &SpectrumQuery::default(),
            &SearchConfig::default(),
            AlignmentConfig::default(),
        )
    }

    #[test]
    fn test_render_base_sign_symmetry() -> Result<(), RenderError> {
        let mut session = open(service());
        assert_eq!(session.render_base(MirrorSign::Upper)?, 3);
        assert_eq!(session.render_base(MirrorSign::Lower)?, 3);
        let stems: Vec<_> = session.surface().stems().collect();
        assert_eq!(stems.len(), 6);
        for (up, down) in stems[..3].iter().zip(stems[3..].iter()) {
            assert_eq!(up.x, down.x);
            assert_eq!(up.height, -down.height);
            assert_eq!(up.ink, Ink::Background);
        }
        assert!(session.surface().has_baseline());
        Ok(())
    }

    #[test]
    fn test_render_match_lower() -> Result<(), RenderError> {
        let mut session = open(service());
        assert_eq!(session.render_match("PEK", MirrorSign::Lower)?, 2);
        let overlay = &session.overlays()[0];
        assert_eq!(overlay.matched(), 1);

        let labels: Vec<_> = session.surface().labels().collect();
        assert_eq!(labels[0].text, "y1+");
        assert_eq!(labels[0].at, Placement::new(147.112, -300.0));
        assert_eq!(labels[0].ink, Ink::Annotation(ColorClass::YIon));
        assert_eq!(labels[1].text, "b2+");
        assert_eq!(labels[1].at.y, -UNMATCHED_SENTINEL_HEIGHT);
        assert_eq!(labels[1].ink, Ink::Annotation(ColorClass::Unmatched));

        let stems: Vec<_> = session.surface().stems().collect();
        assert_eq!(stems.len(), 2);
        assert_eq!(stems[0].weight, StrokeWeight::Regular);
        assert_eq!(stems[1].weight, StrokeWeight::Light);
        assert_eq!(stems[1].height, -UNMATCHED_SENTINEL_HEIGHT);
        assert_eq!(stems[1].ink, Ink::Annotation(ColorClass::Unmatched));
        assert_eq!(session.surface().titles(), &["PEK".to_string()]);
        Ok(())
    }

    #[test]
    fn test_modified_peptide_title() -> Result<(), RenderError> {
        let mut session = open(service());
        session.render_candidate(1, MirrorSign::Upper)?;
        assert_eq!(session.overlays()[0].peptide.stripped(), "PEK");
        assert_eq!(session.surface().titles(), &["[+42.0106]-PEK".to_string()]);
        Ok(())
    }

    #[test]
    fn test_invalid_peptide() {
        let mut session = open(service());
        assert!(matches!(
            session.render_match("[+42.0106]", MirrorSign::Upper),
            Err(RenderError::InvalidPeptide(_))
        ));
        assert_eq!(session.overlay_count(), 0);
    }

    #[test]
    fn test_no_spectrum() {
        let mut session = open(service().failing(Operation::Spectrum));
        assert!(session.spectrum().is_none());
        assert!(session.spectrum_error().is_some());
        assert!(matches!(
            session.render_base(MirrorSign::Upper),
            Err(RenderError::NoSpectrum(4))
        ));
        assert!(session.surface().is_empty());
    }

    #[test_log::test]
    fn test_render_top_skips_failures() {
        let service = service().with_candidates(
            4,
            vec![
                Candidate::new("PEK", 1, 20.0),
                Candidate::new("MISSING", 1, 15.0),
                Candidate::new("PEK", 1, 12.0),
            ],
        );
        let mut session = open(service);
        assert_eq!(session.render_top(5, MirrorSign::Upper), 2);
        assert_eq!(session.overlay_count(), 2);
        assert!(matches!(
            session.render_candidate(7, MirrorSign::Upper),
            Err(RenderError::NoCandidate {
                index: 7,
                available: 3
            })
        ));
    }

    #[test]
    fn test_render_mirrored() -> Result<(), RenderError> {
        let mut session = open(service());
        assert_eq!(session.render_mirrored(0, 1)?, 2);
        let signs: Vec<_> = session.overlays().iter().map(|o| o.sign).collect();
        assert_eq!(signs, vec![MirrorSign::Upper, MirrorSign::Lower]);
        let (lo, hi) = session.surface().y_extent();
        assert_eq!(lo, -hi);
        Ok(())
    }

    #[test]
    fn test_clear_overlays() -> Result<(), RenderError> {
        let mut session = open(service());
        session.render_base(MirrorSign::Upper)?;
        session.render_match("PEK", MirrorSign::Upper)?;
        session.render_match("PEK", MirrorSign::Lower)?;
        assert_eq!(session.overlay_count(), 2);
        assert_eq!(session.surface().len(), 3 + 2 * 4);

        assert_eq!(session.clear_overlays(), 2);
        assert_eq!(session.overlay_count(), 0);
        assert_eq!(session.surface().len(), 3);
        assert!(session.surface().labels().next().is_none());
        assert!(session.surface().titles().is_empty());
        assert_eq!(session.clear_overlays(), 0);
        Ok(())
    }

    #[test]
    fn test_relayout_labels() -> Result<(), RenderError> {
        let mut session = open(service());
        session.render_match("PEK", MirrorSign::Lower)?;
        assert_eq!(session.relayout_labels(20.0), 2);
        let surface = session.surface();
        let y1 = session.overlays()[0].annotations[0].label;
        match surface.get(y1) {
            Some(Mark::Label(label)) => assert_eq!(label.at.y, -320.0),
            other => panic!("Expected a label, got {other:?}"),
        }
        Ok(())
    }
}
