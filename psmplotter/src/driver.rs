use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use serde::{Deserialize, Serialize};

use thiserror::Error;

use tracing::{debug, info, warn};

use psmplot::peptide::Modifications;
use psmplot::service::{
    AlignmentConfig, HttpSpectrumService, InMemorySpectrumService, SearchConfig, ServiceError,
    SpectrumQuery, SpectrumService,
};
use psmplot::svg::{render_svg, PlotStyle, SvgError};
use psmplot::{MirrorSign, RenderError, RenderSession, Tolerance};

use crate::args::{ArgModification, Dimensions};

#[derive(Debug, Error)]
pub enum PSMPlotterError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("Failed to read the configuration: {0}")]
    ConfigError(
        #[source]
        #[from]
        figment::Error,
    ),
    #[error(transparent)]
    ServiceError(#[from] ServiceError),
    #[error(transparent)]
    RenderError(#[from] RenderError),
    #[error(transparent)]
    SvgError(#[from] SvgError),
    #[error("Cannot draw scan {0}, its spectrum is unavailable: {1}")]
    SpectrumUnavailable(usize, String),
}

/// Draw the annotated peptide-spectrum matches of a single scan.
///
/// Fetch a scan's peaks and ranked candidate peptides from a scoring engine, overlay the
/// fragment ions of the best candidates and write the plot out as an SVG.
#[derive(Parser, Debug, Deserialize, Serialize)]
#[command(author, version)]
pub struct PSMPlotter {
    /// The scan number to draw
    #[arg()]
    pub scan_id: usize,

    /// The base URL of the scoring engine to query
    #[arg(short = 'u', long = "url", default_value = "http://localhost:3000")]
    pub url: String,

    /// Read spectra, candidates and alignments from a JSON file instead of a scoring engine
    #[arg(short = 'f', long = "fixture")]
    pub fixture: Option<PathBuf>,

    /// The path to write the SVG to
    #[arg(short = 'o', long = "output-file", default_value = "psm.svg")]
    pub output_file: PathBuf,

    /// The path to write a log file to, in addition to STDERR
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// A TOML configuration file to read additional parameters from.
    ///
    /// Configurations are also read from `psmplotter.toml` in the working directory.
    /// Environment variables prefixed with `PSMPLOTTER_` will be read too.
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// The number of best ranked candidates to overlay
    #[arg(short = 'n', long = "top", default_value_t = 1)]
    pub top: usize,

    /// Draw the best candidate above the baseline and the runner-up mirrored beneath it
    #[arg(short = 'm', long = "mirror")]
    pub mirror: bool,

    /// A static modification denoted (residue)=(mass delta), may be repeated.
    ///
    /// Passing any replaces the default carbamidomethyl cysteine.
    #[arg(
        short = 'M',
        long = "mod",
        value_name = "RESIDUE=DELTA",
        default_values_t = [ArgModification('C', 57.0215)],
    )]
    pub modifications: Vec<ArgModification>,

    /// A mass delta added to the peptide N-terminus, e.g. an isobaric tag
    #[arg(long = "nterm")]
    pub nterm: Option<f64>,

    /// The fragment mass tolerance, denoted (da|ppm):(width) or (da|ppm):(low),(high)
    #[arg(
        short = 't',
        long = "fragment-tolerance",
        value_parser = Tolerance::from_str,
        default_value_t = Tolerance::ppm(10.0),
    )]
    pub fragment_tolerance: Tolerance,

    /// The precursor mass tolerance, denoted (da|ppm):(width) or (da|ppm):(low),(high)
    #[arg(
        short = 'p',
        long = "precursor-tolerance",
        value_parser = Tolerance::from_str,
        default_value_t = Tolerance::Da(-3.6, 1.2),
    )]
    pub precursor_tolerance: Tolerance,

    /// The number of ranked candidates to ask the scoring engine for
    #[arg(long = "report-psms", default_value_t = 10)]
    pub report_psms: usize,

    /// Do not search for co-isolated peptides
    #[arg(long = "no-chimera")]
    pub no_chimera: bool,

    /// Do not deisotope the spectrum before searching
    #[arg(long = "no-deisotope")]
    pub no_deisotope: bool,

    /// Keep at most this many of the most intense peaks
    #[arg(long = "max-peaks", default_value_t = 150)]
    pub max_peaks: usize,

    /// The size of the image, denoted (width)x(height)
    #[arg(short = 'd', long = "dimensions", default_value_t = Dimensions::default())]
    pub dimensions: Dimensions,

    /// Palette and typography, only settable from a configuration file
    #[arg(skip)]
    #[serde(default)]
    pub style: PlotStyle,
}

impl PSMPlotter {
    pub fn spectrum_query(&self) -> SpectrumQuery {
        SpectrumQuery {
            deisotope: !self.no_deisotope,
            max_peaks: self.max_peaks,
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            precursor_tolerance: self.precursor_tolerance,
            fragment_tolerance: self.fragment_tolerance,
            report_psms: self.report_psms,
            chimera: !self.no_chimera,
            deisotope: !self.no_deisotope,
        }
    }

    pub fn alignment_config(&self) -> AlignmentConfig {
        let modifications: Modifications = self
            .modifications
            .iter()
            .map(|ArgModification(residue, delta)| (*residue, *delta))
            .collect();
        AlignmentConfig {
            modifications,
            nterm: self.nterm,
            fragment_tolerance: self.fragment_tolerance,
            deisotope: false,
        }
    }

    /// The configured style, sized by [`PSMPlotter::dimensions`]
    pub fn plot_style(&self) -> PlotStyle {
        PlotStyle {
            width: self.dimensions.0,
            height: self.dimensions.1,
            ..self.style.clone()
        }
    }

    pub fn main(&self) -> Result<(), PSMPlotterError> {
        info!(
            "psmplotter v{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
        );
        info!("Scan: {}", self.scan_id);
        info!("Output: {}", self.output_file.display());
        match self.fixture.as_ref() {
            Some(path) => {
                info!("Source: {}", path.display());
                let service = InMemorySpectrumService::from_path(path)?;
                self.render_with(service)
            }
            None => {
                info!("Source: {}", self.url);
                let service = HttpSpectrumService::new(&self.url)?;
                self.render_with(service)
            }
        }
    }

    fn render_with<Svc: SpectrumService>(&self, service: Svc) -> Result<(), PSMPlotterError> {
        let mut session = RenderSession::open(
            service,
            self.scan_id,
            &self.spectrum_query(),
            &self.search_config(),
            self.alignment_config(),
        );

        if let Some(err) = session.spectrum_error() {
            return Err(PSMPlotterError::SpectrumUnavailable(
                self.scan_id,
                err.to_string(),
            ));
        }

        let overlays = if session.candidates().is_none() {
            warn!("Drawing scan {} without annotations", self.scan_id);
            session.render_base(MirrorSign::Upper)?;
            0
        } else if self.mirror {
            session.render_mirrored(0, 1)?
        } else {
            session.render_base(MirrorSign::Upper)?;
            session.render_top(self.top, MirrorSign::Upper)
        };

        let style = self.plot_style();
        debug!("Rendering at {}x{}", style.width, style.height);
        let document = render_svg(session.surface(), &style)?;
        fs::write(&self.output_file, document)?;
        info!(
            "Drew {overlays} overlays, written to {}",
            self.output_file.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = PSMPlotter::parse_from(["psmplotter", "30091"]);
        assert_eq!(args.scan_id, 30091);
        assert_eq!(args.search_config(), SearchConfig::default());
        assert_eq!(args.alignment_config(), AlignmentConfig::default());
        assert_eq!(args.spectrum_query(), SpectrumQuery::default());
        assert_eq!(args.plot_style(), PlotStyle::default());
    }

    #[test]
    fn test_arguments() {
        let args = PSMPlotter::parse_from([
            "psmplotter",
            "7",
            "--mod",
            "C=57.0215",
            "--mod",
            "K=304.20715",
            "--nterm",
            "304.20715",
            "-t",
            "da:-0.3,0.3",
            "--no-deisotope",
            "--max-peaks",
            "100",
            "-d",
            "800x400",
        ]);
        let alignment = args.alignment_config();
        assert_eq!(alignment.modifications.len(), 2);
        assert_eq!(alignment.modifications[&'K'], 304.20715);
        assert_eq!(alignment.nterm, Some(304.20715));
        assert_eq!(alignment.fragment_tolerance, Tolerance::Da(-0.3, 0.3));

        let search = args.search_config();
        assert!(!search.deisotope);
        assert!(search.chimera);
        assert_eq!(args.spectrum_query().max_peaks, 100);
        assert_eq!(args.plot_style().width, 800);
    }
}
