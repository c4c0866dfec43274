//! Draw peptide-spectrum matches with their fragment ion annotations.
//!
//! A [`RenderSession`] fetches one scan's peak list and its ranked
//! [`Candidate`] peptides from a [`SpectrumService`], then overlays the
//! [`AlignmentRecord`]s of whichever candidates the caller picks onto a
//! [`DrawingSurface`]. Two candidates can share one mass axis by drawing
//! the second one with [`MirrorSign::Lower`].
//!
//! ```no_run
//! use psmplot::service::{AlignmentConfig, SearchConfig, SpectrumQuery};
//! use psmplot::service::http::HttpSpectrumService;
//! use psmplot::{svg, MirrorSign, RenderSession};
//!
//! let service = HttpSpectrumService::new("http://localhost:3000").unwrap();
//! let mut session = RenderSession::open(
//!     service,
//!     30091,
//!     &SpectrumQuery::default(),
//!     &SearchConfig::default(),
//!     AlignmentConfig::default(),
//! );
//! session.render_base(MirrorSign::Upper).unwrap();
//! session.render_top(2, MirrorSign::Upper);
//! let document = svg::render_svg(session.surface(), &svg::PlotStyle::default()).unwrap();
//! ```
pub mod alignment;
pub mod annotation;
pub mod candidate;
pub mod mirror;
pub mod peptide;
pub mod service;
pub mod session;
pub mod spectrum;
pub mod surface;
pub mod svg;
pub mod tolerance;

pub use crate::alignment::{AlignmentRecord, FragmentKind, ObservedPeak};
pub use crate::annotation::{Annotation, ColorClass, Placement};
pub use crate::candidate::Candidate;
pub use crate::mirror::{MirrorGeometry, MirrorSign};
pub use crate::peptide::{PeptideError, PeptideSequence};
pub use crate::service::{ServiceError, SpectrumService};
pub use crate::session::{Overlay, RenderError, RenderSession};
pub use crate::spectrum::{Peak, Precursor, Spectrum};
pub use crate::surface::{DrawingSurface, Handle, Ink, Scene};
pub use crate::tolerance::Tolerance;

/// The mass of a proton, the charge carrier added to a neutral mass to get a singly charged m/z
pub const PROTON: f64 = chemical_elements::PROTON;
