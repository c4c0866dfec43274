//! The drawing primitives a render session needs, and a retained [`Scene`] that records them.
//!
//! A [`Scene`] is what gets turned into an image by [`crate::svg::render_svg`], but it is
//! also directly inspectable, so rendering logic can be checked without producing any output.
use crate::annotation::{ColorClass, Placement};

/// Identifies one drawn mark so it can be moved or removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

/// The palette entry a mark is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ink {
    /// The unannotated observed spectrum
    Background,
    Annotation(ColorClass),
}

impl From<ColorClass> for Ink {
    fn from(value: ColorClass) -> Self {
        Self::Annotation(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrokeWeight {
    Light,
    #[default]
    Regular,
}

/// A vertical line from the baseline to a signed height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stem {
    pub x: f64,
    pub height: f32,
    pub ink: Ink,
    pub weight: StrokeWeight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub at: Placement,
    pub ink: Ink,
    /// Degrees counter-clockwise from horizontal
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Stem(Stem),
    Label(Label),
}

/// Something stems and labels can be drawn onto.
///
/// Heights and placements arrive already signed; a surface never applies any
/// orientation of its own.
pub trait DrawingSurface {
    /// Request the shared zero line spanning the whole mass axis. Repeated calls draw it once.
    fn baseline(&mut self);

    fn stem(&mut self, stem: Stem) -> Handle;

    fn label(&mut self, label: Label) -> Handle;

    /// Append a line to the plot title
    fn title(&mut self, text: &str);

    fn clear_title(&mut self);

    /// Move a label to a new anchor, returning `false` if `handle` is not a live label
    fn reposition(&mut self, handle: Handle, at: Placement) -> bool;

    /// Remove a mark, returning `false` if `handle` was already gone
    fn remove(&mut self, handle: Handle) -> bool;
}

/// An in-memory record of everything drawn, in drawing order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scene {
    marks: Vec<(Handle, Mark)>,
    titles: Vec<String>,
    has_baseline: bool,
    next_handle: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, mark: Mark) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        self.marks.push((handle, mark));
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&Mark> {
        self.marks
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, m)| m)
    }

    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().map(|(_, m)| m)
    }

    pub fn stems(&self) -> impl Iterator<Item = &Stem> {
        self.marks().filter_map(|m| match m {
            Mark::Stem(s) => Some(s),
            Mark::Label(_) => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.marks().filter_map(|m| match m {
            Mark::Label(l) => Some(l),
            Mark::Stem(_) => None,
        })
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn has_baseline(&self) -> bool {
        self.has_baseline
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// The smallest and largest x coordinate of any mark
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        self.marks()
            .map(|m| match m {
                Mark::Stem(s) => s.x,
                Mark::Label(l) => l.at.x,
            })
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }

    /// The most negative and most positive height of any mark, always including zero
    pub fn y_extent(&self) -> (f32, f32) {
        self.marks()
            .map(|m| match m {
                Mark::Stem(s) => s.height,
                Mark::Label(l) => l.at.y,
            })
            .fold((0.0, 0.0), |(lo, hi), y| (lo.min(y), hi.max(y)))
    }
}

impl DrawingSurface for Scene {
    fn baseline(&mut self) {
        self.has_baseline = true;
    }

    fn stem(&mut self, stem: Stem) -> Handle {
        self.push(Mark::Stem(stem))
    }

    fn label(&mut self, label: Label) -> Handle {
        self.push(Mark::Label(label))
    }

    fn title(&mut self, text: &str) {
        self.titles.push(text.to_string());
    }

    fn clear_title(&mut self) {
        self.titles.clear();
    }

    fn reposition(&mut self, handle: Handle, at: Placement) -> bool {
        match self.marks.iter_mut().find(|(h, _)| *h == handle) {
            Some((_, Mark::Label(label))) => {
                label.at = at;
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, handle: Handle) -> bool {
        match self.marks.iter().position(|(h, _)| *h == handle) {
            Some(i) => {
                self.marks.remove(i);
                true
            }
            None => false,
        }
    }
}
