mod args;
mod driver;

pub use args::*;
pub use driver::{PSMPlotter, PSMPlotterError};
