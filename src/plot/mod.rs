//! Chart output.
//!
//! - `svg`: chart files written per namespace by the pipeline
//! - `ascii`: quick terminal plot for `sales summary --plot`

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_plot;
pub use svg::{ChartRenderer, sanitize_namespace};
