//! Seasonal-trend model fitting.
//!
//! Responsibilities:
//!
//! - place trend changepoints on the observed history
//! - solve the regularized regression for all coefficients
//! - produce fitted values, future predictions, and uncertainty bands

pub mod changepoints;
pub mod fitter;

pub use changepoints::*;
pub use fitter::*;
