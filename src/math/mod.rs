//! Mathematical utilities: basis functions, least squares, normal quantiles.

pub mod basis;
pub mod ols;
pub mod quantile;

pub use basis::*;
pub use ols::*;
pub use quantile::*;
