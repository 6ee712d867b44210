//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned sales rows (`RawSalesRow`, `SalesRecord`)
//! - aggregated series (`DailyTotal`, `WeeklyTotal`)
//! - forecast outputs (`ForecastPoint`, `Forecast`, `WeeklyForecast`)
//! - the serializable `ProcessingResult` and run configuration

pub mod types;

pub use types::*;
