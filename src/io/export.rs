//! Export run results to files.
//!
//! - processing result as JSON (the shape handed to outer layers)
//! - forecast points as CSV, easy to consume in spreadsheets

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{ForecastPoint, ProcessingResult};
use crate::error::PipelineError;

/// Write a processing result (success or failure) as pretty JSON.
pub fn write_result_json(path: &Path, result: &ProcessingResult) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, result)
        .map_err(|e| PipelineError::io(path, std::io::Error::other(e)))?;
    out.write_all(b"\n")
        .and_then(|()| out.flush())
        .map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Write forecast points as CSV with columns
/// `date,point_estimate,lower_bound,upper_bound`.
pub fn write_forecast_csv(path: &Path, points: &[ForecastPoint]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    for p in points {
        writer.serialize(p)?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}
