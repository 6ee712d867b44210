//! Error types.
//!
//! - `PipelineError`: what went wrong inside a pipeline step
//! - `StageError`: a `PipelineError` tagged with the stage that raised it
//! - `AppError`: what the `sales` binary prints, with its process exit code

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Stage;

/// Failures raised by the sales pipeline. None of these are retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required column: `{column}`")]
    Schema { column: String },

    #[error("invalid value '{value}' in column `{column}` (line {line}): {reason}")]
    DataFormat {
        column: String,
        value: String,
        line: usize,
        reason: String,
    },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("model fit failed: {0}")]
    ModelFit(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code used by the binary.
    ///
    /// - 2: unusable input (schema, arguments, file access)
    /// - 3: bad or insufficient data
    /// - 4: model or chart failures
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Schema { .. } | Self::InvalidArgument(_) | Self::Io { .. } | Self::Csv(_) => 2,
            Self::DataFormat { .. } | Self::InsufficientData(_) => 3,
            Self::ModelFit(_) | Self::Chart(_) => 4,
        }
    }
}

/// A pipeline failure labelled with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

impl StageError {
    pub fn new(stage: Stage, source: PipelineError) -> Self {
        Self { stage, source }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl From<StageError> for AppError {
    fn from(err: StageError) -> Self {
        Self::new(err.source.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_message_names_stage_and_reason() {
        let err = StageError::new(
            Stage::Ingest,
            PipelineError::Schema {
                column: "Total".to_string(),
            },
        );
        assert_eq!(err.to_string(), "ingest stage failed: missing required column: `Total`");
    }

    #[test]
    fn exit_codes_follow_error_class() {
        let app: AppError = StageError::new(
            Stage::Forecast,
            PipelineError::InsufficientData("one day".to_string()),
        )
        .into();
        assert_eq!(app.exit_code(), 3);
        assert_eq!(PipelineError::ModelFit("x".to_string()).exit_code(), 4);
        assert_eq!(PipelineError::InvalidArgument("x".to_string()).exit_code(), 2);
    }
}
