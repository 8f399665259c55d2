// src/error.rs

use thiserror::Error;

/// Every way a pipeline step can fail. All of them are recoverable: the
/// controller surfaces the error once and goes back to accepting input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The selected file is neither declared as CSV nor named `*.csv`.
    #[error("invalid file type: {name:?} (declared {media_type:?}) is not a CSV file")]
    InvalidFileType {
        name: String,
        media_type: Option<String>,
    },

    /// The file could not be decoded as delimited text.
    #[error("failed to parse CSV: {reason}")]
    ParseFailure { reason: String },

    /// Network error, non-success status or malformed prediction response.
    #[error("prediction backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// Bad base URL or HTTP client settings. Raised while building the
    /// clients, never during a run.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The export could not be fetched or handed to the delivery sink.
    #[error("failed to download export: {reason}")]
    DownloadFailure { reason: String },
}

impl PipelineError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            reason: reason.into(),
        }
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn download(reason: impl Into<String>) -> Self {
        Self::DownloadFailure {
            reason: reason.into(),
        }
    }

    /// Short stable name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidFileType { .. } => "InvalidFileType",
            PipelineError::ParseFailure { .. } => "ParseFailure",
            PipelineError::BackendUnavailable { .. } => "BackendUnavailable",
            PipelineError::InvalidConfig { .. } => "InvalidConfig",
            PipelineError::DownloadFailure { .. } => "DownloadFailure",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
