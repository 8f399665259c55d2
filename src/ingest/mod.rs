// src/ingest/mod.rs

pub mod parse;

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::error::{PipelineError, Result};
use crate::types::RowRecord;

pub use parse::parse_csv;

const CSV_MEDIA_TYPE: &str = "text/csv";
const CSV_SUFFIX: &str = ".csv";

/// A file the user picked, held only until it has been parsed.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        media_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. No media type is declared, so the name suffix decides.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            name,
            media_type: None,
            bytes,
        })
    }

    /// `text/csv` (parameters ignored) or a `.csv` name, either is enough.
    pub fn is_csv(&self) -> bool {
        let declared = self
            .media_type
            .as_deref()
            .and_then(|m| m.split(';').next())
            .map(|m| m.trim().eq_ignore_ascii_case(CSV_MEDIA_TYPE))
            .unwrap_or(false);
        declared || self.name.to_ascii_lowercase().ends_with(CSV_SUFFIX)
    }
}

/// Validate the file type, then parse off the async executor.
///
/// The type check happens before any byte is decoded, so a rejected file
/// never produces rows.
#[instrument(level = "info", skip(file), fields(name = %file.name, size = file.bytes.len()))]
pub async fn ingest(file: UploadedFile) -> Result<Vec<RowRecord>> {
    if !file.is_csv() {
        warn!(media_type = ?file.media_type, "rejecting non-CSV file");
        return Err(PipelineError::InvalidFileType {
            name: file.name,
            media_type: file.media_type,
        });
    }

    let UploadedFile { bytes, .. } = file;
    let rows = tokio::task::spawn_blocking(move || parse_csv(&bytes))
        .await
        .map_err(|e| PipelineError::parse(format!("parser task failed: {e}")))??;

    info!(rows = rows.len(), "parsed CSV");
    if let Some(first) = rows.first() {
        debug!(columns = first.len(), "column set taken from header");
    }
    Ok(rows)
}
