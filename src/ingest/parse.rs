// src/ingest/parse.rs

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, trace, warn};

use crate::error::{PipelineError, Result};
use crate::types::{RowRecord, Scalar};

const UTF8_BOM: char = '\u{feff}';

/// Parse CSV bytes into rows keyed by the header line.
///
/// - empty input or a header with no data rows gives an empty `Vec`
/// - blank lines are skipped
/// - a row shorter than the header is padded with empty text cells
/// - a row longer than the header is a `ParseFailure`, its extra cells have no column
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RowRecord>> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        PipelineError::parse(format!("file is not valid UTF-8 (at byte {})", e.valid_up_to()))
    })?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .quote(b'"')
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::parse(format!("reading header: {e}")))?
        .clone();
    if headers.is_empty() {
        debug!("empty file, no header");
        return Ok(Vec::new());
    }
    check_headers(&headers)?;
    trace!(?headers, "header");

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| PipelineError::parse(describe_csv_error(&e)))?;
        rows.push(to_row(&headers, &record)?);
    }
    Ok(rows)
}

fn check_headers(headers: &StringRecord) -> Result<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(PipelineError::parse(format!(
                "duplicate column {name:?} in header"
            )));
        }
    }
    Ok(())
}

fn to_row(headers: &StringRecord, record: &StringRecord) -> Result<RowRecord> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    if record.len() > headers.len() {
        return Err(PipelineError::parse(format!(
            "line {line} has {} fields but the header has {}",
            record.len(),
            headers.len()
        )));
    }
    if record.len() < headers.len() {
        warn!(
            line,
            fields = record.len(),
            expected = headers.len(),
            "short row, padding missing cells"
        );
    }

    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cell = record
                .get(i)
                .map(Scalar::infer)
                .unwrap_or_else(|| Scalar::Text(String::new()));
            (name, cell)
        })
        .collect())
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.position() {
        Some(pos) => format!("line {}: {}", pos.line(), err),
        None => err.to_string(),
    }
}
