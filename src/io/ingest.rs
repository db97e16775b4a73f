//! CSV ingest and validation.
//!
//! Input is an ordered list of `period_label,value` rows, one per quarter. The
//! value is a non-negative decimal, or one of the missing markers `""`, `"-"`,
//! `"null"`, `"na"` (case-insensitive).
//!
//! Validation is all-or-nothing: the first bad row rejects the whole batch
//! (exit code 2) with its line number, and fewer than 8 rows is exit code 3.
//! No partially parsed series ever escapes this module.

use std::fs;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::ObservedPoint;
use crate::error::AppError;

/// Minimum number of rows accepted.
pub const MIN_ROWS: usize = 8;

/// Tokens (compared case-insensitively) that mark a missing value.
pub const MISSING_TOKENS: [&str; 4] = ["", "-", "null", "na"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Skip the first row as a header.
    pub has_header: bool,
}

/// Read `path` and parse it with [`parse_rows`].
pub fn load_series(path: &Path, opts: IngestOptions) -> Result<Vec<ObservedPoint>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::input(format!("Failed to read CSV '{}': {e}", path.display())))?;
    let series = parse_rows(&text, opts)?;
    info!(path = %path.display(), rows = series.len(), "series loaded");
    Ok(series)
}

/// Parse CSV text into an ordered series.
pub fn parse_rows(text: &str, opts: IngestOptions) -> Result<Vec<ObservedPoint>, AppError> {
    // Excel likes to prefix UTF-8 exports with a BOM.
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(opts.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut points = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::input(format!("CSV parse error: {e}")))?;
        let line = record_line(&record);
        if is_blank(&record) {
            continue;
        }
        points.push(parse_record(&record).map_err(|msg| AppError::input(format!("line {line}: {msg}")))?);
    }

    if points.len() < MIN_ROWS {
        return Err(AppError::insufficient(format!(
            "Need at least {MIN_ROWS} quarterly rows, found {}.",
            points.len()
        )));
    }

    let missing = points.iter().filter(|p| p.is_missing).count();
    debug!(rows = points.len(), missing, "rows parsed");
    Ok(points)
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

fn parse_record(record: &StringRecord) -> Result<ObservedPoint, String> {
    if record.len() != 2 {
        return Err(format!(
            "expected 2 fields (period,value), found {}",
            record.len()
        ));
    }
    let label = record.get(0).unwrap_or_default();
    let raw = record.get(1).unwrap_or_default();

    if label.is_empty() {
        return Err("empty period label".to_string());
    }
    if is_missing_token(raw) {
        return Ok(ObservedPoint::missing(label));
    }

    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("'{raw}' is not a finite number"));
    }
    if value < 0.0 {
        return Err(format!("negative value {raw}"));
    }
    Ok(ObservedPoint::original(label, value))
}

fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t))
}
