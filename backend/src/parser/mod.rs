//! CSV loader with encoding auto-detection and positional column selection.
//!
//! The header row is skipped; columns are picked by source index and renamed
//! to canonical names. A load yields a complete table or a [`LoadError`].

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_info, log_success_indent, log_warning};
use crate::error::{LoadError, LoadResult};
use crate::models::{ColumnSelection, Record, RowCells, Table};

/// Default cap on data rows read from a source.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Facts about a completed load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Source identity (path or caller-supplied name)
    pub source: String,
    /// Detected encoding
    pub encoding: String,
    /// Number of columns in the source header
    pub source_width: usize,
    /// Data rows read, up to the cap
    pub rows_read: usize,
    /// Rows read but excluded by the record type (e.g. null state)
    pub rows_excluded: usize,
}

/// A loaded table plus its report.
#[derive(Debug, Clone)]
pub struct Loaded<R> {
    pub table: Table<R>,
    pub report: LoadReport,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        // WHATWG maps the latin1 labels onto windows-1252.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Load a CSV file into a table of `R`.
pub fn load_table<R: Record>(
    path: &Path,
    selection: &ColumnSelection,
    max_rows: usize,
) -> LoadResult<Loaded<R>> {
    let source = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| LoadError::Unreadable {
        source_name: source.clone(),
        reason: e.to_string(),
    })?;

    load_table_from_bytes(&source, &bytes, selection, max_rows)
}

/// Load CSV bytes into a table of `R`. `source` names the input in errors.
pub fn load_table_from_bytes<R: Record>(
    source: &str,
    bytes: &[u8],
    selection: &ColumnSelection,
    max_rows: usize,
) -> LoadResult<Loaded<R>> {
    selection.check_required(R::REQUIRED)?;

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    if content.trim().is_empty() {
        return Err(LoadError::EmptySource(source.to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let source_width = reader.headers()?.len();
    for spec in selection.specs() {
        if spec.index >= source_width {
            return Err(LoadError::ColumnOutOfRange {
                name: spec.name.clone(),
                index: spec.index,
                width: source_width,
            });
        }
    }

    let names = selection.names();
    let mut rows = Vec::new();
    let mut rows_read = 0;
    let mut rows_excluded = 0;

    for (i, result) in reader.records().take(max_rows).enumerate() {
        let record = result?;
        rows_read += 1;

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        let cells: Vec<String> = selection
            .specs()
            .iter()
            .map(|spec| record.get(spec.index).unwrap_or("").to_string())
            .collect();

        match R::from_row(&RowCells::new(line, &names, &cells))? {
            Some(row) => rows.push(row),
            None => rows_excluded += 1,
        }
    }

    log_info(format!("Loaded '{}' ({}, {} columns)", source, encoding, source_width));
    log_success_indent(format!("{} rows", rows.len()), 1);
    if rows_excluded > 0 {
        log_warning(format!("{} rows excluded (missing key values)", rows_excluded));
    }

    Ok(Loaded {
        table: Table::new(names, rows),
        report: LoadReport {
            source: source.to_string(),
            encoding,
            source_width,
            rows_read,
            rows_excluded,
        },
    })
}
