//! CSV export backend.
//!
//! Accepts a warehouse export with one row per defect. Column names are matched
//! case-insensitively:
//!
//! - project: `NombreProyecto` | `project` | `project_name`
//! - date:    `Fecha` | `date` | `defect_date`
//! - status (optional): `EstadoActual` | `status`
//!
//! When a status column is present, rows are filtered by the configured status
//! set, mirroring the warehouse query. Malformed rows are skipped and reported,
//! not fatal.

use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::data::{DefectSource, parse_defect_date};
use crate::domain::DefectRecord;
use crate::error::AppError;

const PROJECT_COLUMNS: [&str; 3] = ["nombreproyecto", "project", "project_name"];
const DATE_COLUMNS: [&str; 3] = ["fecha", "date", "defect_date"];
const STATUS_COLUMNS: [&str; 2] = ["estadoactual", "status"];

/// A row-level error encountered while reading the export.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed export: usable records plus everything that was skipped.
#[derive(Debug, Clone)]
pub struct CsvIngest {
    pub records: Vec<DefectRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows dropped by the status filter (not errors).
    pub rows_filtered: usize,
}

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    statuses: Vec<String>,
}

impl CsvSource {
    pub fn new(path: PathBuf, statuses: Vec<String>) -> Self {
        Self { path, statuses }
    }

    /// Read and validate the export.
    pub fn ingest(&self) -> Result<CsvIngest, AppError> {
        let file = File::open(&self.path).map_err(|e| {
            AppError::Connection(format!("Failed to open CSV '{}': {e}", self.path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| AppError::Query(format!("Failed to read CSV headers: {e}")))?
            .clone();
        let header_map = build_header_map(&headers);

        let project_idx = find_column(&header_map, &PROJECT_COLUMNS).ok_or_else(|| {
            AppError::Query("CSV is missing a project column (NombreProyecto/project).".to_string())
        })?;
        let date_idx = find_column(&header_map, &DATE_COLUMNS)
            .ok_or_else(|| AppError::Query("CSV is missing a date column (Fecha/date).".to_string()))?;
        let status_idx = find_column(&header_map, &STATUS_COLUMNS);

        let mut records = Vec::new();
        let mut row_errors = Vec::new();
        let mut rows_read = 0usize;
        let mut rows_filtered = 0usize;

        for (idx, result) in reader.records().enumerate() {
            // +2: header is line 1 and lines are 1-based.
            let line = idx + 2;
            rows_read += 1;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    row_errors.push(RowError {
                        line,
                        message: format!("CSV parse error: {e}"),
                    });
                    continue;
                }
            };

            if let Some(si) = status_idx {
                let status = record.get(si).unwrap_or("");
                if !self.statuses.iter().any(|s| s == status) {
                    rows_filtered += 1;
                    continue;
                }
            }

            match parse_row(&record, project_idx, date_idx) {
                Ok(r) => records.push(r),
                Err(message) => row_errors.push(RowError { line, message }),
            }
        }

        Ok(CsvIngest {
            records,
            row_errors,
            rows_read,
            rows_filtered,
        })
    }
}

impl DefectSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn fetch_defects(&self) -> Result<Vec<DefectRecord>, AppError> {
        let ingest = self.ingest()?;
        if !ingest.row_errors.is_empty() {
            warn!(
                skipped = ingest.row_errors.len(),
                rows_read = ingest.rows_read,
                "skipped malformed CSV rows"
            );
            for e in &ingest.row_errors {
                debug!(line = e.line, message = %e.message, "skipped row");
            }
        }
        Ok(ingest.records)
    }
}

fn parse_row(record: &StringRecord, project_idx: usize, date_idx: usize) -> Result<DefectRecord, String> {
    let project = record.get(project_idx).unwrap_or("");
    if project.is_empty() {
        return Err("Missing project name.".to_string());
    }
    let raw_date = record.get(date_idx).unwrap_or("");
    let date = parse_defect_date(raw_date).ok_or_else(|| format!("Invalid date '{raw_date}'."))?;
    Ok(DefectRecord::new(project, date))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}
