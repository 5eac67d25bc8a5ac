//! Defect data sources.
//!
//! Every backend yields plain `(project, date)` rows through [`DefectSource`].
//! Backends own their connection lifetime: a handle is acquired inside
//! [`DefectSource::fetch_defects`] and released before it returns, on both the
//! success and the failure path.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{DefectRecord, RunConfig, SourceKind};
use crate::error::AppError;

pub mod csv_export;
pub mod sqlite;
pub mod synthetic;

pub use self::csv_export::CsvSource;
pub use self::sqlite::SqliteSource;
pub use self::synthetic::SyntheticSource;

/// A tabular source of historical defect records.
pub trait DefectSource {
    /// Short human-readable description (used in logs).
    fn describe(&self) -> String;

    /// Fetch all defect records for finished projects.
    fn fetch_defects(&self) -> Result<Vec<DefectRecord>, AppError>;
}

/// In-memory records, mostly for tests and embedding.
impl DefectSource for Vec<DefectRecord> {
    fn describe(&self) -> String {
        format!("in-memory ({} records)", self.len())
    }

    fn fetch_defects(&self) -> Result<Vec<DefectRecord>, AppError> {
        Ok(self.clone())
    }
}

/// Build the source selected by the run configuration.
pub fn source_from_config(config: &RunConfig) -> Result<Box<dyn DefectSource>, AppError> {
    match config.source {
        SourceKind::Sqlite => Ok(Box::new(SqliteSource::new(
            config.db_path.clone(),
            config.statuses.clone(),
        ))),
        SourceKind::Csv => {
            let path = config.csv_path.clone().ok_or_else(|| {
                AppError::Config("The csv source requires --csv <PATH> (or RAYLEIGH_CSV).".to_string())
            })?;
            Ok(Box::new(CsvSource::new(path, config.statuses.clone())))
        }
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(config.synthetic.clone()))),
    }
}

/// Parse a warehouse date column.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time component
/// (`YYYY-MM-DD HH:MM:SS[.fff]` or ISO `T` separator).
pub fn parse_defect_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}
