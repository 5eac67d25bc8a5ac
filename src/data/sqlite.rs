//! SQLite warehouse backend.
//!
//! Reads the quality star schema:
//!
//! - `Fact_Calidad(ProyectoKey, TiempoKey)`: one row per defect
//! - `Dim_Proyecto(ProyectoKey, NombreProyecto, EstadoActual)`
//! - `Dim_Tiempo(TiempoKey, Fecha)`
//!
//! The database is opened read-only; a missing file is a connection error rather
//! than a silently created empty warehouse.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::{debug, warn};

use crate::data::{DefectSource, parse_defect_date};
use crate::domain::DefectRecord;
use crate::error::AppError;

const DEFECT_QUERY: &str = "\
SELECT dp.NombreProyecto, dt.Fecha
FROM Fact_Calidad fc
JOIN Dim_Proyecto dp ON fc.ProyectoKey = dp.ProyectoKey
JOIN Dim_Tiempo dt ON fc.TiempoKey = dt.TiempoKey
WHERE dp.EstadoActual IN";

#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    statuses: Vec<String>,
}

impl SqliteSource {
    pub fn new(path: PathBuf, statuses: Vec<String>) -> Self {
        Self { path, statuses }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, AppError> {
        if !self.path.is_file() {
            return Err(AppError::Connection(format!(
                "Database '{}' not found.",
                self.path.display()
            )));
        }
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            AppError::Connection(format!(
                "Failed to open database '{}': {e}",
                self.path.display()
            ))
        })
    }
}

impl DefectSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn fetch_defects(&self) -> Result<Vec<DefectRecord>, AppError> {
        if self.statuses.is_empty() {
            return Err(AppError::Config("At least one project status is required.".to_string()));
        }

        let conn = self.open()?;
        let result = query_defects(&conn, &self.statuses);

        // Release the handle on both paths; a failed close only loses the handle.
        if let Err((_, e)) = conn.close() {
            warn!(error = %e, "failed to close sqlite connection cleanly");
        }

        result
    }
}

fn defect_query(n_statuses: usize) -> String {
    let placeholders = vec!["?"; n_statuses].join(", ");
    format!("{DEFECT_QUERY} ({placeholders})")
}

fn query_defects(conn: &Connection, statuses: &[String]) -> Result<Vec<DefectRecord>, AppError> {
    let sql = defect_query(statuses.len());
    debug!(%sql, "running defect query");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| AppError::Query(format!("Failed to prepare defect query: {e}")))?;

    let rows = stmt
        .query_map(params_from_iter(statuses.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| AppError::Query(format!("Defect query failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        let (project, raw_date) =
            row.map_err(|e| AppError::Query(format!("Failed to read defect row: {e}")))?;
        let date = parse_defect_date(&raw_date).ok_or_else(|| {
            AppError::Query(format!(
                "Invalid defect date '{raw_date}' for project '{project}'."
            ))
        })?;
        out.push(DefectRecord::new(project, date));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn statuses() -> Vec<String> {
        crate::domain::DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect()
    }

    fn seed_warehouse(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Dim_Proyecto (ProyectoKey INTEGER PRIMARY KEY, NombreProyecto TEXT, EstadoActual TEXT);
             CREATE TABLE Dim_Tiempo (TiempoKey INTEGER PRIMARY KEY, Fecha TEXT);
             CREATE TABLE Fact_Calidad (DefectoKey INTEGER PRIMARY KEY, ProyectoKey INTEGER, TiempoKey INTEGER);
             INSERT INTO Dim_Proyecto VALUES (1, 'Portal', 'Completado'), (2, 'ERP', 'Terminado'), (3, 'App', 'En Progreso');
             INSERT INTO Dim_Tiempo VALUES (10, '2023-01-15'), (11, '2023-02-03 00:00:00'), (12, '2023-04-20');
             INSERT INTO Fact_Calidad (ProyectoKey, TiempoKey) VALUES (1, 10), (1, 10), (1, 11), (1, 12), (2, 11), (3, 10), (3, 12);",
        )
        .unwrap();
    }

    #[test]
    fn fetch_filters_by_project_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warehouse.db");
        seed_warehouse(&path);

        let source = SqliteSource::new(path, statuses());
        let mut records = source.fetch_defects().unwrap();
        records.sort_by(|a, b| (&a.project_name, a.defect_date).cmp(&(&b.project_name, b.defect_date)));

        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.project_name != "App"));
        assert_eq!(records[0].project_name, "ERP");
        assert_eq!(records[0].defect_date, NaiveDate::from_ymd_opt(2023, 2, 3).unwrap());
    }

    #[test]
    fn missing_database_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqliteSource::new(dir.path().join("absent.db"), statuses());
        assert!(matches!(source.fetch_defects(), Err(AppError::Connection(_))));
    }

    #[test]
    fn missing_schema_is_a_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE Unrelated (x INTEGER);")
            .unwrap();

        let source = SqliteSource::new(path, statuses());
        assert!(matches!(source.fetch_defects(), Err(AppError::Query(_))));
    }

    #[test]
    fn query_has_one_placeholder_per_status() {
        let sql = defect_query(3);
        assert!(sql.ends_with("IN (?, ?, ?)"));
    }
}
