//! Shared estimation pipeline.
//!
//! Keeping this in one place avoids mixing the workflow with presentation:
//! fetch -> normalize -> fit
//!
//! The caller (`app::run`) handles printing and chart output. Recoverable
//! outcomes (no data, failed fit) are returned as [`RunOutcome`] variants so
//! they can never be mistaken for fatal errors; only source failures surface as
//! `Err`.

use tracing::{info, warn};

use crate::data::DefectSource;
use crate::domain::{DefectRecord, FitConfig, ProjectSpan, RayleighFit, RelativeMonthSeries};
use crate::error::AppError;
use crate::fit::fit_rayleigh;
use crate::timeline::{normalize, project_spans};

/// Normalized data shared by both fit outcomes.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub records_loaded: usize,
    pub series: RelativeMonthSeries,
    pub spans: Vec<ProjectSpan>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The source returned zero defect rows; nothing was normalized or fitted.
    NoData,
    /// Data was normalized but the fit did not converge.
    FitFailed { data: PreparedData, error: AppError },
    /// Data was normalized and fitted.
    Fitted { data: PreparedData, fit: RayleighFit },
}

impl RunOutcome {
    pub fn fit(&self) -> Option<&RayleighFit> {
        match self {
            RunOutcome::Fitted { fit, .. } => Some(fit),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&PreparedData> {
        match self {
            RunOutcome::NoData => None,
            RunOutcome::FitFailed { data, .. } | RunOutcome::Fitted { data, .. } => Some(data),
        }
    }
}

/// Fetch records from `source` and run the estimation.
pub fn run_estimation(source: &dyn DefectSource, config: &FitConfig) -> Result<RunOutcome, AppError> {
    info!(source = %source.describe(), "fetching defect records");
    let records = source.fetch_defects()?;
    info!(records = records.len(), "defect records loaded");
    estimate_from_records(&records, config)
}

/// Normalize and fit already-fetched records.
pub fn estimate_from_records(
    records: &[DefectRecord],
    config: &FitConfig,
) -> Result<RunOutcome, AppError> {
    let series = match normalize(records) {
        Ok(series) => series,
        Err(AppError::EmptyDataset) => {
            warn!("no defect records; skipping normalization and fit");
            return Ok(RunOutcome::NoData);
        }
        Err(e) => return Err(e),
    };
    let data = PreparedData {
        records_loaded: records.len(),
        spans: project_spans(records),
        series,
    };
    info!(
        projects = data.spans.len(),
        max_month = data.series.max_month(),
        "timeline normalized"
    );

    match fit_rayleigh(&data.series, config) {
        Ok(fit) => {
            info!(sigma = fit.sigma, scale = fit.scale, iterations = fit.iterations, "rayleigh fit converged");
            Ok(RunOutcome::Fitted { data, fit })
        }
        Err(error @ AppError::FitConvergence(_)) => {
            warn!(%error, "rayleigh fit failed");
            Ok(RunOutcome::FitFailed { data, error })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_source_yields_no_data() {
        let source: Vec<DefectRecord> = Vec::new();
        let outcome = run_estimation(&source, &FitConfig::default()).unwrap();
        assert!(matches!(outcome, RunOutcome::NoData));
        assert!(outcome.fit().is_none());
        assert!(outcome.data().is_none());
    }

    #[test]
    fn single_month_history_fails_the_fit_but_keeps_the_data() {
        let source = vec![
            DefectRecord::new("Solo", d(2023, 3, 1)),
            DefectRecord::new("Solo", d(2023, 3, 9)),
        ];
        let outcome = run_estimation(&source, &FitConfig::default()).unwrap();
        match outcome {
            RunOutcome::FitFailed { data, error } => {
                assert_eq!(data.series.as_pairs(), vec![(1, 2)]);
                assert!(matches!(error, AppError::FitConvergence(_)));
            }
            other => panic!("expected FitFailed, got {other:?}"),
        }
    }

    #[test]
    fn source_failures_propagate() {
        struct Down;
        impl DefectSource for Down {
            fn describe(&self) -> String {
                "down".to_string()
            }
            fn fetch_defects(&self) -> Result<Vec<DefectRecord>, AppError> {
                Err(AppError::Connection("refused".to_string()))
            }
        }
        let err = run_estimation(&Down, &FitConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Connection(_)));
    }
}
