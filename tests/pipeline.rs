use chrono::NaiveDate;

use defect_rayleigh::app::pipeline::{RunOutcome, estimate_from_records, run_estimation};
use defect_rayleigh::data::{CsvSource, SyntheticSource};
use defect_rayleigh::domain::{DEFAULT_STATUSES, DefectRecord, FitConfig, SyntheticConfig};
use defect_rayleigh::error::AppError;
use defect_rayleigh::report::prediction_curve;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn statuses() -> Vec<String> {
    DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect()
}

#[test]
fn gap_months_are_zero_filled_end_to_end() {
    let records = vec![
        DefectRecord::new("Portal", d(2023, 1, 15)),
        DefectRecord::new("Portal", d(2023, 1, 28)),
        DefectRecord::new("Portal", d(2023, 2, 3)),
        DefectRecord::new("Portal", d(2023, 4, 20)),
    ];

    match estimate_from_records(&records, &FitConfig::default()).unwrap() {
        RunOutcome::Fitted { data, fit } => {
            assert_eq!(data.series.as_pairs(), vec![(1, 2), (2, 1), (3, 0), (4, 1)]);
            assert!(fit.sigma >= 0.1 && fit.sigma <= 50.0);
            assert!(fit.scale >= 0.1 && fit.scale <= 1000.0);
        }
        RunOutcome::FitFailed { data, error } => {
            assert_eq!(data.series.as_pairs(), vec![(1, 2), (2, 1), (3, 0), (4, 1)]);
            assert!(matches!(error, AppError::FitConvergence(_)));
        }
        RunOutcome::NoData => panic!("records were provided"),
    }
}

#[test]
fn projects_are_pooled_by_relative_month() {
    let records = vec![
        DefectRecord::new("A", d(2022, 3, 1)),
        DefectRecord::new("A", d(2022, 4, 9)),
        DefectRecord::new("B", d(2023, 11, 30)),
        DefectRecord::new("B", d(2023, 12, 1)),
        DefectRecord::new("B", d(2024, 1, 2)),
    ];
    let outcome = estimate_from_records(&records, &FitConfig::default()).unwrap();
    let data = outcome.data().unwrap();

    assert_eq!(data.series.as_pairs(), vec![(1, 2), (2, 2), (3, 1)]);
    assert_eq!(data.series.total_defects(), records.len() as u64);
    assert_eq!(data.spans.len(), 2);
}

#[test]
fn empty_history_is_not_an_error() {
    let outcome = estimate_from_records(&[], &FitConfig::default()).unwrap();
    assert!(matches!(outcome, RunOutcome::NoData));
}

#[test]
fn synthetic_history_recovers_generating_sigma() {
    let source = SyntheticSource::new(SyntheticConfig {
        projects: 12,
        defects_per_project: 40,
        true_sigma: 5.0,
        seed: 42,
    });
    let outcome = run_estimation(&source, &FitConfig::default()).unwrap();
    let fit = outcome.fit().expect("synthetic history should fit");

    // Monthly binning shifts the peak by up to a month.
    assert!(fit.sigma > 3.5 && fit.sigma < 7.5, "sigma = {}", fit.sigma);
    assert!(fit.scale > 200.0 && fit.scale < 1000.0, "K = {}", fit.scale);

    let max_month = outcome.data().unwrap().series.max_month();
    let curve = prediction_curve(fit, max_month);
    assert!(curve.iter().all(|(_, y)| y.is_finite() && *y >= 0.0));
}

#[test]
fn csv_export_runs_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("defects.csv");
    std::fs::write(
        &path,
        "NombreProyecto,Fecha,EstadoActual\n\
         Portal,2023-01-15,Completado\n\
         Portal,2023-02-10,Completado\n\
         Portal,2023-02-11,Completado\n\
         Portal,2023-03-01,Completado\n\
         App,2023-01-01,En Progreso\n",
    )
    .unwrap();

    let source = CsvSource::new(path, statuses());
    let outcome = run_estimation(&source, &FitConfig::default()).unwrap();
    let data = outcome.data().unwrap();
    assert_eq!(data.records_loaded, 4);
    assert_eq!(data.series.as_pairs(), vec![(1, 1), (2, 2), (3, 1)]);
}
