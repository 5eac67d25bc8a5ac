//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - builds the configured defect source
//! - runs normalization + fitting (see [`pipeline`])
//! - prints the console report and writes the chart

use clap::Parser;

use crate::cli::Cli;
use crate::domain::{FitBounds, FitConfig, RunConfig, SyntheticConfig};
use crate::error::AppError;
use crate::report::{
    format_chart_saved, format_connecting, format_empty_warning, format_fit_failure,
    format_fit_summary, format_records_loaded, format_series_summary, prediction_curve,
};

pub mod pipeline;

use pipeline::{PreparedData, RunOutcome};

/// Entry point for the `rayleigh` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = run_config_from_args(&cli);
    run_with_config(&config)
}

/// Run one estimation with an already resolved configuration.
pub fn run_with_config(config: &RunConfig) -> Result<(), AppError> {
    validate(config)?;
    let source = crate::data::source_from_config(config)?;
    println!("{}", format_connecting(&source.describe()));

    let outcome = pipeline::run_estimation(source.as_ref(), &config.fit)?;
    present(&outcome, config)
}

fn present(outcome: &RunOutcome, config: &RunConfig) -> Result<(), AppError> {
    match outcome {
        RunOutcome::NoData => {
            println!("{}", format_records_loaded(0));
            println!("{}", format_empty_warning(&config.statuses));
            Ok(())
        }
        RunOutcome::FitFailed { data, error } => {
            print_data(data, None, config);
            println!("{}", format_fit_failure(error));
            Ok(())
        }
        RunOutcome::Fitted { data, fit } => {
            let curve = prediction_curve(fit, data.series.max_month());
            print_data(data, Some(&curve), config);
            println!("{}", format_fit_summary(fit));

            if config.chart {
                crate::plot::render_chart_png(&data.series, fit, &curve, &config.output)?;
                println!("{}", format_chart_saved(&config.output));
            }
            Ok(())
        }
    }
}

fn print_data(data: &PreparedData, curve: Option<&[(f64, f64)]>, config: &RunConfig) {
    println!("{}", format_records_loaded(data.records_loaded));
    println!("{}", format_series_summary(&data.series, &data.spans));

    if config.ascii {
        let plot = crate::plot::render_ascii_plot(
            &data.series,
            curve,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }
}

fn validate(config: &RunConfig) -> Result<(), AppError> {
    if config.statuses.is_empty() {
        return Err(AppError::Config("At least one --status is required.".to_string()));
    }
    if !config.fit.bounds.is_valid() {
        return Err(AppError::Config("Invalid fit bounds.".to_string()));
    }
    if config.fit.grid_steps < 2 {
        return Err(AppError::Config("--grid-steps must be >= 2.".to_string()));
    }
    let s = &config.synthetic;
    if !(s.true_sigma.is_finite() && s.true_sigma > 0.0) {
        return Err(AppError::Config("--true-sigma must be a positive number.".to_string()));
    }
    Ok(())
}

pub fn run_config_from_args(cli: &Cli) -> RunConfig {
    RunConfig {
        source: cli.source,
        db_path: cli.db.clone(),
        csv_path: cli.csv.clone(),
        statuses: cli.statuses.clone(),
        synthetic: SyntheticConfig {
            projects: cli.projects,
            defects_per_project: cli.defects_per_project,
            true_sigma: cli.true_sigma,
            seed: cli.seed,
        },
        fit: FitConfig {
            bounds: FitBounds::default(),
            grid_steps: cli.grid_steps,
            max_iterations: cli.max_iterations,
            ..FitConfig::default()
        },
        output: cli.output.clone(),
        chart: !cli.no_chart,
        ascii: cli.ascii,
        plot_width: cli.width,
        plot_height: cli.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceKind;

    #[test]
    fn cli_defaults_match_default_run_config() {
        let cli = Cli::try_parse_from(["rayleigh", "--source", "sqlite"]).unwrap();
        let config = run_config_from_args(&cli);
        let defaults = RunConfig::default();

        assert_eq!(config.source, SourceKind::Sqlite);
        assert_eq!(config.statuses, defaults.statuses);
        assert_eq!(config.output, defaults.output);
        assert_eq!(config.fit.grid_steps, defaults.fit.grid_steps);
        assert_eq!(config.fit.max_iterations, defaults.fit.max_iterations);
        assert!(config.chart);
    }

    #[test]
    fn no_chart_flag_disables_png() {
        let cli = Cli::try_parse_from(["rayleigh", "--no-chart", "--source", "synthetic"]).unwrap();
        let config = run_config_from_args(&cli);
        assert!(!config.chart);
        assert_eq!(config.source, SourceKind::Synthetic);
    }

    #[test]
    fn synthetic_run_completes_without_chart() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            source: SourceKind::Synthetic,
            output: dir.path().join("chart.png"),
            chart: false,
            ascii: true,
            ..RunConfig::default()
        };
        run_with_config(&config).unwrap();
        assert!(!config.output.exists());
    }

    #[test]
    fn missing_database_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            db_path: dir.path().join("absent.db"),
            output: dir.path().join("chart.png"),
            ..RunConfig::default()
        };
        let err = run_with_config(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!config.output.exists());
    }

    #[test]
    fn empty_status_list_is_a_config_error() {
        let config = RunConfig {
            statuses: Vec::new(),
            ..RunConfig::default()
        };
        assert!(matches!(run_with_config(&config), Err(AppError::Config(_))));
    }
}
