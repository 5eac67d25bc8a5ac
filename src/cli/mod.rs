//! Command-line parsing for the Rayleigh defect-arrival estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/math code. Every option has a default, so a bare `rayleigh` run
//! reads the warehouse, fits, and writes `Prediccion_Rayleigh.png`.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::SourceKind;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "rayleigh",
    version,
    about = "Estimate a defect-arrival curve with a Rayleigh fit and chart it"
)]
pub struct Cli {
    /// Where defect records come from.
    #[arg(long, value_enum, env = "RAYLEIGH_SOURCE", default_value_t = SourceKind::Sqlite)]
    pub source: SourceKind,

    /// SQLite warehouse file (sqlite source).
    #[arg(long, env = "RAYLEIGH_DB", default_value = "SoftwareFactory_DW.db")]
    pub db: PathBuf,

    /// CSV export with project and date columns (csv source).
    #[arg(long, env = "RAYLEIGH_CSV")]
    pub csv: Option<PathBuf>,

    /// Project status treated as finished (repeatable).
    #[arg(long = "status", value_name = "STATUS", default_values_t = ["Completado".to_string(), "Terminado".to_string()])]
    pub statuses: Vec<String>,

    /// Output chart (PNG).
    #[arg(long, env = "RAYLEIGH_OUTPUT", default_value = "Prediccion_Rayleigh.png")]
    pub output: PathBuf,

    /// Skip writing the PNG chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Also render an ASCII plot in the terminal.
    #[arg(long)]
    pub ascii: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Number of synthetic projects (synthetic source).
    #[arg(long, default_value_t = 12)]
    pub projects: usize,

    /// Defects generated per synthetic project.
    #[arg(long, default_value_t = 40)]
    pub defects_per_project: usize,

    /// Rayleigh sigma (months) used to generate synthetic arrivals.
    #[arg(long, default_value_t = 5.0)]
    pub true_sigma: f64,

    /// Random seed for the synthetic source.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Sigma grid steps used to seed the fit.
    #[arg(long, default_value_t = 60)]
    pub grid_steps: usize,

    /// Iteration budget for the Levenberg-Marquardt refinement.
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,
}
