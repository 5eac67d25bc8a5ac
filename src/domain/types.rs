//! Shared domain types.
//!
//! These types are intentionally kept small and plain so they can flow from the
//! data sources through normalization and fitting into reporting without
//! conversion layers.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Project statuses that mark a project as finished.
pub const DEFAULT_STATUSES: [&str; 2] = ["Completado", "Terminado"];
/// Default SQLite warehouse file.
pub const DEFAULT_DB_PATH: &str = "SoftwareFactory_DW.db";
/// Default chart artifact.
pub const DEFAULT_OUTPUT: &str = "Prediccion_Rayleigh.png";

/// One historical defect on a completed/terminated project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectRecord {
    pub project_name: String,
    pub defect_date: NaiveDate,
}

impl DefectRecord {
    pub fn new(project_name: impl Into<String>, defect_date: NaiveDate) -> Self {
        Self {
            project_name: project_name.into(),
            defect_date,
        }
    }
}

/// First observed defect date of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStart {
    pub project_name: String,
    pub start_date: NaiveDate,
}

/// Per-project extent on the relative-month axis (console summary only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpan {
    pub project_name: String,
    pub start_date: NaiveDate,
    pub last_month: u32,
    pub defects: usize,
}

/// Defect count for a single relative month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCount {
    /// 1-based month since project start.
    pub month: u32,
    pub defects: u64,
}

/// Pooled defect counts over a contiguous `1..=max_month` axis.
///
/// Construction goes through [`crate::timeline::normalize`], which guarantees
/// the index is gap-free and starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeMonthSeries {
    pub(crate) points: Vec<MonthCount>,
}

impl RelativeMonthSeries {
    /// Build a series from counts for months `1..=counts.len()`.
    pub fn from_counts(counts: &[u64]) -> Self {
        let points = counts
            .iter()
            .enumerate()
            .map(|(i, &defects)| MonthCount {
                month: i as u32 + 1,
                defects,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[MonthCount] {
        &self.points
    }

    pub fn max_month(&self) -> u32 {
        self.points.last().map(|p| p.month).unwrap_or(0)
    }

    pub fn total_defects(&self) -> u64 {
        self.points.iter().map(|p| p.defects).sum()
    }

    /// Month indices as `f64` (the fit engine's X).
    pub fn months(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.month as f64).collect()
    }

    /// Defect counts as `f64` (the fit engine's Y).
    pub fn counts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.defects as f64).collect()
    }

    pub fn as_pairs(&self) -> Vec<(u32, u64)> {
        self.points.iter().map(|p| (p.month, p.defects)).collect()
    }
}

/// Closed parameter box for the Rayleigh fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBounds {
    pub sigma_min: f64,
    pub sigma_max: f64,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Default for FitBounds {
    fn default() -> Self {
        // σ must stay away from 0 (the model divides by σ²).
        Self {
            sigma_min: 0.1,
            sigma_max: 50.0,
            scale_min: 0.1,
            scale_max: 1000.0,
        }
    }
}

impl FitBounds {
    pub fn clamp_sigma(&self, sigma: f64) -> f64 {
        sigma.clamp(self.sigma_min, self.sigma_max)
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.scale_min, self.scale_max)
    }

    pub fn is_valid(&self) -> bool {
        let finite = [self.sigma_min, self.sigma_max, self.scale_min, self.scale_max]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.sigma_min > 0.0
            && self.scale_min > 0.0
            && self.sigma_max > self.sigma_min
            && self.scale_max > self.scale_min
    }
}

/// Which box constraints are active at the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveBounds {
    pub sigma: bool,
    pub scale: bool,
}

/// A converged Rayleigh fit.
#[derive(Debug, Clone, PartialEq)]
pub struct RayleighFit {
    pub sigma: f64,
    /// `K`: the estimated total number of defects.
    pub scale: f64,
    pub sse: f64,
    pub rmse: f64,
    pub iterations: usize,
    pub active_bounds: ActiveBounds,
}

impl RayleighFit {
    /// `K` truncated toward zero, as printed in the summary.
    pub fn total_defects_estimate(&self) -> i64 {
        self.scale.trunc() as i64
    }
}

/// Fit engine settings.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub bounds: FitBounds,
    /// Number of log-spaced σ values used to seed the refinement.
    pub grid_steps: usize,
    pub max_iterations: usize,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            bounds: FitBounds::default(),
            grid_steps: 60,
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-10,
            gtol: 1e-10,
        }
    }
}

/// Where defect records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// SQLite warehouse with the Fact_Calidad / Dim_Proyecto / Dim_Tiempo schema.
    Sqlite,
    /// Two-column CSV export (project, date).
    Csv,
    /// Seeded synthetic projects (demo mode).
    Synthetic,
}

/// Parameters for the synthetic source.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub projects: usize,
    pub defects_per_project: usize,
    /// Rayleigh σ (months) used to draw defect arrival times.
    pub true_sigma: f64,
    pub seed: u64,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceKind,
    pub db_path: PathBuf,
    pub csv_path: Option<PathBuf>,
    /// Project statuses considered finished.
    pub statuses: Vec<String>,
    pub synthetic: SyntheticConfig,
    pub fit: FitConfig,

    pub output: PathBuf,
    pub chart: bool,
    pub ascii: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Sqlite,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            csv_path: None,
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
            synthetic: SyntheticConfig {
                projects: 12,
                defects_per_project: 40,
                true_sigma: 5.0,
                seed: 42,
            },
            fit: FitConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            chart: true,
            ascii: false,
            plot_width: 80,
            plot_height: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_match_reference_box() {
        let b = FitBounds::default();
        assert!(b.is_valid());
        assert_eq!(b.clamp_sigma(0.0), 0.1);
        assert_eq!(b.clamp_sigma(80.0), 50.0);
        assert_eq!(b.clamp_scale(5000.0), 1000.0);
    }

    #[test]
    fn total_defects_truncates_toward_zero() {
        let fit = RayleighFit {
            sigma: 4.2,
            scale: 99.97,
            sse: 0.0,
            rmse: 0.0,
            iterations: 1,
            active_bounds: ActiveBounds::default(),
        };
        assert_eq!(fit.total_defects_estimate(), 99);
    }
}
