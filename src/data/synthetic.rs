//! Synthetic defect history for demos and tests without a warehouse.
//!
//! Each project gets a random start month and a fixed number of defects. The
//! first defect lands in the start month (it defines the project start); the
//! rest arrive after a Rayleigh-distributed delay, drawn as
//! `Weibull(scale = σ·√2, shape = 2)`, which is the Rayleigh(σ) law.

use chrono::{Datelike, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Weibull;

use crate::data::DefectSource;
use crate::domain::{DefectRecord, SyntheticConfig};
use crate::error::AppError;

/// Latest start offset (months after the base date).
const START_SPREAD_MONTHS: u32 = 36;
/// Cap on arrival delays so pathological σ values stay bounded.
const MAX_DELAY_MONTHS: u32 = 240;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    fn validate(&self) -> Result<(), AppError> {
        let c = &self.config;
        if c.projects == 0 {
            return Err(AppError::Config("Synthetic project count must be > 0.".to_string()));
        }
        if c.defects_per_project == 0 {
            return Err(AppError::Config("Synthetic defects per project must be > 0.".to_string()));
        }
        if !(c.true_sigma.is_finite() && c.true_sigma > 0.0) {
            return Err(AppError::Config(format!(
                "Synthetic sigma must be finite and > 0 (got {}).",
                c.true_sigma
            )));
        }
        Ok(())
    }
}

impl DefectSource for SyntheticSource {
    fn describe(&self) -> String {
        format!(
            "synthetic:{}x{} sigma={} seed={}",
            self.config.projects,
            self.config.defects_per_project,
            self.config.true_sigma,
            self.config.seed
        )
    }

    fn fetch_defects(&self) -> Result<Vec<DefectRecord>, AppError> {
        self.validate()?;
        let c = &self.config;

        let mut rng = StdRng::seed_from_u64(c.seed);
        let arrival = Weibull::new(c.true_sigma * std::f64::consts::SQRT_2, 2.0)
            .map_err(|e| AppError::Config(format!("Arrival distribution error: {e}")))?;

        let base = NaiveDate::from_ymd_opt(2020, 1, 1)
            .ok_or_else(|| AppError::Config("Invalid synthetic base date.".to_string()))?;

        let mut out = Vec::with_capacity(c.projects * c.defects_per_project);
        for p in 0..c.projects {
            let name = format!("Proyecto-{:02}", p + 1);
            let start = add_months(base, rng.gen_range(0..START_SPREAD_MONTHS))?;

            for k in 0..c.defects_per_project {
                // Delay t in (m-1, m] lands in relative month m.
                let offset = if k == 0 {
                    0
                } else {
                    let t: f64 = arrival.sample(&mut rng);
                    (t.ceil() as u32).saturating_sub(1).min(MAX_DELAY_MONTHS)
                };
                let month_start = add_months(start, offset)?;
                let day = rng.gen_range(1..=28);
                let date = month_start.with_day(day).unwrap_or(month_start);
                out.push(DefectRecord::new(name.clone(), date));
            }
        }

        Ok(out)
    }
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, AppError> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| AppError::Config(format!("Date overflow adding {months} months to {date}.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SyntheticConfig {
        SyntheticConfig {
            projects: 12,
            defects_per_project: 40,
            true_sigma: 5.0,
            seed,
        }
    }

    #[test]
    fn same_seed_same_history() {
        let a = SyntheticSource::new(config(7)).fetch_defects().unwrap();
        let b = SyntheticSource::new(config(7)).fetch_defects().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 12 * 40);
    }

    #[test]
    fn first_defect_defines_project_start() {
        let records = SyntheticSource::new(config(3)).fetch_defects().unwrap();
        let starts = crate::timeline::project_starts(&records);
        assert_eq!(starts.len(), 12);
        for s in starts {
            let first = records
                .iter()
                .find(|r| r.project_name == s.project_name)
                .unwrap();
            assert_eq!(
                (first.defect_date.year(), first.defect_date.month()),
                (s.start_date.year(), s.start_date.month())
            );
        }
    }

    #[test]
    fn rejects_invalid_settings() {
        let bad = SyntheticConfig {
            true_sigma: 0.0,
            ..config(1)
        };
        assert!(matches!(
            SyntheticSource::new(bad).fetch_defects(),
            Err(AppError::Config(_))
        ));
    }
}
