//! Timeline normalization.
//!
//! Projects run on different calendars. To pool their defects into one arrival
//! curve we re-index every defect by "month since project start", where a
//! project starts in the month of its first recorded defect:
//!
//! ```text
//! month = (year(date) - year(start)) * 12 + (month(date) - month(start)) + 1
//! ```
//!
//! This is a calendar-month difference, not elapsed days / 30: Jan 31 and
//! Feb 1 are one month apart.
//!
//! Counts are pooled across all projects into one series and zero-filled over
//! `1..=max_month`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{DefectRecord, MonthCount, ProjectSpan, ProjectStart, RelativeMonthSeries};
use crate::error::AppError;

/// Relative (1-based) calendar month of `date` within a project starting at `start`.
///
/// Dates before `start` clamp to month 1. That cannot happen for starts
/// produced by [`project_starts`], which are per-project minima.
pub fn relative_month(date: NaiveDate, start: NaiveDate) -> u32 {
    let years = date.year() as i64 - start.year() as i64;
    let months = date.month() as i64 - start.month() as i64;
    let rel = years * 12 + months + 1;
    rel.max(1) as u32
}

/// Earliest defect date per project, ordered by project name.
pub fn project_starts(records: &[DefectRecord]) -> Vec<ProjectStart> {
    start_map(records)
        .into_iter()
        .map(|(name, start_date)| ProjectStart {
            project_name: name.to_string(),
            start_date,
        })
        .collect()
}

/// Per-project extent on the relative-month axis, ordered by project name.
pub fn project_spans(records: &[DefectRecord]) -> Vec<ProjectSpan> {
    let starts = start_map(records);
    let mut spans: BTreeMap<&str, ProjectSpan> = BTreeMap::new();

    for r in records {
        let Some(&start) = starts.get(r.project_name.as_str()) else {
            continue;
        };
        let month = relative_month(r.defect_date, start);
        let span = spans
            .entry(r.project_name.as_str())
            .or_insert_with(|| ProjectSpan {
                project_name: r.project_name.clone(),
                start_date: start,
                last_month: 1,
                defects: 0,
            });
        span.last_month = span.last_month.max(month);
        span.defects += 1;
    }

    spans.into_values().collect()
}

/// Pool defect records into a contiguous relative-month series.
///
/// Returns [`AppError::EmptyDataset`] for an empty record set.
pub fn normalize(records: &[DefectRecord]) -> Result<RelativeMonthSeries, AppError> {
    if records.is_empty() {
        return Err(AppError::EmptyDataset);
    }

    let starts = start_map(records);

    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for r in records {
        let Some(&start) = starts.get(r.project_name.as_str()) else {
            continue;
        };
        *counts.entry(relative_month(r.defect_date, start)).or_insert(0) += 1;
    }

    let max_month = counts.keys().next_back().copied().unwrap_or(1);
    let points = (1..=max_month)
        .map(|month| MonthCount {
            month,
            defects: counts.get(&month).copied().unwrap_or(0),
        })
        .collect();

    Ok(RelativeMonthSeries { points })
}

fn start_map(records: &[DefectRecord]) -> BTreeMap<&str, NaiveDate> {
    let mut starts: BTreeMap<&str, NaiveDate> = BTreeMap::new();
    for r in records {
        starts
            .entry(r.project_name.as_str())
            .and_modify(|d| *d = (*d).min(r.defect_date))
            .or_insert(r.defect_date);
    }
    starts
}
