//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`DefectRecord`) and derived project data
//! - the pooled relative-month series
//! - fit settings and outputs (`FitConfig`, `RayleighFit`)
//! - run configuration (`RunConfig`, `SourceKind`)

pub mod types;

pub use types::*;
