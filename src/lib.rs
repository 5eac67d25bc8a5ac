//! `defect-rayleigh` library crate.
//!
//! The binary (`rayleigh`) is a thin wrapper around this library so that:
//!
//! - the estimation pipeline is testable without a database or a process
//! - defect sources are swappable behind one trait
//! - presentation (console, ASCII, PNG) stays out of the fitting code

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod timeline;
