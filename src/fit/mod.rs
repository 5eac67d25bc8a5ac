//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate the σ grid used to seed the fit
//! - evaluate each σ candidate with its closed-form scale (parallel)
//! - refine the best candidate with bounded Levenberg–Marquardt

pub mod fitter;
pub mod sigma_grid;

pub use fitter::*;
pub use sigma_grid::*;
