//! Mathematical utilities: dense least squares.

pub mod ols;

pub use ols::*;
