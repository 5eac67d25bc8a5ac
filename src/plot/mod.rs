//! Chart rendering: terminal (ASCII) and PNG artifact.

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
