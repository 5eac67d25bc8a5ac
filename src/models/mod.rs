//! Defect-arrival model implementations.
//!
//! Models are implemented as small, pure functions so that fitting/plotting code
//! can stay generic.

pub mod rayleigh;

pub use rayleigh::*;
