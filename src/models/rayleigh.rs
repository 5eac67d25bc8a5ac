//! Rayleigh defect-arrival model.
//!
//! ```text
//! f(t; σ, K) = K * (t / σ²) * exp(-t² / (2σ²))
//! ```
//!
//! `K` scales the Rayleigh density, so it is the expected total number of
//! defects over the project's life and `σ` is the month of peak arrival.
//!
//! The fitter relies on three primitive operations:
//! - evaluate `f` (residuals, plots)
//! - the shape term `g(t; σ) = f(t; σ, 1)` (closed-form `K` during grid seeding)
//! - the gradient `∂f/∂σ, ∂f/∂K` (Jacobian rows)

/// Shape term `t/σ² · exp(-t²/2σ²)`, i.e. the model at `K = 1`.
pub fn shape(t: f64, sigma: f64) -> f64 {
    let s2 = sigma * sigma;
    (t / s2) * (-(t * t) / (2.0 * s2)).exp()
}

/// Evaluate the model at `t`.
pub fn predict(t: f64, sigma: f64, scale: f64) -> f64 {
    scale * shape(t, sigma)
}

/// Partial derivatives `(∂f/∂σ, ∂f/∂K)` at `t`.
///
/// `∂f/∂σ = K · t · (t² − 2σ²) / σ⁵ · exp(-t²/2σ²)`
pub fn gradient(t: f64, sigma: f64, scale: f64) -> (f64, f64) {
    let s2 = sigma * sigma;
    let e = (-(t * t) / (2.0 * s2)).exp();
    let d_sigma = scale * t * (t * t - 2.0 * s2) / (s2 * s2 * sigma) * e;
    let d_scale = (t / s2) * e;
    (d_sigma, d_scale)
}

/// Sample the fitted curve at `n` evenly spaced points over `[x_min, x_max]`.
pub fn sample_curve(sigma: f64, scale: f64, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let t = x_min + u * (x_max - x_min);
            (t, predict(t, sigma, scale))
        })
        .collect()
}
