//! σ grid generation for seeding the Rayleigh fit.
//!
//! For a fixed σ the model is linear in `K`, so the best `K` has a closed form.
//! Scanning a log-spaced σ grid therefore gives a cheap, deterministic starting
//! point close to the global minimum before the local refinement runs.

use crate::domain::FitBounds;
use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::Config(format!(
            "Invalid sigma range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::Config("Sigma grid steps must be >= 2.".to_string()));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    // Pin the endpoints so rounding never steps outside the bounds.
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// σ candidates spanning the whole σ bound.
pub fn sigma_grid(bounds: &FitBounds, steps: usize) -> Result<Vec<f64>, AppError> {
    log_space(bounds.sigma_min, bounds.sigma_max, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert_eq!(v[0], 0.1);
        assert_eq!(v[v.len() - 1], 10.0);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sigma_grid_stays_inside_bounds() {
        let bounds = FitBounds::default();
        let grid = sigma_grid(&bounds, 60).unwrap();
        assert_eq!(grid.len(), 60);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        assert!(grid.iter().all(|&s| s >= bounds.sigma_min && s <= bounds.sigma_max));
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(matches!(log_space(0.0, 1.0, 5), Err(AppError::Config(_))));
        assert!(matches!(log_space(1.0, 2.0, 1), Err(AppError::Config(_))));
    }
}
