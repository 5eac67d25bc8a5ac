//! Reporting utilities: prediction sampling and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::RayleighFit;
use crate::models::sample_curve;

/// Samples in the predicted curve drawn over the observed bars.
pub const PREDICTION_POINTS: usize = 100;
/// Months past the last observation covered by the predicted curve.
pub const PREDICTION_PADDING_MONTHS: u32 = 2;

/// Predicted curve over `[0, max_month + 2]`.
pub fn prediction_curve(fit: &RayleighFit, max_month: u32) -> Vec<(f64, f64)> {
    let x_max = (max_month + PREDICTION_PADDING_MONTHS) as f64;
    sample_curve(fit.sigma, fit.scale, 0.0, x_max, PREDICTION_POINTS)
}

/// Legend label for the fitted curve.
pub fn prediction_label(fit: &RayleighFit) -> String {
    format!("Predicción Rayleigh (σ={:.2})", fit.sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActiveBounds;

    fn fit() -> RayleighFit {
        RayleighFit {
            sigma: 5.0,
            scale: 100.0,
            sse: 0.0,
            rmse: 0.0,
            iterations: 3,
            active_bounds: ActiveBounds::default(),
        }
    }

    #[test]
    fn prediction_covers_padded_range() {
        let curve = prediction_curve(&fit(), 24);
        assert_eq!(curve.len(), PREDICTION_POINTS);
        assert_eq!(curve[0], (0.0, 0.0));
        assert!((curve[PREDICTION_POINTS - 1].0 - 26.0).abs() < 1e-12);
        assert!(curve.iter().all(|(_, y)| y.is_finite() && *y >= 0.0));
    }

    #[test]
    fn label_rounds_sigma() {
        let mut f = fit();
        f.sigma = 4.876;
        assert_eq!(prediction_label(&f), "Predicción Rayleigh (σ=4.88)");
    }
}
