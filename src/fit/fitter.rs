//! Bounded nonlinear least-squares fit of the Rayleigh model.
//!
//! Given:
//! - months `t_i` (1..max_month)
//! - observed defect counts `y_i`
//! - a parameter box for `(σ, K)`
//!
//! we minimize `Σ (f(t_i; σ, K) − y_i)²` in two stages:
//!
//! 1. **Seed**: scan a log-spaced σ grid; for each σ the optimal `K` is linear
//!    (`K = Σ g·y / Σ g²`, clamped into the box). The lowest-SSE candidate wins.
//! 2. **Refine**: projected Levenberg–Marquardt from the seed. Every iterate is
//!    clamped into the box; parameters pinned at a bound with the gradient
//!    pointing outward are frozen for that step.
//!
//! Failures are reported as [`AppError::FitConvergence`] with a description of
//! the numerical problem; the caller decides how to present them.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

use crate::domain::{ActiveBounds, FitBounds, FitConfig, RayleighFit, RelativeMonthSeries};
use crate::error::AppError;
use crate::fit::sigma_grid::sigma_grid;
use crate::math::solve_least_squares;
use crate::models::{gradient, predict, shape};

/// Number of free model parameters (σ, K).
pub const N_PARAMS: usize = 2;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// Best grid candidate used to seed the refinement.
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    pub sigma: f64,
    pub scale: f64,
    pub sse: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    seed: Seed,
}

/// Fit the Rayleigh model to a relative-month series.
pub fn fit_rayleigh(series: &RelativeMonthSeries, config: &FitConfig) -> Result<RayleighFit, AppError> {
    fit_points(&series.months(), &series.counts(), config)
}

/// Fit the Rayleigh model to raw `(x, y)` arrays.
pub fn fit_points(x: &[f64], y: &[f64], config: &FitConfig) -> Result<RayleighFit, AppError> {
    if !config.bounds.is_valid() {
        return Err(AppError::Config(format!("Invalid fit bounds: {:?}", config.bounds)));
    }
    if x.len() != y.len() {
        return Err(AppError::FitConvergence(format!(
            "Mismatched inputs: {} x values vs {} y values.",
            x.len(),
            y.len()
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::FitConvergence("Input contains non-finite values.".to_string()));
    }

    let nonzero = y.iter().filter(|&&v| v != 0.0).count();
    if nonzero < N_PARAMS {
        return Err(AppError::FitConvergence(format!(
            "Insufficient data: {nonzero} non-zero observation(s) for {N_PARAMS} free parameters."
        )));
    }

    let seed = seed_from_grid(x, y, &config.bounds, config.grid_steps)?;
    debug!(sigma = seed.sigma, scale = seed.scale, sse = seed.sse, "rayleigh grid seed");

    refine(x, y, seed, config)
}

/// Deterministic grid seed: best closed-form `K` for each σ on the grid.
pub fn seed_from_grid(x: &[f64], y: &[f64], bounds: &FitBounds, steps: usize) -> Result<Seed, AppError> {
    let grid = sigma_grid(bounds, steps)?;

    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &sigma)| {
            evaluate_sigma(x, y, sigma, bounds).map(|seed| Candidate { idx, seed })
        })
        .collect();

    // Pick the minimum SSE; break ties by original grid index.
    let best = candidates.iter().min_by(|a, b| {
        a.seed
            .sse
            .partial_cmp(&b.seed.sse)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.idx.cmp(&b.idx))
    });

    best.map(|c| c.seed).ok_or_else(|| {
        AppError::FitConvergence("No finite starting point found on the sigma grid.".to_string())
    })
}

fn evaluate_sigma(x: &[f64], y: &[f64], sigma: f64, bounds: &FitBounds) -> Option<Seed> {
    let mut gy = 0.0;
    let mut gg = 0.0;
    for (&t, &yi) in x.iter().zip(y) {
        let g = shape(t, sigma);
        gy += g * yi;
        gg += g * g;
    }
    if !(gg.is_finite() && gy.is_finite()) || gg <= 0.0 {
        return None;
    }
    let scale = bounds.clamp_scale(gy / gg);
    let sse = sum_squared_residuals(x, y, sigma, scale);
    sse.is_finite().then_some(Seed { sigma, scale, sse })
}

fn refine(x: &[f64], y: &[f64], seed: Seed, config: &FitConfig) -> Result<RayleighFit, AppError> {
    let bounds = &config.bounds;
    let lower = [bounds.sigma_min, bounds.scale_min];
    let upper = [bounds.sigma_max, bounds.scale_max];

    let n = x.len();
    let y_norm2: f64 = y.iter().map(|v| v * v).sum();
    let exact_fit = 1e-20 * y_norm2.max(1.0);

    let mut p = [seed.sigma, seed.scale];
    let mut sse = seed.sse;
    let mut lambda = LAMBDA_INIT;

    for iter in 1..=config.max_iterations {
        if sse <= exact_fit {
            return Ok(finish(p, sse, n, iter - 1, bounds));
        }

        let (jac, r) = jacobian_and_residuals(x, y, p);
        let g = jac.transpose() * &r;

        // Freeze parameters pinned at a bound whose descent direction (-g) points outward.
        let mut frozen = [false; N_PARAMS];
        for k in 0..N_PARAMS {
            frozen[k] = (p[k] <= lower[k] && g[k] > 0.0) || (p[k] >= upper[k] && g[k] < 0.0);
        }
        let g_proj = (0..N_PARAMS)
            .filter(|&k| !frozen[k])
            .map(|k| g[k].abs())
            .fold(0.0_f64, f64::max);
        if !g_proj.is_finite() {
            return Err(AppError::FitConvergence(
                "Non-finite gradient encountered during fit.".to_string(),
            ));
        }
        if g_proj <= config.gtol {
            debug!(iter, sse, "rayleigh fit converged (gradient)");
            return Ok(finish(p, sse, n, iter, bounds));
        }

        // Marquardt scaling: D = sqrt(diag(JᵀJ)), floored to keep the system well-posed.
        let mut d = [1.0; N_PARAMS];
        for k in 0..N_PARAMS {
            let col_norm = jac.column(k).norm();
            d[k] = if col_norm > 1e-12 { col_norm } else { 1.0 };
        }

        loop {
            let mut a = DMatrix::<f64>::zeros(n + N_PARAMS, N_PARAMS);
            let mut b = DVector::<f64>::zeros(n + N_PARAMS);
            for i in 0..n {
                for k in 0..N_PARAMS {
                    if !frozen[k] {
                        a[(i, k)] = jac[(i, k)];
                    }
                }
                b[i] = -r[i];
            }
            for k in 0..N_PARAMS {
                a[(n + k, k)] = if frozen[k] { 1.0 } else { lambda.sqrt() * d[k] };
            }

            let delta = solve_least_squares(&a, &b).ok_or_else(|| {
                AppError::FitConvergence("Singular system in Levenberg-Marquardt step.".to_string())
            })?;

            let mut p_new = p;
            for k in 0..N_PARAMS {
                if !frozen[k] {
                    p_new[k] = (p[k] + delta[k]).clamp(lower[k], upper[k]);
                }
            }
            let step_norm = ((p_new[0] - p[0]).powi(2) + (p_new[1] - p[1]).powi(2)).sqrt();
            let p_norm = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let small_step = step_norm <= config.xtol * (p_norm + config.xtol);

            let sse_new = sum_squared_residuals(x, y, p_new[0], p_new[1]);
            if sse_new.is_finite() && sse_new < sse {
                let reduction = sse - sse_new;
                p = p_new;
                sse = sse_new;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if reduction <= config.ftol * sse || small_step {
                    debug!(iter, sse, sigma = p[0], scale = p[1], "rayleigh fit converged");
                    return Ok(finish(p, sse, n, iter, bounds));
                }
                break;
            }

            if small_step {
                debug!(iter, sse, "rayleigh fit converged (no further progress)");
                return Ok(finish(p, sse, n, iter, bounds));
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(AppError::FitConvergence(format!(
                    "Unable to reduce the residual further (damping exceeded {LAMBDA_MAX:e})."
                )));
            }
        }
    }

    Err(AppError::FitConvergence(format!(
        "Optimal parameters not found: number of iterations exceeded maximum ({}).",
        config.max_iterations
    )))
}

fn jacobian_and_residuals(x: &[f64], y: &[f64], p: [f64; N_PARAMS]) -> (DMatrix<f64>, DVector<f64>) {
    let n = x.len();
    let mut jac = DMatrix::<f64>::zeros(n, N_PARAMS);
    let mut r = DVector::<f64>::zeros(n);
    for i in 0..n {
        let (d_sigma, d_scale) = gradient(x[i], p[0], p[1]);
        jac[(i, 0)] = d_sigma;
        jac[(i, 1)] = d_scale;
        r[i] = predict(x[i], p[0], p[1]) - y[i];
    }
    (jac, r)
}

fn sum_squared_residuals(x: &[f64], y: &[f64], sigma: f64, scale: f64) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&t, &yi)| {
            let r = predict(t, sigma, scale) - yi;
            r * r
        })
        .sum()
}

fn finish(p: [f64; N_PARAMS], sse: f64, n: usize, iterations: usize, bounds: &FitBounds) -> RayleighFit {
    let [sigma, scale] = p;
    RayleighFit {
        sigma,
        scale,
        sse,
        rmse: (sse / n.max(1) as f64).sqrt(),
        iterations,
        active_bounds: ActiveBounds {
            sigma: sigma <= bounds.sigma_min || sigma >= bounds.sigma_max,
            scale: scale <= bounds.scale_min || scale >= bounds.scale_max,
        },
    }
}
