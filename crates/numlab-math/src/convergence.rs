// ─────────────────────────────────────────────────────────────────────
// NumLab — Convergence Study
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Finite-difference convergence study over a logarithmic step range.
//!
//! Evaluates the central, forward and backward stencils at a fixed point
//! and measures their relative error against the analytical derivative.
//! Plotted on log-log axes the errors trace the familiar U: truncation
//! error falls as h^p until cancellation takes over and the error climbs
//! again at small h.

use ndarray::Array1;
use serde::Serialize;
use tracing::debug;

use numlab_types::config::ConvergenceConfig;
use numlab_types::error::NumLabResult;
use numlab_types::state::StepSizeSeries;

use crate::finite_diff::{relative_error, Scheme};

/// Estimates and errors of one stencil, index-aligned with the steps.
#[derive(Debug, Clone, Serialize)]
pub struct SchemeResult {
    pub scheme: Scheme,
    pub estimate: Array1<f64>,
    pub error: Array1<f64>,
}

/// One full convergence study.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceStudy {
    pub x0: f64,
    /// f'(x0) from the analytical derivative.
    pub analytical: f64,
    pub steps: StepSizeSeries,
    pub central: SchemeResult,
    pub forward: SchemeResult,
    pub backward: SchemeResult,
}

impl ConvergenceStudy {
    /// Run all three stencils of `f` at `x0` over `steps`, comparing
    /// against `df(x0)`.
    pub fn evaluate<F, D>(f: F, df: D, x0: f64, steps: StepSizeSeries) -> Self
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let analytical = df(x0);
        let run = |scheme: Scheme| {
            let estimate = scheme.estimate(&f, x0, steps.steps());
            let error = relative_error(analytical, &estimate);
            SchemeResult {
                scheme,
                estimate,
                error,
            }
        };
        let central = run(Scheme::Central);
        let forward = run(Scheme::Forward);
        let backward = run(Scheme::Backward);

        debug!(x0, analytical, n_steps = steps.len(), "convergence study evaluated");

        ConvergenceStudy {
            x0,
            analytical,
            steps,
            central,
            forward,
            backward,
        }
    }

    /// Build the step series and test function from config, then evaluate.
    pub fn from_config(cfg: &ConvergenceConfig) -> NumLabResult<Self> {
        cfg.validate()?;
        let steps = StepSizeSeries::logspace(cfg.min_exponent, cfg.max_exponent, cfg.count)?;
        let func = cfg.function;
        Ok(Self::evaluate(
            |x| func.value(x),
            |x| func.derivative(x),
            cfg.x0,
            steps,
        ))
    }

    pub fn result(&self, scheme: Scheme) -> &SchemeResult {
        match scheme {
            Scheme::Central => &self.central,
            Scheme::Forward => &self.forward,
            Scheme::Backward => &self.backward,
        }
    }

    /// Indices of steps large enough that truncation error dominates.
    pub fn truncation_range(&self, scheme: Scheme) -> Vec<usize> {
        let threshold = scheme.truncation_threshold() * self.x0.abs().max(1.0);
        self.steps
            .steps()
            .iter()
            .enumerate()
            .filter(|&(_, &h)| h >= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Log-log slope of the error over the truncation range.
    /// ≈ 2 for central, ≈ 1 for forward/backward.
    pub fn observed_order(&self, scheme: Scheme) -> Option<f64> {
        let idx = self.truncation_range(scheme);
        let result = self.result(scheme);
        let h: Vec<f64> = idx.iter().map(|&i| self.steps.steps()[i]).collect();
        let e: Vec<f64> = idx.iter().map(|&i| result.error[i]).collect();
        observed_order(&h, &e)
    }

    /// Step with the smallest finite error, and that error. Bottom of the U.
    pub fn optimal_step(&self, scheme: Scheme) -> Option<(f64, f64)> {
        self.steps
            .steps()
            .iter()
            .zip(self.result(scheme).error.iter())
            .filter(|&(_, e)| e.is_finite())
            .map(|(&h, &e)| (h, e))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Guide line h^order, scaled so its last point meets the central error
    /// at the last step.
    pub fn reference_curve(&self, order: i32) -> Array1<f64> {
        let h = self.steps.steps();
        let n = h.len();
        let anchor = self.central.error[n - 1];
        let last = h[n - 1].powi(order);
        h.mapv(|v| v.powi(order) / last * anchor)
    }
}

/// Least-squares slope of log10(error) against log10(h).
///
/// Points with non-finite or non-positive error are skipped. Returns `None`
/// when fewer than two usable points remain or all steps coincide.
pub fn observed_order(steps: &[f64], errors: &[f64]) -> Option<f64> {
    let pts: Vec<(f64, f64)> = steps
        .iter()
        .zip(errors.iter())
        .filter(|&(&h, &e)| h > 0.0 && e > 0.0 && e.is_finite() && h.is_finite())
        .map(|(&h, &e)| (h.log10(), e.log10()))
        .collect();
    if pts.len() < 2 {
        return None;
    }

    let n = pts.len() as f64;
    let mean_x = pts.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pts.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = pts.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx <= 0.0 {
        return None;
    }
    let sxy: f64 = pts.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    Some(sxy / sxx)
}
