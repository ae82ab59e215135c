// ─────────────────────────────────────────────────────────────────────
// NumLab — Finite Differences
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! First-derivative finite-difference estimators.
//!
//! Every estimator is applied elementwise over a step array and returns an
//! array of the same length, index-aligned with the steps. Degenerate input
//! (h = 0, vanishing analytical derivative) is not trapped: the IEEE result
//! (±inf or NaN) flows through to the caller.

use ndarray::Array1;
use serde::Serialize;

/// Central difference: (f(x0+h) − f(x0−h)) / (2h). Second-order accurate.
pub fn central_difference<F>(f: F, x0: f64, h: &Array1<f64>) -> Array1<f64>
where
    F: Fn(f64) -> f64,
{
    h.mapv(|h| (f(x0 + h) - f(x0 - h)) / (2.0 * h))
}

/// Forward difference: (f(x0+h) − f(x0)) / h. First-order accurate.
pub fn forward_difference<F>(f: F, x0: f64, h: &Array1<f64>) -> Array1<f64>
where
    F: Fn(f64) -> f64,
{
    let f0 = f(x0);
    h.mapv(|h| (f(x0 + h) - f0) / h)
}

/// Backward difference: (f(x0) − f(x0−h)) / h. First-order accurate.
pub fn backward_difference<F>(f: F, x0: f64, h: &Array1<f64>) -> Array1<f64>
where
    F: Fn(f64) -> f64,
{
    let f0 = f(x0);
    h.mapv(|h| (f0 - f(x0 - h)) / h)
}

/// Elementwise relative error |analytical − numerical| / |analytical|.
///
/// `analytical` is broadcast against every estimate. A zero analytical
/// value gives +inf (or NaN where the estimate is also zero).
pub fn relative_error(analytical: f64, numerical: &Array1<f64>) -> Array1<f64> {
    let scale = analytical.abs();
    numerical.mapv(|n| (analytical - n).abs() / scale)
}

/// Finite-difference stencil selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Central,
    Forward,
    Backward,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Central, Scheme::Forward, Scheme::Backward];

    /// Power of h in the leading truncation-error term.
    pub fn nominal_order(self) -> u32 {
        match self {
            Scheme::Central => 2,
            Scheme::Forward | Scheme::Backward => 1,
        }
    }

    pub fn estimate<F>(self, f: F, x0: f64, h: &Array1<f64>) -> Array1<f64>
    where
        F: Fn(f64) -> f64,
    {
        match self {
            Scheme::Central => central_difference(f, x0, h),
            Scheme::Forward => forward_difference(f, x0, h),
            Scheme::Backward => backward_difference(f, x0, h),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scheme::Central => "central FD",
            Scheme::Forward => "forward FD",
            Scheme::Backward => "backward FD",
        }
    }

    /// Smallest step at which truncation still dominates round-off:
    /// 10 · ε^(1/(p+1)). The error minimum of an order-p stencil sits
    /// near ε^(1/(p+1)).
    pub fn truncation_threshold(self) -> f64 {
        let p = self.nominal_order() as f64;
        10.0 * f64::EPSILON.powf(1.0 / (p + 1.0))
    }
}
