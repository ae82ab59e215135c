// ─────────────────────────────────────────────────────────────────────
// NumLab — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;
use serde::Serialize;

use crate::error::{NumLabError, NumLabResult};

/// Logarithmically spaced finite-difference step sizes.
/// Matches numpy: `np.logspace(min_exponent, max_exponent, count)`.
///
/// Immutable once built; every derived sequence (estimates, errors) is
/// index-aligned with `steps()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSizeSeries {
    steps: Array1<f64>,
}

impl StepSizeSeries {
    /// Build `count` steps `10^e` with `e` linearly spaced over
    /// `[min_exponent, max_exponent]`, both ends included. A reversed
    /// exponent range yields a decreasing series.
    pub fn logspace(min_exponent: f64, max_exponent: f64, count: usize) -> NumLabResult<Self> {
        if count == 0 {
            return Err(NumLabError::ConfigError(
                "step series needs at least one step".to_string(),
            ));
        }
        if !min_exponent.is_finite() || !max_exponent.is_finite() {
            return Err(NumLabError::ConfigError(format!(
                "step exponents must be finite, got [{min_exponent}, {max_exponent}]"
            )));
        }
        let steps = Array1::logspace(10.0, min_exponent, max_exponent, count);
        Ok(StepSizeSeries { steps })
    }

    /// Wrap explicit step sizes. Steps must be finite and > 0.
    pub fn from_steps(steps: Vec<f64>) -> NumLabResult<Self> {
        if steps.is_empty() {
            return Err(NumLabError::ConfigError(
                "step series needs at least one step".to_string(),
            ));
        }
        if let Some(bad) = steps.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(NumLabError::ConfigError(format!(
                "step sizes must be finite and > 0, got {bad}"
            )));
        }
        Ok(StepSizeSeries {
            steps: Array1::from(steps),
        })
    }

    pub fn steps(&self) -> &Array1<f64> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of inverting a random dense matrix.
#[derive(Debug, Clone, Serialize)]
pub struct DenseSolveReport {
    pub size: usize,
    /// Whether `M · M⁻¹` passed `allclose` against the identity.
    pub allclose: bool,
    /// max |M · M⁻¹ − I| over all entries.
    pub max_deviation: f64,
    pub elapsed_ms: f64,
}

/// Outcome of a sparse direct solve.
#[derive(Debug, Clone, Serialize)]
pub struct SparseSolveReport {
    pub size: usize,
    pub nnz: usize,
    /// Whether the Thomas fast path was taken.
    pub tridiagonal: bool,
    /// ‖A x − b‖₂
    pub residual_norm: f64,
    /// ‖A x − b‖₂ / ‖b‖₂
    pub relative_residual: f64,
    pub elapsed_ms: f64,
}
