// ─────────────────────────────────────────────────────────────────────
// NumLab — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Default evaluation point for the convergence study (π/4).
pub const DEFAULT_X0: f64 = std::f64::consts::FRAC_PI_4;

/// Smallest step exponent: h_min = 10^-10.
pub const DEFAULT_MIN_EXPONENT: f64 = -10.0;

/// Largest step exponent: h_max = 10^-1.
pub const DEFAULT_MAX_EXPONENT: f64 = -1.0;

/// Number of logarithmically spaced steps.
pub const DEFAULT_STEP_COUNT: usize = 11;

/// Relative tolerance of `allclose`, same default as numpy.
pub const ALLCLOSE_RTOL: f64 = 1e-5;

/// Absolute tolerance of `allclose`, same default as numpy.
pub const ALLCLOSE_ATOL: f64 = 1e-8;

/// Pivots with magnitude at or below this are treated as zero.
pub const PIVOT_EPS: f64 = 1e-300;
