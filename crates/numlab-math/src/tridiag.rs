// ─────────────────────────────────────────────────────────────────────
// NumLab — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm for tridiagonal systems.
//!
//! Fast path of the sparse direct solver when the matrix bandwidth is one.

use numlab_types::constants::PIVOT_EPS;
use numlab_types::error::{NumLabError, NumLabResult};

/// Solve tridiagonal system Ax = d using the Thomas algorithm.
///
/// - `a`: sub-diagonal \[n\] (a\[0\] unused)
/// - `b`: main diagonal \[n\]
/// - `c`: super-diagonal \[n\] (c\[n-1\] unused)
/// - `d`: right-hand side \[n\]
///
/// No pivoting: stable for diagonally dominant systems. A vanishing pivot
/// returns `SingularMatrix` with the offending row.
pub fn thomas_solve(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> NumLabResult<Vec<f64>> {
    let n = d.len();
    if n == 0 {
        return Err(NumLabError::LinAlg("system size must be > 0".to_string()));
    }
    for len in [a.len(), b.len(), c.len()] {
        if len != n {
            return Err(NumLabError::DimensionMismatch {
                expected: n,
                found: len,
            });
        }
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    if b[0].abs() <= PIVOT_EPS {
        return Err(NumLabError::SingularMatrix { column: 0 });
    }
    c_prime[0] = c[0] / b[0];
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let den = b[i] - a[i] * c_prime[i - 1];
        if den.abs() <= PIVOT_EPS {
            return Err(NumLabError::SingularMatrix { column: i });
        }
        if i < n - 1 {
            c_prime[i] = c[i] / den;
        }
        d_prime[i] = (d[i] - a[i] * d_prime[i - 1]) / den;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(x)
}
