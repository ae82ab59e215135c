//! Dense linear algebra.
//!
//! LU factorisation with partial pivoting, solves, explicit inversion and a
//! numpy-compatible `allclose`. Backs the random-matrix inversion demo.

use std::time::Instant;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use numlab_types::config::DenseConfig;
use numlab_types::constants::{ALLCLOSE_ATOL, ALLCLOSE_RTOL, PIVOT_EPS};
use numlab_types::error::{NumLabError, NumLabResult};
use numlab_types::state::DenseSolveReport;

/// Packed LU factors of a square matrix: P·A = L·U.
///
/// `lu` holds U on and above the diagonal and the unit-lower L below it.
/// `perm[i]` is the row of A that ended up in row i.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Array2<f64>,
    perm: Vec<usize>,
}

/// Doolittle LU with partial (row) pivoting.
pub fn lu_decompose(a: &Array2<f64>) -> NumLabResult<LuDecomposition> {
    let (n, m) = a.dim();
    if n != m {
        return Err(NumLabError::DimensionMismatch {
            expected: n,
            found: m,
        });
    }
    if n == 0 {
        return Err(NumLabError::LinAlg("cannot factor an empty matrix".to_string()));
    }

    let mut lu = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // Pivot: largest magnitude in column k at or below the diagonal
        let mut p = k;
        let mut max = lu[[k, k]].abs();
        for i in (k + 1)..n {
            let v = lu[[i, k]].abs();
            if v > max {
                max = v;
                p = i;
            }
        }
        if max <= PIVOT_EPS || !max.is_finite() {
            return Err(NumLabError::SingularMatrix { column: k });
        }
        if p != k {
            for j in 0..n {
                lu.swap([k, j], [p, j]);
            }
            perm.swap(k, p);
        }

        let pivot = lu[[k, k]];
        for i in (k + 1)..n {
            let factor = lu[[i, k]] / pivot;
            lu[[i, k]] = factor;
            if factor != 0.0 {
                for j in (k + 1)..n {
                    lu[[i, j]] -= factor * lu[[k, j]];
                }
            }
        }
    }

    Ok(LuDecomposition { lu, perm })
}

impl LuDecomposition {
    pub fn size(&self) -> usize {
        self.perm.len()
    }

    /// Solve A x = b by forward then back substitution.
    pub fn solve(&self, b: &Array1<f64>) -> NumLabResult<Array1<f64>> {
        let n = self.size();
        if b.len() != n {
            return Err(NumLabError::DimensionMismatch {
                expected: n,
                found: b.len(),
            });
        }

        // L y = P b
        let mut x: Array1<f64> = self.perm.iter().map(|&p| b[p]).collect();
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }
        // U x = y
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }
        Ok(x)
    }

    /// Explicit inverse, one unit column at a time.
    pub fn inverse(&self) -> NumLabResult<Array2<f64>> {
        let n = self.size();
        let mut inv = Array2::zeros((n, n));
        let mut e = Array1::zeros(n);
        for j in 0..n {
            e[j] = 1.0;
            let col = self.solve(&e)?;
            inv.column_mut(j).assign(&col);
            e[j] = 0.0;
        }
        Ok(inv)
    }

    /// det(A) = sign(P) · Π U_ii
    pub fn determinant(&self) -> f64 {
        let n = self.size();
        let mut det: f64 = (0..n).map(|i| self.lu[[i, i]]).product();
        // Parity of the permutation by cycle counting
        let mut visited = vec![false; n];
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut len = 0;
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                i = self.perm[i];
                len += 1;
            }
            if len % 2 == 0 {
                det = -det;
            }
        }
        det
    }
}

/// Inverse of a square matrix via LU.
pub fn invert(a: &Array2<f64>) -> NumLabResult<Array2<f64>> {
    lu_decompose(a)?.inverse()
}

/// numpy.allclose: |a − b| ≤ atol + rtol·|b| for every element.
/// Shapes must match exactly (no broadcasting); NaN never compares close.
pub fn allclose(a: &Array2<f64>, b: &Array2<f64>, rtol: f64, atol: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(&x, &y)| (x - y).abs() <= atol + rtol * y.abs())
}

/// Matrix with i.i.d. entries uniform in [0, 1). Matches `np.random.rand(n, n)`.
pub fn random_matrix<R: Rng>(n: usize, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |_| rng.gen::<f64>())
}

/// Invert a seeded random matrix and check M·M⁻¹ against the identity.
pub fn run_dense_inversion(cfg: &DenseConfig) -> NumLabResult<DenseSolveReport> {
    cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let m = random_matrix(cfg.size, &mut rng);
    debug!(n = cfg.size, seed = cfg.seed, "random dense matrix generated");

    let t0 = Instant::now();
    let m_inv = invert(&m)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let product = m.dot(&m_inv);
    let identity = Array2::eye(cfg.size);
    let ok = allclose(&product, &identity, ALLCLOSE_RTOL, ALLCLOSE_ATOL);
    let max_deviation = (&product - &identity)
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    info!(
        n = cfg.size,
        allclose = ok,
        max_deviation,
        elapsed_ms,
        "dense inversion finished"
    );

    Ok(DenseSolveReport {
        size: cfg.size,
        allclose: ok,
        max_deviation,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lu_solve_3x3() {
        let a = ndarray::array![[2.0, 1.0, 1.0], [4.0, -6.0, 0.0], [-2.0, 7.0, 2.0]];
        let b = ndarray::array![5.0, -2.0, 9.0];
        let x = lu_decompose(&a).unwrap().solve(&b).unwrap();
        let expected = [1.0, 1.0, 2.0];
        for i in 0..3 {
            assert!((x[i] - expected[i]).abs() < 1e-12, "x[{i}] = {}", x[i]);
        }
    }

    #[test]
    fn test_pivoting_handles_zero_leading_entry() {
        // Without row swaps the first pivot would be zero
        let a = ndarray::array![[0.0, 1.0], [1.0, 0.0]];
        let inv = invert(&a).unwrap();
        assert!(allclose(&inv, &a, 1e-12, 1e-14));
    }

    #[test]
    fn test_singular_detected() {
        let a = ndarray::array![[1.0, 2.0], [2.0, 4.0]];
        match lu_decompose(&a) {
            Err(NumLabError::SingularMatrix { column }) => assert_eq!(column, 1),
            other => panic!("expected SingularMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_non_square_rejected() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            lu_decompose(&a),
            Err(NumLabError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_determinant_with_permutation() {
        let a = ndarray::array![[0.0, 2.0], [3.0, 0.0]];
        let det = lu_decompose(&a).unwrap().determinant();
        assert!((det + 6.0).abs() < 1e-12, "det = {det}");
        let b = ndarray::array![[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]];
        assert!((lu_decompose(&b).unwrap().determinant() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_random_inverse_allclose() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = random_matrix(40, &mut rng);
        let inv = invert(&m).unwrap();
        let prod = m.dot(&inv);
        assert!(allclose(&prod, &Array2::eye(40), ALLCLOSE_RTOL, ALLCLOSE_ATOL));
    }

    #[test]
    fn test_allclose_semantics() {
        let a = ndarray::array![[1.0, 2.0]];
        let b = ndarray::array![[1.0 + 1e-9, 2.0]];
        assert!(allclose(&a, &b, ALLCLOSE_RTOL, ALLCLOSE_ATOL));
        let c = ndarray::array![[1.1, 2.0]];
        assert!(!allclose(&a, &c, ALLCLOSE_RTOL, ALLCLOSE_ATOL));
        let d = ndarray::array![[1.0], [2.0]];
        assert!(!allclose(&a, &d, ALLCLOSE_RTOL, ALLCLOSE_ATOL));
        let e = ndarray::array![[f64::NAN, 2.0]];
        assert!(!allclose(&e, &e, ALLCLOSE_RTOL, ALLCLOSE_ATOL));
    }

    #[test]
    fn test_random_matrix_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let m = random_matrix(16, &mut rng);
        assert!(m.iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_run_dense_inversion_small() {
        let report = run_dense_inversion(&DenseConfig { size: 30, seed: 3 }).unwrap();
        assert_eq!(report.size, 30);
        assert!(report.allclose, "max deviation {}", report.max_deviation);
        assert!(report.max_deviation < 1e-8);
    }
}
