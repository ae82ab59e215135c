// ─────────────────────────────────────────────────────────────────────
// NumLab — Sparse
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Compressed-sparse-row matrices and a direct sparse solver.
//!
//! The general path is Gaussian elimination with partial pivoting on
//! ordered row maps, so fill-in is stored only where it appears.
//! Tridiagonal matrices skip elimination and go through the Thomas solver.

use std::collections::BTreeMap;
use std::time::Instant;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use numlab_types::config::SparseConfig;
use numlab_types::constants::PIVOT_EPS;
use numlab_types::error::{NumLabError, NumLabResult};
use numlab_types::state::SparseSolveReport;

use crate::tridiag::thomas_solve;

/// Sparse matrix in CSR layout. Column indices are sorted within each row
/// and unique.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Assemble from (row, col, value) triplets. Duplicate positions are
    /// summed, matching scipy's COO → CSR conversion.
    pub fn from_triplets(
        n_rows: usize,
        n_cols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> NumLabResult<Self> {
        let mut rows: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n_rows];
        for &(r, c, v) in triplets {
            if r >= n_rows || c >= n_cols {
                return Err(NumLabError::LinAlg(format!(
                    "triplet ({r}, {c}) outside {n_rows}x{n_cols} matrix"
                )));
            }
            *rows[r].entry(c).or_insert(0.0) += v;
        }
        Ok(Self::from_rows(n_rows, n_cols, &rows))
    }

    fn from_rows(n_rows: usize, n_cols: usize, rows: &[BTreeMap<usize, f64>]) -> Self {
        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for row in rows {
            for (&c, &v) in row {
                indices.push(c);
                data.push(v);
            }
            indptr.push(indices.len());
        }
        CsrMatrix {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let span = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[span.clone()], &self.data[span])
    }

    /// Entry (i, j), zero when not stored or out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= self.n_rows {
            return 0.0;
        }
        let (cols, vals) = self.row(i);
        match cols.binary_search(&j) {
            Ok(k) => vals[k],
            Err(_) => 0.0,
        }
    }

    pub fn diagonal(&self) -> Array1<f64> {
        let n = self.n_rows.min(self.n_cols);
        Array1::from_shape_fn(n, |i| self.get(i, i))
    }

    pub fn matvec(&self, x: &Array1<f64>) -> NumLabResult<Array1<f64>> {
        if x.len() != self.n_cols {
            return Err(NumLabError::DimensionMismatch {
                expected: self.n_cols,
                found: x.len(),
            });
        }
        Ok(Array1::from_shape_fn(self.n_rows, |i| {
            let (cols, vals) = self.row(i);
            cols.iter().zip(vals).map(|(&c, &v)| v * x[c]).sum()
        }))
    }

    /// True when every stored entry satisfies |i − j| ≤ 1.
    pub fn is_tridiagonal(&self) -> bool {
        (0..self.n_rows).all(|i| {
            let (cols, _) = self.row(i);
            cols.iter().all(|&c| c.abs_diff(i) <= 1)
        })
    }

    fn tridiagonal_bands(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let n = self.n_rows;
        let sub = (0..n).map(|i| if i > 0 { self.get(i, i - 1) } else { 0.0 }).collect();
        let main = (0..n).map(|i| self.get(i, i)).collect();
        let sup = (0..n)
            .map(|i| if i + 1 < n { self.get(i, i + 1) } else { 0.0 })
            .collect();
        (sub, main, sup)
    }
}

/// Random system with `density·n·(n−1)` off-diagonal entries uniform in
/// [0, 1) and the diagonal set to row-abs-sum + 1. Strict diagonal
/// dominance guarantees a nonsingular matrix. The right-hand side is
/// uniform in [0, 1).
pub fn random_sparse_system<R: Rng>(
    n: usize,
    density: f64,
    rng: &mut R,
) -> NumLabResult<(CsrMatrix, Array1<f64>)> {
    if n == 0 {
        return Err(NumLabError::LinAlg("system size must be > 0".to_string()));
    }
    let off_diag = (n * (n - 1)) as f64;
    let target = (density.clamp(0.0, 1.0) * off_diag).round() as usize;

    let mut triplets = Vec::with_capacity(target + n);
    let mut row_abs = vec![0.0; n];
    for _ in 0..target {
        let r = rng.gen_range(0..n);
        let mut c = rng.gen_range(0..n);
        if c == r {
            c = (c + 1) % n;
        }
        if c == r {
            continue;
        }
        let v: f64 = rng.gen();
        row_abs[r] += v;
        triplets.push((r, c, v));
    }
    for (i, s) in row_abs.iter().enumerate() {
        triplets.push((i, i, s + 1.0));
    }

    let a = CsrMatrix::from_triplets(n, n, &triplets)?;
    let b = Array1::from_shape_fn(n, |_| rng.gen::<f64>());
    Ok((a, b))
}

/// Direct solve of A x = b.
pub fn sparse_solve(a: &CsrMatrix, b: &Array1<f64>) -> NumLabResult<Array1<f64>> {
    let (n, m) = a.shape();
    if n != m {
        return Err(NumLabError::DimensionMismatch {
            expected: n,
            found: m,
        });
    }
    if b.len() != n {
        return Err(NumLabError::DimensionMismatch {
            expected: n,
            found: b.len(),
        });
    }
    if n == 0 {
        return Err(NumLabError::LinAlg("system size must be > 0".to_string()));
    }

    if a.is_tridiagonal() {
        let (sub, main, sup) = a.tridiagonal_bands();
        let rhs = b.to_vec();
        return thomas_solve(&sub, &main, &sup, &rhs).map(Array1::from);
    }

    let mut rows: Vec<BTreeMap<usize, f64>> = (0..n)
        .map(|i| {
            let (cols, vals) = a.row(i);
            cols.iter().copied().zip(vals.iter().copied()).collect()
        })
        .collect();
    let mut rhs = b.to_vec();
    let mut fill = 0usize;

    for k in 0..n {
        let mut pivot_row = k;
        let mut max = 0.0_f64;
        for (i, row) in rows.iter().enumerate().skip(k) {
            if let Some(&v) = row.get(&k) {
                if v.abs() > max {
                    max = v.abs();
                    pivot_row = i;
                }
            }
        }
        if max <= PIVOT_EPS || !max.is_finite() {
            return Err(NumLabError::SingularMatrix { column: k });
        }
        rows.swap(k, pivot_row);
        rhs.swap(k, pivot_row);

        let pivot = rows[k][&k];
        let upper: Vec<(usize, f64)> = rows[k].range(k + 1..).map(|(&c, &v)| (c, v)).collect();
        let (_, tail) = rows.split_at_mut(k + 1);
        let rhs_k = rhs[k];
        for (off, row) in tail.iter_mut().enumerate() {
            let Some(v) = row.remove(&k) else {
                continue;
            };
            let factor = v / pivot;
            for &(c, u) in &upper {
                let entry = row.entry(c).or_insert_with(|| {
                    fill += 1;
                    0.0
                });
                *entry -= factor * u;
            }
            rhs[k + 1 + off] -= factor * rhs_k;
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = rhs[i];
        for (&c, &v) in rows[i].range(i + 1..) {
            sum -= v * x[c];
        }
        x[i] = sum / rows[i][&i];
    }

    debug!(n, fill_in = fill, "sparse elimination finished");
    Ok(Array1::from(x))
}

fn norm2(v: &Array1<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Build a seeded random sparse system, solve it directly and report the
/// residual.
pub fn run_sparse_solve(cfg: &SparseConfig) -> NumLabResult<SparseSolveReport> {
    cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let (a, b) = random_sparse_system(cfg.size, cfg.density, &mut rng)?;
    debug!(n = cfg.size, nnz = a.nnz(), "random sparse system generated");

    let t0 = Instant::now();
    let x = sparse_solve(&a, &b)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let residual = &a.matvec(&x)? - &b;
    let residual_norm = norm2(&residual);
    let b_norm = norm2(&b);
    let relative_residual = if b_norm > 0.0 {
        residual_norm / b_norm
    } else {
        residual_norm
    };

    info!(
        n = cfg.size,
        nnz = a.nnz(),
        relative_residual,
        elapsed_ms,
        "sparse direct solve finished"
    );

    Ok(SparseSolveReport {
        size: cfg.size,
        nnz: a.nnz(),
        tridiagonal: a.is_tridiagonal(),
        residual_norm,
        relative_residual,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laplacian_1d(n: usize) -> CsrMatrix {
        let mut t = Vec::new();
        for i in 0..n {
            t.push((i, i, 2.0));
            if i > 0 {
                t.push((i, i - 1, -1.0));
            }
            if i + 1 < n {
                t.push((i, i + 1, -1.0));
            }
        }
        CsrMatrix::from_triplets(n, n, &t).unwrap()
    }

    #[test]
    fn test_from_triplets_sums_duplicates() {
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 1, 1.5), (0, 1, 2.0), (1, 0, -1.0)]).unwrap();
        assert_eq!(a.nnz(), 2);
        assert_eq!(a.get(0, 1), 3.5);
        assert_eq!(a.get(1, 0), -1.0);
        assert_eq!(a.get(0, 0), 0.0);
        assert_eq!(a.get(5, 5), 0.0);
    }

    #[test]
    fn test_from_triplets_out_of_range() {
        assert!(CsrMatrix::from_triplets(2, 2, &[(2, 0, 1.0)]).is_err());
        assert!(CsrMatrix::from_triplets(2, 2, &[(0, 3, 1.0)]).is_err());
    }

    #[test]
    fn test_matvec_and_diagonal() {
        let a = laplacian_1d(4);
        let x = Array1::from(vec![1.0, 1.0, 1.0, 1.0]);
        let y = a.matvec(&x).unwrap();
        assert_eq!(y.to_vec(), vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(a.diagonal().to_vec(), vec![2.0; 4]);
        assert!(a.matvec(&Array1::zeros(3)).is_err());
    }

    #[test]
    fn test_tridiagonal_fast_path() {
        let a = laplacian_1d(50);
        assert!(a.is_tridiagonal());
        let b = Array1::from_elem(50, 1.0);
        let x = sparse_solve(&a, &b).unwrap();
        let r = &a.matvec(&x).unwrap() - &b;
        assert!(norm2(&r) < 1e-9, "residual {}", norm2(&r));
    }

    #[test]
    fn test_general_path_with_pivoting() {
        // Zero leading diagonal forces a row swap
        let a = CsrMatrix::from_triplets(
            3,
            3,
            &[(0, 2, 1.0), (1, 0, 2.0), (1, 1, 1.0), (2, 1, 3.0), (2, 0, 1.0)],
        )
        .unwrap();
        assert!(!a.is_tridiagonal());
        let x_true = Array1::from(vec![1.0, -2.0, 0.5]);
        let b = a.matvec(&x_true).unwrap();
        let x = sparse_solve(&a, &b).unwrap();
        for i in 0..3 {
            assert!((x[i] - x_true[i]).abs() < 1e-12, "x[{i}] = {}", x[i]);
        }
    }

    #[test]
    fn test_singular_sparse() {
        // Column 1 is empty
        let a = CsrMatrix::from_triplets(3, 3, &[(0, 0, 1.0), (1, 2, 1.0), (2, 0, 1.0), (2, 2, 4.0)])
            .unwrap();
        let b = Array1::from_elem(3, 1.0);
        match sparse_solve(&a, &b) {
            Err(NumLabError::SingularMatrix { column }) => assert_eq!(column, 1),
            other => panic!("expected SingularMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_dimension_checks() {
        let rect = CsrMatrix::from_triplets(2, 3, &[(0, 0, 1.0)]).unwrap();
        assert!(matches!(
            sparse_solve(&rect, &Array1::zeros(2)),
            Err(NumLabError::DimensionMismatch { .. })
        ));
        let sq = laplacian_1d(3);
        assert!(matches!(
            sparse_solve(&sq, &Array1::zeros(4)),
            Err(NumLabError::DimensionMismatch { expected: 3, found: 4 })
        ));
    }

    #[test]
    fn test_random_system_diagonally_dominant() {
        let mut rng = StdRng::seed_from_u64(11);
        let (a, b) = random_sparse_system(200, 0.02, &mut rng).unwrap();
        assert_eq!(b.len(), 200);
        for i in 0..200 {
            let (cols, vals) = a.row(i);
            let off: f64 = cols
                .iter()
                .zip(vals)
                .filter(|&(&c, _)| c != i)
                .map(|(_, v)| v.abs())
                .sum();
            assert!(a.get(i, i) > off, "row {i} not dominant");
        }
    }

    #[test]
    fn test_run_sparse_solve_small() {
        let cfg = SparseConfig {
            size: 300,
            density: 0.01,
            seed: 5,
        };
        let report = run_sparse_solve(&cfg).unwrap();
        assert_eq!(report.size, 300);
        assert!(report.nnz >= 300);
        assert!(!report.tridiagonal);
        assert!(report.relative_residual < 1e-10, "{}", report.relative_residual);
    }

    #[test]
    fn test_zero_density_is_diagonal() {
        let cfg = SparseConfig {
            size: 20,
            density: 0.0,
            seed: 1,
        };
        let report = run_sparse_solve(&cfg).unwrap();
        assert_eq!(report.nnz, 20);
        assert!(report.tridiagonal);
        assert!(report.relative_residual < 1e-14);
    }
}
