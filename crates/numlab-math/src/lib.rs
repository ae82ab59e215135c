//! Numerical kernels for NumLab: finite differences, convergence studies
//! and direct linear solvers.

pub mod convergence;
pub mod finite_diff;
pub mod linalg;
pub mod sparse;
pub mod tridiag;
