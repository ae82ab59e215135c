// ─────────────────────────────────────────────────────────────────────
// NumLab — D2Q9 Lattice
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! D2Q9 velocity set, equilibrium distribution and moments.

/// Number of discrete velocities.
pub const Q: usize = 9;

/// Populations of a single node.
pub type Populations = [f64; Q];

/// Lattice weights: rest, axis-aligned, diagonal.
pub const WEIGHTS: [f64; Q] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

/// Lattice velocities (cx, cy).
pub const VELOCITIES: [(i64, i64); Q] = [
    (0, 0),
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// Index of the velocity pointing the other way.
pub const OPPOSITE: [usize; Q] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

/// Second-order equilibrium for direction `i`.
/// `u_sqr` is ux² + uy², passed in so callers compute it once per node.
#[inline]
pub fn equilibrium(i: usize, rho: f64, ux: f64, uy: f64, u_sqr: f64) -> f64 {
    let (cx, cy) = VELOCITIES[i];
    let cu = cx as f64 * ux + cy as f64 * uy;
    rho * WEIGHTS[i] * (1.0 + 3.0 * cu + 4.5 * cu * cu - 1.5 * u_sqr)
}

/// All nine equilibrium populations.
pub fn equilibrium_populations(rho: f64, ux: f64, uy: f64) -> Populations {
    let u_sqr = ux * ux + uy * uy;
    let mut f = [0.0; Q];
    for (i, fi) in f.iter_mut().enumerate() {
        *fi = equilibrium(i, rho, ux, uy, u_sqr);
    }
    f
}

/// Density and velocity (rho, ux, uy) of a node.
#[inline]
pub fn macroscopic(f: &Populations) -> (f64, f64, f64) {
    let rho: f64 = f.iter().sum();
    let ux = (f[1] + f[5] + f[8] - f[3] - f[6] - f[7]) / rho;
    let uy = (f[2] + f[5] + f[6] - f[4] - f[7] - f[8]) / rho;
    (rho, ux, uy)
}
