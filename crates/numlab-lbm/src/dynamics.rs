// ─────────────────────────────────────────────────────────────────────
// NumLab — Node Dynamics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Local collision rules attached to lattice nodes.
//!
//! Boundary dynamics first reconstruct the populations that streaming
//! could not supply, then relax the completed node with BGK. Two closures
//! are available: Zou/He, which corrects the unknowns in place, and the
//! regularized closure, which rebuilds every population from the
//! equilibrium plus the non-equilibrium stress. The regularized form stays
//! stable at relaxation parameters close to 2 where Zou/He does not.

use crate::lattice::{
    equilibrium, equilibrium_populations, macroscopic, Populations, OPPOSITE, Q, VELOCITIES,
    WEIGHTS,
};

/// Domain edge a boundary node sits on. Unknown populations are the ones
/// pointing into the fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// x = 0, unknowns 1, 5, 8.
    Left,
    /// x = lx − 1, unknowns 3, 6, 7.
    Right,
    /// y = 0, unknowns 2, 5, 6.
    Lower,
    /// y = ly − 1, unknowns 4, 7, 8.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dynamics {
    /// Single-relaxation-time collision.
    Bgk { omega: f64 },
    /// Full-way bounce-back: every population reverses direction.
    BounceBack,
    /// Prescribed velocity.
    VelocityZouHe {
        side: Side,
        ux: f64,
        uy: f64,
        omega: f64,
    },
    /// Prescribed density; `u_par` is the velocity tangential to the edge.
    PressureZouHe {
        side: Side,
        rho: f64,
        u_par: f64,
        omega: f64,
    },
    VelocityRegularized {
        side: Side,
        ux: f64,
        uy: f64,
        omega: f64,
    },
    PressureRegularized {
        side: Side,
        rho: f64,
        u_par: f64,
        omega: f64,
    },
}

impl Dynamics {
    /// Apply the collision in place.
    pub fn apply(&self, f: &mut Populations) {
        match *self {
            Dynamics::Bgk { omega } => bgk(f, omega),
            Dynamics::BounceBack => bounce_back(f),
            Dynamics::VelocityZouHe {
                side,
                ux,
                uy,
                omega,
            } => {
                let rho = velocity_boundary_density(side, f, ux, uy);
                complete_unknowns(side, f, rho, ux, uy);
                bgk(f, omega);
            }
            Dynamics::PressureZouHe {
                side,
                rho,
                u_par,
                omega,
            } => {
                let (ux, uy) = pressure_boundary_velocity(side, f, rho, u_par);
                complete_unknowns(side, f, rho, ux, uy);
                bgk(f, omega);
            }
            Dynamics::VelocityRegularized {
                side,
                ux,
                uy,
                omega,
            } => {
                let rho = velocity_boundary_density(side, f, ux, uy);
                regularize(side, f, rho, ux, uy);
                bgk(f, omega);
            }
            Dynamics::PressureRegularized {
                side,
                rho,
                u_par,
                omega,
            } => {
                let (ux, uy) = pressure_boundary_velocity(side, f, rho, u_par);
                regularize(side, f, rho, ux, uy);
                bgk(f, omega);
            }
        }
    }

    /// Relaxation parameter, or `None` for bounce-back.
    pub fn omega(&self) -> Option<f64> {
        match *self {
            Dynamics::Bgk { omega }
            | Dynamics::VelocityZouHe { omega, .. }
            | Dynamics::PressureZouHe { omega, .. }
            | Dynamics::VelocityRegularized { omega, .. }
            | Dynamics::PressureRegularized { omega, .. } => Some(omega),
            Dynamics::BounceBack => None,
        }
    }
}

/// f ← f − ω (f − f_eq)
pub fn bgk(f: &mut Populations, omega: f64) {
    let (rho, ux, uy) = macroscopic(f);
    let u_sqr = ux * ux + uy * uy;
    for (i, fi) in f.iter_mut().enumerate() {
        *fi *= 1.0 - omega;
        *fi += omega * equilibrium(i, rho, ux, uy, u_sqr);
    }
}

pub fn bounce_back(f: &mut Populations) {
    let src = *f;
    for i in 0..Q {
        f[i] = src[OPPOSITE[i]];
    }
}

impl Side {
    /// Populations streamed in from outside the domain.
    pub fn unknowns(self) -> [usize; 3] {
        match self {
            Side::Left => [1, 5, 8],
            Side::Right => [3, 6, 7],
            Side::Lower => [2, 5, 6],
            Side::Upper => [4, 7, 8],
        }
    }
}

/// Sum of populations tangential to the edge plus twice the outgoing ones.
fn known_moment(side: Side, f: &Populations) -> f64 {
    match side {
        Side::Left => f[0] + f[2] + f[4] + 2.0 * (f[3] + f[6] + f[7]),
        Side::Right => f[0] + f[2] + f[4] + 2.0 * (f[1] + f[5] + f[8]),
        Side::Lower => f[0] + f[1] + f[3] + 2.0 * (f[4] + f[7] + f[8]),
        Side::Upper => f[0] + f[1] + f[3] + 2.0 * (f[2] + f[5] + f[6]),
    }
}

fn velocity_boundary_density(side: Side, f: &Populations, ux: f64, uy: f64) -> f64 {
    let known = known_moment(side, f);
    match side {
        Side::Left => known / (1.0 - ux),
        Side::Right => known / (1.0 + ux),
        Side::Lower => known / (1.0 - uy),
        Side::Upper => known / (1.0 + uy),
    }
}

fn pressure_boundary_velocity(side: Side, f: &Populations, rho: f64, u_par: f64) -> (f64, f64) {
    let known = known_moment(side, f);
    match side {
        Side::Left => (1.0 - known / rho, u_par),
        Side::Right => (known / rho - 1.0, u_par),
        Side::Lower => (u_par, 1.0 - known / rho),
        Side::Upper => (u_par, known / rho - 1.0),
    }
}

/// Zou/He closure: non-equilibrium bounce-back for the normal population,
/// the diagonals corrected so the node carries exactly (rho, ux, uy).
fn complete_unknowns(side: Side, f: &mut Populations, rho: f64, ux: f64, uy: f64) {
    let (jx, jy) = (rho * ux, rho * uy);
    match side {
        Side::Left => {
            let d = 0.5 * (f[2] - f[4]);
            f[1] = f[3] + 2.0 / 3.0 * jx;
            f[5] = f[7] - d + 0.5 * jy + jx / 6.0;
            f[8] = f[6] + d - 0.5 * jy + jx / 6.0;
        }
        Side::Right => {
            let d = 0.5 * (f[2] - f[4]);
            f[3] = f[1] - 2.0 / 3.0 * jx;
            f[7] = f[5] + d - 0.5 * jy - jx / 6.0;
            f[6] = f[8] - d + 0.5 * jy - jx / 6.0;
        }
        Side::Lower => {
            let d = 0.5 * (f[1] - f[3]);
            f[2] = f[4] + 2.0 / 3.0 * jy;
            f[5] = f[7] - d + 0.5 * jx + jy / 6.0;
            f[6] = f[8] + d - 0.5 * jx + jy / 6.0;
        }
        Side::Upper => {
            let d = 0.5 * (f[1] - f[3]);
            f[4] = f[2] - 2.0 / 3.0 * jy;
            f[7] = f[5] + d - 0.5 * jx - jy / 6.0;
            f[8] = f[6] - d + 0.5 * jx - jy / 6.0;
        }
    }
}

/// Regularized closure: unknowns from non-equilibrium bounce-back, then
/// every population replaced by f_eq + w·Q:Π_neq / (2 c_s⁴).
fn regularize(side: Side, f: &mut Populations, rho: f64, ux: f64, uy: f64) {
    let feq = equilibrium_populations(rho, ux, uy);
    for i in side.unknowns() {
        let opp = OPPOSITE[i];
        f[i] = feq[i] + f[opp] - feq[opp];
    }

    let (mut pxx, mut pyy, mut pxy) = (0.0, 0.0, 0.0);
    for i in 0..Q {
        let neq = f[i] - feq[i];
        let (cx, cy) = (VELOCITIES[i].0 as f64, VELOCITIES[i].1 as f64);
        pxx += cx * cx * neq;
        pyy += cy * cy * neq;
        pxy += cx * cy * neq;
    }

    for i in 0..Q {
        let (cx, cy) = (VELOCITIES[i].0 as f64, VELOCITIES[i].1 as f64);
        let q = (cx * cx - 1.0 / 3.0) * pxx + (cy * cy - 1.0 / 3.0) * pyy + 2.0 * cx * cy * pxy;
        f[i] = feq[i] + 4.5 * WEIGHTS[i] * q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDES: [Side; 4] = [Side::Left, Side::Right, Side::Lower, Side::Upper];

    fn perturbed(rho: f64, ux: f64, uy: f64) -> Populations {
        let mut f = equilibrium_populations(rho, ux, uy);
        for (i, fi) in f.iter_mut().enumerate() {
            *fi += 1e-3 * ((i as f64) * 1.7).sin();
        }
        f
    }

    #[test]
    fn test_bgk_equilibrium_is_fixed_point() {
        let f0 = equilibrium_populations(1.1, 0.03, -0.01);
        for omega in [0.5, 1.0, 1.9] {
            let mut f = f0;
            bgk(&mut f, omega);
            for i in 0..Q {
                assert!((f[i] - f0[i]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_bgk_conserves_moments() {
        let mut f = perturbed(1.0, 0.02, 0.01);
        let before = macroscopic(&f);
        bgk(&mut f, 1.7);
        let after = macroscopic(&f);
        assert!((before.0 - after.0).abs() < 1e-14);
        assert!((before.1 - after.1).abs() < 1e-14);
        assert!((before.2 - after.2).abs() < 1e-14);
    }

    #[test]
    fn test_bgk_omega_one_lands_on_equilibrium() {
        let mut f = perturbed(1.0, 0.02, 0.01);
        let (rho, ux, uy) = macroscopic(&f);
        bgk(&mut f, 1.0);
        let eq = equilibrium_populations(rho, ux, uy);
        for i in 0..Q {
            assert!((f[i] - eq[i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_bounce_back_swaps_opposites() {
        let mut f: Populations = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        Dynamics::BounceBack.apply(&mut f);
        assert_eq!(f, [0.0, 3.0, 4.0, 1.0, 2.0, 7.0, 8.0, 5.0, 6.0]);
        Dynamics::BounceBack.apply(&mut f);
        assert_eq!(f, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_velocity_zou_he_imposes_velocity() {
        for side in SIDES {
            let mut f = perturbed(1.02, 0.01, -0.005);
            let (ux, uy) = (0.04, -0.01);
            Dynamics::VelocityZouHe {
                side,
                ux,
                uy,
                omega: 1.3,
            }
            .apply(&mut f);
            let (_, u, v) = macroscopic(&f);
            assert!((u - ux).abs() < 1e-13, "{side:?}: ux = {u}");
            assert!((v - uy).abs() < 1e-13, "{side:?}: uy = {v}");
        }
    }

    #[test]
    fn test_pressure_zou_he_imposes_density() {
        for side in SIDES {
            let mut f = perturbed(1.0, 0.02, 0.0);
            Dynamics::PressureZouHe {
                side,
                rho: 0.98,
                u_par: 0.0,
                omega: 1.3,
            }
            .apply(&mut f);
            let (rho, ux, uy) = macroscopic(&f);
            assert!((rho - 0.98).abs() < 1e-13, "{side:?}: rho = {rho}");
            let tangential = match side {
                Side::Left | Side::Right => uy,
                Side::Lower | Side::Upper => ux,
            };
            assert!(tangential.abs() < 1e-13, "{side:?}: u_par = {tangential}");
        }
    }

    #[test]
    fn test_zou_he_on_equilibrium_is_identity() {
        // Closing an equilibrium node with its own moments changes nothing
        let (rho, ux, uy) = (1.0, 0.03, 0.01);
        let f0 = equilibrium_populations(rho, ux, uy);
        for side in SIDES {
            let mut f = f0;
            Dynamics::VelocityZouHe {
                side,
                ux,
                uy,
                omega: 1.0,
            }
            .apply(&mut f);
            for i in 0..Q {
                assert!((f[i] - f0[i]).abs() < 1e-14, "{side:?} f[{i}]");
            }
        }
    }

    #[test]
    fn test_regularized_imposes_moments() {
        for side in SIDES {
            let mut f = perturbed(1.01, 0.0, 0.01);
            Dynamics::VelocityRegularized {
                side,
                ux: 0.03,
                uy: 0.0,
                omega: 1.95,
            }
            .apply(&mut f);
            let (_, ux, uy) = macroscopic(&f);
            assert!((ux - 0.03).abs() < 1e-13, "{side:?}: ux = {ux}");
            assert!(uy.abs() < 1e-13, "{side:?}: uy = {uy}");

            let mut f = perturbed(1.0, 0.02, 0.0);
            Dynamics::PressureRegularized {
                side,
                rho: 1.02,
                u_par: 0.0,
                omega: 1.95,
            }
            .apply(&mut f);
            let (rho, _, _) = macroscopic(&f);
            assert!((rho - 1.02).abs() < 1e-13, "{side:?}: rho = {rho}");
        }
    }

    #[test]
    fn test_regularized_keeps_equilibrium() {
        let (rho, ux, uy) = (1.0, 0.02, -0.01);
        let f0 = equilibrium_populations(rho, ux, uy);
        for side in SIDES {
            let mut f = f0;
            Dynamics::VelocityRegularized {
                side,
                ux,
                uy,
                omega: 1.5,
            }
            .apply(&mut f);
            for i in 0..Q {
                assert!((f[i] - f0[i]).abs() < 1e-14, "{side:?} f[{i}]");
            }
        }
    }

    #[test]
    fn test_unknowns_point_inward() {
        let inward = [
            (Side::Left, (1, 0)),
            (Side::Right, (-1, 0)),
            (Side::Lower, (0, 1)),
            (Side::Upper, (0, -1)),
        ];
        for (side, (nx, ny)) in inward {
            for i in side.unknowns() {
                let (cx, cy) = VELOCITIES[i];
                assert!(cx * nx + cy * ny > 0, "{side:?}: population {i}");
            }
        }
    }

    #[test]
    fn test_omega_accessor() {
        assert_eq!(Dynamics::Bgk { omega: 1.2 }.omega(), Some(1.2));
        assert_eq!(Dynamics::BounceBack.omega(), None);
    }
}
