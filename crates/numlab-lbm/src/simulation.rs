// ─────────────────────────────────────────────────────────────────────
// NumLab — Lattice Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Collide-and-stream engine on a periodic lx × ly grid.
//!
//! Populations live in an (lx, ly, 9) array. Streaming writes into a
//! second buffer of the same shape and the two are swapped afterwards.

use ndarray::{Array2, Array3};
use tracing::debug;

use numlab_types::error::{NumLabError, NumLabResult};

use crate::dynamics::Dynamics;
use crate::lattice::{equilibrium_populations, macroscopic, Populations, Q, VELOCITIES};

/// Smallest grid edge the engine accepts.
pub const MIN_EXTENT: usize = 3;

#[derive(Clone)]
pub struct Lattice {
    lx: usize,
    ly: usize,
    f: Array3<f64>,
    tmp: Array3<f64>,
    dynamics: Array2<Dynamics>,
}

impl Lattice {
    /// Fluid at rest with unit density, BGK everywhere.
    pub fn new(lx: usize, ly: usize, omega: f64) -> NumLabResult<Self> {
        if lx < MIN_EXTENT || ly < MIN_EXTENT {
            return Err(NumLabError::ConfigError(format!(
                "lattice must be at least {MIN_EXTENT}x{MIN_EXTENT}, got {lx}x{ly}"
            )));
        }
        if !(omega > 0.0 && omega < 2.0) {
            return Err(NumLabError::ConfigError(format!(
                "relaxation parameter omega must lie in (0, 2), got {omega}"
            )));
        }

        let rest = equilibrium_populations(1.0, 0.0, 0.0);
        let f = Array3::from_shape_fn((lx, ly, Q), |(_, _, i)| rest[i]);
        let tmp = Array3::zeros((lx, ly, Q));
        let dynamics = Array2::from_elem((lx, ly), Dynamics::Bgk { omega });
        debug!(lx, ly, omega, "lattice constructed");

        Ok(Lattice {
            lx,
            ly,
            f,
            tmp,
            dynamics,
        })
    }

    pub fn lx(&self) -> usize {
        self.lx
    }

    pub fn ly(&self) -> usize {
        self.ly
    }

    /// Raw populations, indexed [x, y, i].
    pub fn populations(&self) -> &Array3<f64> {
        &self.f
    }

    fn check_bounds(&self, x: usize, y: usize) -> NumLabResult<()> {
        if x >= self.lx || y >= self.ly {
            return Err(NumLabError::ConfigError(format!(
                "node ({x}, {y}) outside {}x{} lattice",
                self.lx, self.ly
            )));
        }
        Ok(())
    }

    pub fn set_dynamics(&mut self, x: usize, y: usize, dynamics: Dynamics) -> NumLabResult<()> {
        self.check_bounds(x, y)?;
        if let Some(omega) = dynamics.omega() {
            if !(omega > 0.0 && omega < 2.0) {
                return Err(NumLabError::ConfigError(format!(
                    "relaxation parameter omega must lie in (0, 2), got {omega}"
                )));
            }
        }
        self.dynamics[[x, y]] = dynamics;
        Ok(())
    }

    pub fn dynamics(&self, x: usize, y: usize) -> NumLabResult<Dynamics> {
        self.check_bounds(x, y)?;
        Ok(self.dynamics[[x, y]])
    }

    /// Reset a node to its equilibrium populations.
    pub fn init_equilibrium(&mut self, x: usize, y: usize, rho: f64, ux: f64, uy: f64) -> NumLabResult<()> {
        self.check_bounds(x, y)?;
        self.store(x, y, &equilibrium_populations(rho, ux, uy));
        Ok(())
    }

    #[inline]
    fn load(&self, x: usize, y: usize) -> Populations {
        let mut pop = [0.0; Q];
        for (i, p) in pop.iter_mut().enumerate() {
            *p = self.f[[x, y, i]];
        }
        pop
    }

    #[inline]
    fn store(&mut self, x: usize, y: usize, pop: &Populations) {
        for (i, &p) in pop.iter().enumerate() {
            self.f[[x, y, i]] = p;
        }
    }

    /// Node moments (rho, ux, uy).
    pub fn macroscopic_at(&self, x: usize, y: usize) -> NumLabResult<(f64, f64, f64)> {
        self.check_bounds(x, y)?;
        Ok(macroscopic(&self.load(x, y)))
    }

    /// Local collision at every node.
    pub fn collide(&mut self) {
        for x in 0..self.lx {
            for y in 0..self.ly {
                let mut pop = self.load(x, y);
                self.dynamics[[x, y]].apply(&mut pop);
                self.store(x, y, &pop);
            }
        }
    }

    /// Move every population one link along its velocity, wrapping at the
    /// domain edges.
    pub fn stream(&mut self) {
        let (lx, ly) = (self.lx as i64, self.ly as i64);
        for x in 0..self.lx {
            for y in 0..self.ly {
                for (i, &(cx, cy)) in VELOCITIES.iter().enumerate() {
                    let nx = (x as i64 + cx).rem_euclid(lx) as usize;
                    let ny = (y as i64 + cy).rem_euclid(ly) as usize;
                    self.tmp[[nx, ny, i]] = self.f[[x, y, i]];
                }
            }
        }
        std::mem::swap(&mut self.f, &mut self.tmp);
    }

    pub fn step(&mut self) {
        self.collide();
        self.stream();
    }

    /// Density field, indexed [x, y].
    pub fn density(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.lx, self.ly), |(x, y)| {
            self.f.slice(ndarray::s![x, y, ..]).sum()
        })
    }

    /// Velocity components (ux, uy), each indexed [x, y].
    pub fn velocity(&self) -> (Array2<f64>, Array2<f64>) {
        let mut ux = Array2::zeros((self.lx, self.ly));
        let mut uy = Array2::zeros((self.lx, self.ly));
        for x in 0..self.lx {
            for y in 0..self.ly {
                let (_, u, v) = macroscopic(&self.load(x, y));
                ux[[x, y]] = u;
                uy[[x, y]] = v;
            }
        }
        (ux, uy)
    }

    /// |u| with rows = y and columns = x, the layout written to disk.
    pub fn velocity_norm(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.ly, self.lx), |(y, x)| {
            let (_, u, v) = macroscopic(&self.load(x, y));
            (u * u + v * v).sqrt()
        })
    }

    pub fn total_mass(&self) -> f64 {
        self.f.sum()
    }

    /// Σ f_i c_i over the whole lattice.
    pub fn total_momentum(&self) -> (f64, f64) {
        let mut px = 0.0;
        let mut py = 0.0;
        for ((_, _, i), &fi) in self.f.indexed_iter() {
            let (cx, cy) = VELOCITIES[i];
            px += fi * cx as f64;
            py += fi * cy as f64;
        }
        (px, py)
    }
}
