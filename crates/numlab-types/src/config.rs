// ─────────────────────────────────────────────────────────────────────
// NumLab — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_EXPONENT, DEFAULT_MIN_EXPONENT, DEFAULT_STEP_COUNT, DEFAULT_X0,
};
use crate::error::{NumLabError, NumLabResult};

/// Top-level lab configuration.
/// Every section is optional in JSON; missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub convergence: ConvergenceConfig,
    pub dense: DenseConfig,
    pub sparse: SparseConfig,
    pub channel: ChannelConfig,
}

/// Scalar test function with a known analytical derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFunction {
    #[default]
    Sine,
    Cosine,
    Exp,
    /// f(x) = x², whose derivative vanishes at x = 0.
    Square,
}

impl TestFunction {
    pub fn value(self, x: f64) -> f64 {
        match self {
            TestFunction::Sine => x.sin(),
            TestFunction::Cosine => x.cos(),
            TestFunction::Exp => x.exp(),
            TestFunction::Square => x * x,
        }
    }

    pub fn derivative(self, x: f64) -> f64 {
        match self {
            TestFunction::Sine => x.cos(),
            TestFunction::Cosine => -x.sin(),
            TestFunction::Exp => x.exp(),
            TestFunction::Square => 2.0 * x,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TestFunction::Sine => "sin",
            TestFunction::Cosine => "cos",
            TestFunction::Exp => "exp",
            TestFunction::Square => "x^2",
        }
    }
}

/// Finite-difference convergence study parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    /// Evaluation point x0.
    pub x0: f64,
    /// Base-10 exponent of the first step.
    pub min_exponent: f64,
    /// Base-10 exponent of the last step.
    pub max_exponent: f64,
    /// Number of steps (inclusive of both ends).
    pub count: usize,
    pub function: TestFunction,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        ConvergenceConfig {
            x0: DEFAULT_X0,
            min_exponent: DEFAULT_MIN_EXPONENT,
            max_exponent: DEFAULT_MAX_EXPONENT,
            count: DEFAULT_STEP_COUNT,
            function: TestFunction::Sine,
        }
    }
}

impl ConvergenceConfig {
    pub fn validate(&self) -> NumLabResult<()> {
        if !self.x0.is_finite() {
            return Err(NumLabError::ConfigError(format!(
                "x0 must be finite, got {}",
                self.x0
            )));
        }
        if !self.min_exponent.is_finite() || !self.max_exponent.is_finite() {
            return Err(NumLabError::ConfigError(format!(
                "step exponents must be finite, got [{}, {}]",
                self.min_exponent, self.max_exponent
            )));
        }
        if self.count == 0 {
            return Err(NumLabError::ConfigError(
                "step count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Dense inversion demo parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DenseConfig {
    pub size: usize,
    pub seed: u64,
}

impl Default for DenseConfig {
    fn default() -> Self {
        DenseConfig { size: 500, seed: 42 }
    }
}

impl DenseConfig {
    pub fn validate(&self) -> NumLabResult<()> {
        if self.size == 0 {
            return Err(NumLabError::ConfigError(
                "dense matrix size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sparse direct-solve demo parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SparseConfig {
    pub size: usize,
    /// Fraction of off-diagonal entries that are nonzero.
    pub density: f64,
    pub seed: u64,
}

impl Default for SparseConfig {
    fn default() -> Self {
        SparseConfig {
            size: 1000,
            density: 1e-3,
            seed: 42,
        }
    }
}

impl SparseConfig {
    pub fn validate(&self) -> NumLabResult<()> {
        if self.size == 0 {
            return Err(NumLabError::ConfigError(
                "sparse matrix size must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(NumLabError::ConfigError(format!(
                "sparse density must lie in [0, 1], got {}",
                self.density
            )));
        }
        Ok(())
    }
}

/// Lattice Boltzmann channel flow past a cylinder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel length in lattice nodes.
    pub lx: usize,
    /// Channel height in lattice nodes.
    pub ly: usize,
    /// Peak velocity of the Poiseuille inflow (lattice units).
    pub u_max: f64,
    pub reynolds: f64,
    /// Total number of time steps.
    pub steps: usize,
    /// Progress-report interval in steps.
    pub report_every: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            lx: 250,
            ly: 50,
            u_max: 0.02,
            reynolds: 100.0,
            steps: 100_000,
            report_every: 1000,
        }
    }
}

impl ChannelConfig {
    /// Cylinder centre x, offset upstream. `lx/5` counted from node 1,
    /// i.e. node `lx/5 − 1` here.
    pub fn obstacle_x(&self) -> usize {
        self.lx / 5 - 1
    }

    /// Cylinder centre y, `ly/2` counted from node 1. For even `ly` this
    /// lands half a node below the Poiseuille axis at `(ly − 1)/2`, which
    /// breaks the symmetry.
    pub fn obstacle_y(&self) -> usize {
        self.ly / 2 - 1
    }

    pub fn obstacle_radius(&self) -> usize {
        self.ly / 10 + 1
    }

    /// Kinematic viscosity from the Reynolds number based on cylinder diameter.
    pub fn viscosity(&self) -> f64 {
        self.u_max * 2.0 * self.obstacle_radius() as f64 / self.reynolds
    }

    /// BGK relaxation parameter ω = 1 / (3ν + 1/2).
    pub fn omega(&self) -> f64 {
        1.0 / (3.0 * self.viscosity() + 0.5)
    }

    pub fn validate(&self) -> NumLabResult<()> {
        if self.lx < 8 || self.ly < 8 {
            return Err(NumLabError::ConfigError(format!(
                "channel must be at least 8x8 nodes, got {}x{}",
                self.lx, self.ly
            )));
        }
        if !self.u_max.is_finite() || self.u_max <= 0.0 || self.u_max >= 0.3 {
            return Err(NumLabError::ConfigError(format!(
                "u_max must lie in (0, 0.3) lattice units, got {}",
                self.u_max
            )));
        }
        if !self.reynolds.is_finite() || self.reynolds <= 0.0 {
            return Err(NumLabError::ConfigError(format!(
                "Reynolds number must be finite and > 0, got {}",
                self.reynolds
            )));
        }
        let omega = self.omega();
        if !(omega > 0.0 && omega < 2.0) {
            return Err(NumLabError::ConfigError(format!(
                "relaxation parameter omega must lie in (0, 2), got {omega}"
            )));
        }
        if self.report_every == 0 {
            return Err(NumLabError::ConfigError(
                "report_every must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl LabConfig {
    /// Load from a JSON file. Absent sections and fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> NumLabResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> NumLabResult<()> {
        self.convergence.validate()?;
        self.dense.validate()?;
        self.sparse.validate()?;
        self.channel.validate()
    }
}
