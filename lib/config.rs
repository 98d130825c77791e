//! TOML-loadable description of how to step a trajectory.
//!
//! ```toml
//! renormalize = "never"
//!
//! [schedule]
//! kind = "fixed"
//! h = 0.01
//! steps = 1000
//! ```
//!
//! or, with an explicit grid,
//!
//! ```toml
//! [schedule]
//! kind = "grid"
//! times = [0.0, 0.5, 1.0, 1.5]
//! ```

use std::{ fs, path::Path };
use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::Deserialize;
use crate::{
    error::Result,
    generator::Generator,
    integrate::{
        Renormalize,
        check_step,
        grid_steps,
        integrate_fixed_with,
        integrate_trajectory_with,
    },
    state::StateNorm,
};

/// Time points at which states are recorded.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Explicit, strictly increasing time points.
    Grid { times: Vec<f64> },
    /// `steps` steps of size `h`.
    Fixed { h: f64, steps: usize },
}

impl Schedule {
    /// Number of states a trajectory over this schedule will contain.
    pub fn num_points(&self) -> usize {
        match self {
            Self::Grid { times } => times.len(),
            Self::Fixed { steps, .. } => steps + 1,
        }
    }

    /// Check the schedule without integrating anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Grid { times } => grid_steps(times).map(|_| ()),
            Self::Fixed { h, .. } => check_step(*h),
        }
    }
}

/// Top-level run configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EvolveConfig {
    pub schedule: Schedule,
    #[serde(default)]
    pub renormalize: Renormalize,
}

impl EvolveConfig {
    /// Parse from a TOML string. The schedule is validated as well.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.schedule.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Integrate `z0` under `op` according to this configuration.
    pub fn run<D, F>(
        &self,
        f: F,
        op: &nd::Array2<C64>,
        z0: &nd::Array<C64, D>,
    ) -> Result<Vec<nd::Array<C64, D>>>
    where
        D: nd::Dimension,
        nd::Array<C64, D>: StateNorm,
        F: Generator<D>,
    {
        match &self.schedule {
            Schedule::Grid { times } => {
                integrate_trajectory_with(f, op, z0, times, self.renormalize)
            },
            Schedule::Fixed { h, steps } => {
                integrate_fixed_with(f, op, z0, *h, *steps, self.renormalize)
            },
        }
    }
}
