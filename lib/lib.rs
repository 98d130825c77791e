#![allow(non_snake_case)]

//! Fixed-step fourth-order Runge-Kutta integration of the commutator equation
//! `dρ/dt = -i [A, ρ]` for a constant operator `A`.
//!
//! ```
//! use ndarray as nd;
//! use commutator_dynamics::{
//!     generator::derivative,
//!     integrate::integrate_trajectory,
//!     state::{ basis_density, complexify },
//! };
//!
//! let op = complexify(&nd::array![[0.0, 1.0], [1.0, 0.0]]);
//! let rho0 = basis_density(2, 0).unwrap();
//! let t = nd::Array1::linspace(0.0, 10.0, 30).to_vec();
//! let rho = integrate_trajectory(derivative, &op, &rho0, &t).unwrap();
//! assert_eq!(rho.len(), 30);
//! assert!(rho[1][[0, 0]].re < 1.0);
//! ```

pub mod error;
pub mod state;
pub mod generator;
pub mod integrate;
pub mod config;

pub use error::{ DynError, GridError, Result };
pub use generator::{ Generator, commutator, derivative, schrodinger };
pub use integrate::{
    Renormalize,
    integrate_fixed,
    integrate_reduced,
    integrate_step,
    integrate_trajectory,
    stack_trajectory,
};
pub use config::{ EvolveConfig, Schedule };
