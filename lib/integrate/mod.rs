//! Fixed-step fourth-order Runge-Kutta integration of autonomous state
//! equations.
//!
//! The generator is evaluated only at intermediate *states*, never at
//! intermediate times, since the operator is held constant over the whole
//! integration. All functions are generic over the dimension of the state
//! array, so the same machinery drives both density matrices and state
//! vectors.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ DynError, Result },
    generator::Generator,
};

pub mod trajectory;
pub use trajectory::*;

/// Fail with [`DynError::InvalidStep`] unless `h` is positive and finite.
pub fn check_step(h: f64) -> Result<()> {
    if h.is_finite() && h > 0.0 {
        Ok(())
    } else {
        Err(DynError::InvalidStep(h))
    }
}

/// Advance `state` by a single RK4 step of size `h`.
///
/// `h` is validated before `f` is ever called; errors raised by `f` are
/// propagated unchanged. The operator is only borrowed.
pub fn integrate_step<D, F>(
    f: F,
    op: &nd::Array2<C64>,
    state: &nd::Array<C64, D>,
    h: f64,
) -> Result<nd::Array<C64, D>>
where
    D: nd::Dimension,
    F: Generator<D>,
{
    check_step(h)?;
    rk4_step(&f, op, state, h)
}

// one step of RK4 with `h` already validated
pub(crate) fn rk4_step<D, F>(
    f: &F,
    op: &nd::Array2<C64>,
    z: &nd::Array<C64, D>,
    h: f64,
) -> Result<nd::Array<C64, D>>
where
    D: nd::Dimension,
    F: Generator<D>,
{
    let k1 = f.eval(op, z)?;
    let k2 = f.eval(op, &(z + &(&k1 * (h / 2.0))))?;
    let k3 = f.eval(op, &(z + &(&k2 * (h / 2.0))))?;
    let k4 = f.eval(op, &(z + &(&k3 * h)))?;
    Ok(z + &((k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)))
}
