//! Right-hand sides of autonomous state equations driven by a fixed operator.
//!
//! Every generator here has the form `f(A, z) -> dz/dt`, where `A` is held
//! constant and `z` is a density matrix or state vector. Any function or
//! closure with that signature implements [`Generator`] and can be handed to
//! the integrators in [`crate::integrate`].

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::error::{ DynError, Result };

/// An injectable time-independent derivative `dz/dt = f(A, z)`.
///
/// Blanket-implemented for all `Fn(&Array2<C64>, &Array<C64, D>) ->
/// Result<Array<C64, D>>`, so plain functions like [`derivative`] can be passed
/// by name.
pub trait Generator<D>
where D: nd::Dimension
{
    fn eval(&self, op: &nd::Array2<C64>, state: &nd::Array<C64, D>)
        -> Result<nd::Array<C64, D>>;
}

impl<D, F> Generator<D> for F
where
    D: nd::Dimension,
    F: Fn(&nd::Array2<C64>, &nd::Array<C64, D>) -> Result<nd::Array<C64, D>>,
{
    fn eval(&self, op: &nd::Array2<C64>, state: &nd::Array<C64, D>)
        -> Result<nd::Array<C64, D>>
    {
        self(op, state)
    }
}

/// Check that `op` is square and that every axis of `state` matches it.
pub fn check_shapes<SA, SB, D>(
    op: &nd::ArrayBase<SA, nd::Ix2>,
    state: &nd::ArrayBase<SB, D>,
) -> Result<()>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
    D: nd::Dimension,
{
    let n = op.nrows();
    if op.ncols() != n || state.shape().iter().any(|&m| m != n) {
        return Err(DynError::ShapeMismatch {
            operator: op.shape().to_vec(),
            state: state.shape().to_vec(),
        });
    }
    Ok(())
}

/// Compute the commutator `[A, B] = A B - B A`.
///
/// Shapes are not checked; mismatched inputs panic inside `dot`.
pub fn commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) - B.dot(A)
}

/// Liouville–von Neumann right-hand side `-i [A, ρ]`.
///
/// Fails with [`DynError::ShapeMismatch`] before any multiplication if `op` is
/// not square or `rho` is not the same size.
pub fn derivative(op: &nd::Array2<C64>, rho: &nd::Array2<C64>)
    -> Result<nd::Array2<C64>>
{
    check_shapes(op, rho)?;
    Ok(-C64::i() * commutator(op, rho))
}

/// Schrödinger right-hand side `-i A ψ`.
pub fn schrodinger(op: &nd::Array2<C64>, psi: &nd::Array1<C64>)
    -> Result<nd::Array1<C64>>
{
    check_shapes(op, psi)?;
    Ok(-C64::i() * op.dot(psi))
}
