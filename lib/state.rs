//! Helpers for building and measuring state arrays.

use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;

/// Compute a "norm" of an object, treating it as a representation of a quantum
/// state.
pub trait StateNorm {
    fn norm(&self) -> C64;
}

/// The norm of an `ndarray::Array1<num_complex::Complex64>` is the quadrature
/// sum of its elements.
impl StateNorm for nd::Array1<C64> {
    fn norm(&self) -> C64 { self.mapv(|a| a * a.conj()).sum().sqrt() }
}

/// The norm of an `ndarray::Array2<num_complex::Complex64>` is the sum of its
/// main diagonal.
impl StateNorm for nd::Array2<C64> {
    fn norm(&self) -> C64 { self.diag().iter().sum() }
}

/// Compute the outer product `|a⟩⟨b|`.
pub fn outer_prod(a: &nd::Array1<C64>, b: &nd::Array1<C64>)
    -> nd::Array2<C64>
{
    let na = a.len();
    let nb = b.len();
    a.iter().cartesian_product(b)
        .map(|(ai, bj)| *ai * bj.conj())
        .collect::<nd::Array1<C64>>()
        .into_shape((na, nb))
        .expect("outer_prod: element count is na * nb by construction")
}

/// Construct the density matrix `|ψ⟩⟨ψ|` of a pure state, normalized to unit
/// trace.
///
/// Returns `None` if `psi` has zero norm.
pub fn density_from_pure(psi: &nd::Array1<C64>) -> Option<nd::Array2<C64>> {
    let norm = psi.norm();
    (norm != C64::from(0.0))
        .then(|| psi / norm)
        .map(|psi| outer_prod(&psi, &psi))
}

/// Construct the density matrix of the `k`-th basis state in a space of
/// dimension `n`.
///
/// Returns `None` if `k >= n`.
pub fn basis_density(n: usize, k: usize) -> Option<nd::Array2<C64>> {
    (k < n).then(|| {
        let mut rho: nd::Array2<C64> = nd::Array2::zeros((n, n));
        rho[[k, k]] = 1.0.into();
        rho
    })
}

/// Lift a real-valued matrix to a complex one.
pub fn complexify<S>(a: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
where S: nd::Data<Elem = f64>
{
    a.mapv(C64::from)
}

/// Return `true` if every element of `a` is finite.
pub fn is_finite<S, D>(a: &nd::ArrayBase<S, D>) -> bool
where
    S: nd::Data<Elem = C64>,
    D: nd::Dimension,
{
    a.iter().all(|z| z.is_finite())
}
