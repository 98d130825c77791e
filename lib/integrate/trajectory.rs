//! Drive the RK4 stepper across a whole time grid.
//!
//! Trajectories are returned as `Vec`s of states with the initial state at
//! index 0; use [`stack_trajectory`] to get a single array whose last index
//! corresponds to time.

use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use serde::Deserialize;
use tracing::{ debug, trace, warn };
use crate::{
    error::{ DynError, GridError, Result },
    generator::Generator,
    state::{ StateNorm, is_finite },
};
use super::{ check_step, rk4_step };

/// What to do with the state after each step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Renormalize {
    /// Keep the raw RK4 update.
    #[default]
    Never,
    /// Divide by the state's [`StateNorm`] after every step.
    Norm,
}

impl Renormalize {
    fn apply<D>(self, z: nd::Array<C64, D>) -> nd::Array<C64, D>
    where
        D: nd::Dimension,
        nd::Array<C64, D>: StateNorm,
    {
        match self {
            Self::Never => z,
            Self::Norm => {
                let norm = z.norm();
                if norm.is_zero() { z } else { z / norm }
            },
        }
    }
}

/// Validate a time grid and return the step sizes between consecutive points.
///
/// The grid must have at least two points, all finite and strictly increasing.
pub fn grid_steps(t: &[f64]) -> Result<Vec<f64>> {
    if t.len() < 2 {
        return Err(GridError::TooShort(t.len()).into());
    }
    if let Some((index, &value))
        = t.iter().find_position(|tk| !tk.is_finite())
    {
        return Err(GridError::NonFinite { index, value }.into());
    }
    t.iter().tuple_windows()
        .enumerate()
        .map(|(k, (&tk, &tkp1))| -> Result<f64> {
            if tkp1 > tk {
                Ok(tkp1 - tk)
            } else {
                Err(GridError::NotIncreasing {
                    index: k + 1,
                    prev: tk,
                    next: tkp1,
                }.into())
            }
        })
        .collect()
}

// shared stepping loop; `x` sees every state, including the initial one
fn drive<D, F, X, T>(
    f: &F,
    op: &nd::Array2<C64>,
    z0: &nd::Array<C64, D>,
    dt: &[f64],
    renorm: Renormalize,
    x: X,
) -> Result<Vec<T>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Generator<D>,
    X: Fn(&nd::Array<C64, D>) -> T,
{
    debug!(
        steps = dt.len(),
        dim = op.nrows(),
        ?renorm,
        "integrating trajectory"
    );
    let mut x_t: Vec<T> = Vec::with_capacity(dt.len() + 1);
    x_t.push(x(z0));
    let mut z_old: nd::Array<C64, D> = z0.clone();
    let mut z_new: nd::Array<C64, D>;
    for (k, &dtk) in dt.iter().enumerate() {
        check_step(dtk)?;
        z_new = renorm.apply(rk4_step(f, op, &z_old, dtk)?);
        trace!(step = k + 1, dt = dtk, "rk4 step");
        x_t.push(x(&z_new));
        z_old = z_new;
    }
    if !is_finite(&z_old) {
        warn!("trajectory contains non-finite values after {} steps", dt.len());
    }
    Ok(x_t)
}

/// Integrate over the time grid `t`, returning the state at every time point.
///
/// The first element is a copy of `z0`. Fails with
/// [`DynError::InvalidTimeGrid`] before any integration if `t` has fewer than
/// two points or is not finite and strictly increasing.
pub fn integrate_trajectory<D, F>(
    f: F,
    op: &nd::Array2<C64>,
    z0: &nd::Array<C64, D>,
    t: &[f64],
) -> Result<Vec<nd::Array<C64, D>>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Generator<D>,
{
    integrate_trajectory_with(f, op, z0, t, Renormalize::Never)
}

/// Like [`integrate_trajectory`], with a choice of per-step renormalization.
pub fn integrate_trajectory_with<D, F>(
    f: F,
    op: &nd::Array2<C64>,
    z0: &nd::Array<C64, D>,
    t: &[f64],
    renorm: Renormalize,
) -> Result<Vec<nd::Array<C64, D>>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Generator<D>,
{
    let dt = grid_steps(t)?;
    drive(&f, op, z0, &dt, renorm, |z| z.clone())
}

/// Integrate `steps` steps of fixed size `h`, returning `steps + 1` states.
pub fn integrate_fixed<D, F>(
    f: F,
    op: &nd::Array2<C64>,
    z0: &nd::Array<C64, D>,
    h: f64,
    steps: usize,
) -> Result<Vec<nd::Array<C64, D>>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Generator<D>,
{
    integrate_fixed_with(f, op, z0, h, steps, Renormalize::Never)
}

/// Like [`integrate_fixed`], with a choice of per-step renormalization.
pub fn integrate_fixed_with<D, F>(
    f: F,
    op: &nd::Array2<C64>,
    z0: &nd::Array<C64, D>,
    h: f64,
    steps: usize,
    renorm: Renormalize,
) -> Result<Vec<nd::Array<C64, D>>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Generator<D>,
{
    check_step(h)?;
    drive(&f, op, z0, &vec![h; steps], renorm, |z| z.clone())
}

/// Integrate over the time grid `t`, recording only `x(state)` at each time
/// point.
pub fn integrate_reduced<D, F, X, T>(
    f: F,
    op: &nd::Array2<C64>,
    z0: &nd::Array<C64, D>,
    t: &[f64],
    x: X,
) -> Result<Vec<T>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Generator<D>,
    X: Fn(&nd::Array<C64, D>) -> T,
{
    let dt = grid_steps(t)?;
    drive(&f, op, z0, &dt, Renormalize::Never, x)
}

/// Stack a trajectory into a single array with time along the last axis.
pub fn stack_trajectory<D>(states: &[nd::Array<C64, D>])
    -> Result<nd::Array<C64, D::Larger>>
where
    D: nd::Dimension,
    D::Larger: nd::RemoveAxis,
{
    let first = states.first()
        .ok_or_else(|| {
            DynError::Stack(
                nd::ShapeError::from_kind(nd::ErrorKind::Unsupported))
        })?;
    let axis = nd::Axis(first.ndim());
    let views: Vec<nd::ArrayView<C64, D>>
        = states.iter().map(|z| z.view()).collect();
    Ok(nd::stack(axis, &views)?)
}

#[cfg(test)]
mod tests {
    use crate::{
        generator::{ derivative, schrodinger },
        state::complexify,
    };
    use super::*;

    fn sigma_x() -> nd::Array2<C64> {
        complexify(&nd::array![[0.0, 1.0], [1.0, 0.0]])
    }

    fn ground() -> nd::Array2<C64> {
        complexify(&nd::array![[1.0, 0.0], [0.0, 0.0]])
    }

    fn rabi_exact(t: f64) -> nd::Array2<C64> {
        let (s, c) = t.sin_cos();
        nd::array![
            [C64::from(c * c), C64::new(0.0, c * s)],
            [C64::new(0.0, -c * s), C64::from(s * s)],
        ]
    }

    fn max_diff<D: nd::Dimension>(
        a: &nd::Array<C64, D>,
        b: &nd::Array<C64, D>,
    ) -> f64 {
        (a - b).iter().map(|z| z.norm()).fold(0.0, f64::max)
    }

    fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
        nd::Array1::linspace(a, b, n).to_vec()
    }

    #[test]
    fn first_entry_is_initial_state() {
        let t = linspace(0.0, 10.0, 30);
        let rho = integrate_trajectory(derivative, &sigma_x(), &ground(), &t)
            .unwrap();
        assert_eq!(rho.len(), 30);
        assert_eq!(rho[0], ground());
        let rho1 = &rho[1];
        assert!((rho1[[0, 0]].re - 0.885806819825972).abs() < 1e-12);
    }

    #[test]
    fn two_point_grid_is_one_step() {
        let h = 0.37;
        let t = [1.5, 1.5 + h];
        let traj = integrate_trajectory(derivative, &sigma_x(), &ground(), &t)
            .unwrap();
        let step = crate::integrate::integrate_step(
            derivative, &sigma_x(), &ground(), t[1] - t[0]).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj[1], step);
    }

    #[test]
    fn zero_operator_is_stationary() {
        let op: nd::Array2<C64> = nd::Array2::zeros((3, 3));
        let rho0: nd::Array2<C64> = nd::array![
            [C64::from(0.5), C64::new(0.1, 0.2), C64::from(0.0)],
            [C64::new(0.1, -0.2), C64::from(0.3), C64::from(0.0)],
            [C64::from(0.0), C64::from(0.0), C64::from(0.2)],
        ];
        let traj = integrate_trajectory(derivative, &op, &rho0, &linspace(0.0, 5.0, 11))
            .unwrap();
        assert!(traj.iter().all(|rho| rho == &rho0));
    }

    #[test]
    fn fourth_order_convergence() {
        let T = 1.0;
        let err = |n: usize| -> f64 {
            let traj = integrate_fixed(
                derivative, &sigma_x(), &ground(), T / n as f64, n).unwrap();
            max_diff(&traj[n], &rabi_exact(T))
        };
        let ratio = err(10) / err(20);
        assert!((13.0..19.0).contains(&ratio), "convergence ratio {}", ratio);
        let ratio = err(20) / err(40);
        assert!((13.0..19.0).contains(&ratio), "convergence ratio {}", ratio);
    }

    #[test]
    fn follows_rabi_oscillation() {
        let t = linspace(0.0, 10.0, 1001);
        let traj = integrate_trajectory(derivative, &sigma_x(), &ground(), &t)
            .unwrap();
        for (&tk, rho) in t.iter().zip(&traj) {
            assert!(max_diff(rho, &rabi_exact(tk)) < 1e-7);
        }
    }

    #[test]
    fn fixed_matches_grid() {
        let h = 0.125;
        let t: Vec<f64> = (0..9).map(|k| 2.0 + k as f64 * h).collect();
        let a = integrate_fixed(derivative, &sigma_x(), &ground(), h, 8).unwrap();
        let b = integrate_trajectory(derivative, &sigma_x(), &ground(), &t).unwrap();
        assert_eq!(a.len(), b.len());
        for (za, zb) in a.iter().zip(&b) {
            assert!(max_diff(za, zb) < 1e-14);
        }
        let c = integrate_fixed(derivative, &sigma_x(), &ground(), h, 0).unwrap();
        assert_eq!(c, vec![ground()]);
        assert!(matches!(
            integrate_fixed(derivative, &sigma_x(), &ground(), -h, 4),
            Err(DynError::InvalidStep(_)),
        ));
    }

    #[test]
    fn nonuniform_grid() {
        let t = [0.0, 0.01, 0.03, 0.035, 0.05, 0.051];
        let traj = integrate_trajectory(derivative, &sigma_x(), &ground(), &t)
            .unwrap();
        for (&tk, rho) in t.iter().zip(&traj) {
            assert!(max_diff(rho, &rabi_exact(tk)) < 1e-7);
        }
    }

    #[test]
    fn reduced_output() {
        let t = linspace(0.0, 3.0, 50);
        let pop = integrate_reduced(
            derivative, &sigma_x(), &ground(), &t, |rho| rho[[1, 1]].re).unwrap();
        let full = integrate_trajectory(derivative, &sigma_x(), &ground(), &t)
            .unwrap();
        assert_eq!(pop.len(), full.len());
        assert!(pop.iter().zip(&full).all(|(p, rho)| *p == rho[[1, 1]].re));
    }

    #[test]
    fn renormalized_pure_state() {
        let psi0: nd::Array1<C64> = nd::array![C64::from(1.0), C64::from(0.0)];
        let traj = integrate_trajectory_with(
            schrodinger, &sigma_x(), &psi0, &linspace(0.0, 10.0, 30),
            Renormalize::Norm,
        ).unwrap();
        for psi in traj.iter() {
            assert!((psi.norm() - C64::from(1.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn bad_grids() {
        let run = |t: &[f64]| {
            integrate_trajectory(derivative, &sigma_x(), &ground(), t)
        };
        assert!(matches!(
            run(&[]),
            Err(DynError::InvalidTimeGrid(GridError::TooShort(0))),
        ));
        assert!(matches!(
            run(&[1.0]),
            Err(DynError::InvalidTimeGrid(GridError::TooShort(1))),
        ));
        assert!(matches!(
            run(&[0.0, 1.0, 1.0]),
            Err(DynError::InvalidTimeGrid(
                GridError::NotIncreasing { index: 2, .. })),
        ));
        assert!(matches!(
            run(&[0.0, 2.0, 1.0]),
            Err(DynError::InvalidTimeGrid(
                GridError::NotIncreasing { index: 2, .. })),
        ));
        assert!(matches!(
            run(&[0.0, f64::NAN, 1.0]),
            Err(DynError::InvalidTimeGrid(
                GridError::NonFinite { index: 1, .. })),
        ));
        assert!(matches!(
            run(&[0.0, 1.0, f64::INFINITY]),
            Err(DynError::InvalidTimeGrid(
                GridError::NonFinite { index: 2, .. })),
        ));
    }

    #[test]
    fn shape_mismatch_in_trajectory() {
        let rho: nd::Array2<C64> = nd::Array2::zeros((3, 3));
        let res = integrate_trajectory(
            derivative, &sigma_x(), &rho, &linspace(0.0, 1.0, 5));
        assert!(matches!(res, Err(DynError::ShapeMismatch { .. })));
    }

    #[test]
    fn stacked_time_axis_is_last() {
        let t = linspace(0.0, 1.0, 7);
        let traj = integrate_trajectory(derivative, &sigma_x(), &ground(), &t)
            .unwrap();
        let stacked: nd::Array3<C64> = stack_trajectory(&traj).unwrap();
        assert_eq!(stacked.shape(), &[2, 2, 7]);
        for (k, rho) in traj.iter().enumerate() {
            assert_eq!(stacked.index_axis(nd::Axis(2), k), rho.view());
        }
        let empty: Vec<nd::Array2<C64>> = Vec::new();
        assert!(matches!(stack_trajectory(&empty), Err(DynError::Stack(_))));
    }
}
