use nalgebra::{SMatrix, SVector};
use tracing::{debug, trace, warn};

use super::finite_difference::finite_difference_gradient;
use super::line_search::backtracking_armijo;
use super::{BfgsParams, MinimizeResult, Objective, Termination};
use crate::geoloc_errors::{GeolocError, Result};

/// Curvature updates with `sᵀy` below this fraction of `‖s‖·‖y‖` are skipped.
const CURVATURE_EPS: f64 = 1e-10;

/// Gradient evaluation bookkeeping shared by every iteration.
struct GradientOracle<'a, O: ?Sized> {
    objective: &'a O,
    params: &'a BfgsParams,
    function_evaluations: usize,
    gradient_evaluations: usize,
}

impl<'a, O: ?Sized> GradientOracle<'a, O> {
    fn gradient<const N: usize>(&mut self, x: &SVector<f64, N>, fx: f64) -> SVector<f64, N>
    where
        O: Objective<N>,
    {
        self.gradient_evaluations += 1;
        match self.objective.gradient(x) {
            Some(g) => g,
            None => {
                let (g, evals) =
                    finite_difference_gradient(self.objective, x, fx, self.params.gradient_scheme);
                self.function_evaluations += evals;
                g
            }
        }
    }
}

/// Minimize `objective` from `x0` with the BFGS quasi-Newton method.
///
/// The inverse-Hessian estimate starts at the identity. Each iteration takes the
/// direction `p = −H·g` (reset to steepest descent if it is not a descent direction),
/// shortens it to [`BfgsParams::max_step`] when longer, runs a backtracking Armijo line
/// search and applies the BFGS inverse update
///
/// ```text
/// H ← (I − ρ s yᵀ) H (I − ρ y sᵀ) + ρ s sᵀ,   ρ = 1 / (yᵀ s)
/// ```
///
/// skipping it when the curvature condition `yᵀs > 0` does not safely hold.
///
/// Arguments
/// -----------------
/// * `objective`: function to minimize; finite differences are used if it has no gradient.
/// * `x0`: starting point.
/// * `params`: tolerances, iteration budget and line-search settings.
///
/// Return
/// ----------
/// * `Ok(MinimizeResult)` with [`Termination::Converged`] when `‖g‖ < gradient_tolerance`
///   (or the value drops to `value_tolerance`), or [`Termination::MaxIterationsReached`]
///   with the best point found.
/// * `Err(GeolocError::NonFiniteObjective)` if `f(x0)` is not finite.
/// * `Err(GeolocError::LineSearchFailed)` if no acceptable step exists along a direction.
///
/// See also
/// ------------
/// * [`crate::minimizer::BfgsParams`] – configuration and defaults.
/// * [`crate::minimizer::finite_difference_gradient`] – numeric gradient.
pub fn minimize_bfgs<O, const N: usize>(
    objective: &O,
    x0: SVector<f64, N>,
    params: &BfgsParams,
) -> Result<MinimizeResult<N>>
where
    O: Objective<N> + ?Sized,
{
    let mut x = x0;
    let mut fx = objective.value(&x);
    if !fx.is_finite() {
        return Err(GeolocError::NonFiniteObjective(fx));
    }

    let mut oracle = GradientOracle {
        objective,
        params,
        function_evaluations: 1,
        gradient_evaluations: 0,
    };
    let mut g = oracle.gradient(&x, fx);
    let mut h_inv = SMatrix::<f64, N, N>::identity();
    let mut iterations = 0;

    let termination = loop {
        let grad_norm = g.norm();
        let value_reached = params.value_tolerance.is_some_and(|tol| fx <= tol);
        if grad_norm < params.gradient_tolerance || value_reached {
            break Termination::Converged;
        }
        if iterations >= params.max_iterations {
            break Termination::MaxIterationsReached;
        }

        let mut p = -(h_inv * g);
        let mut slope = g.dot(&p);
        if !(slope < 0.0) {
            debug!(iterations, slope, "not a descent direction, resetting inverse Hessian");
            h_inv = SMatrix::identity();
            p = -g;
            slope = g.dot(&p);
        }

        let p_norm = p.norm();
        if p_norm > params.max_step {
            p *= params.max_step / p_norm;
            slope = g.dot(&p);
        }

        let (step, evals) = backtracking_armijo(objective, &x, fx, &p, slope, params);
        oracle.function_evaluations += evals;
        let Some(step) = step else {
            warn!(iterations, value = fx, grad_norm, "line search exhausted");
            return Err(GeolocError::LineSearchFailed {
                iterations,
                value: fx,
                gradient_norm: grad_norm,
            });
        };

        let g_new = oracle.gradient(&step.x, step.value);
        let s = step.x - x;
        let y = g_new - g;
        let sy = s.dot(&y);

        if sy > CURVATURE_EPS * s.norm() * y.norm() {
            let rho = 1.0 / sy;
            let hy = h_inv * y;
            let yhy = y.dot(&hy);
            for i in 0..N {
                for j in 0..N {
                    h_inv[(i, j)] += (1.0 + rho * yhy) * rho * s[i] * s[j]
                        - rho * (hy[i] * s[j] + s[i] * hy[j]);
                }
            }
        } else {
            trace!(iterations, sy, "curvature condition failed, update skipped");
        }

        x = step.x;
        fx = step.value;
        g = g_new;
        iterations += 1;

        trace!(iterations, value = fx, alpha = step.alpha, "BFGS step accepted");
    };

    let result = MinimizeResult {
        x,
        value: fx,
        gradient_norm: g.norm(),
        iterations,
        function_evaluations: oracle.function_evaluations,
        gradient_evaluations: oracle.gradient_evaluations,
        termination,
    };

    match termination {
        Termination::Converged => debug!(
            iterations,
            value = result.value,
            gradient_norm = result.gradient_norm,
            "BFGS converged"
        ),
        Termination::MaxIterationsReached => debug!(
            iterations,
            value = result.value,
            gradient_norm = result.gradient_norm,
            "BFGS reached the iteration limit"
        ),
    }

    Ok(result)
}
