use nalgebra::SVector;

use super::{GradientScheme, Objective};

/// Approximate the gradient of `objective` at `x` by finite differences.
///
/// The perturbation of component `i` is `step · max(1, |xᵢ|)`. The divisor is the
/// difference actually realized in floating point (`(xᵢ + h) − xᵢ`), not `h` itself.
///
/// Arguments
/// -----------------
/// * `objective`: function to differentiate.
/// * `x`: evaluation point.
/// * `fx`: `objective.value(x)`, reused by the forward scheme.
/// * `scheme`: [`GradientScheme::Central`] or [`GradientScheme::Forward`].
///
/// Return
/// ----------
/// * The gradient estimate and the number of objective evaluations spent.
pub fn finite_difference_gradient<O, const N: usize>(
    objective: &O,
    x: &SVector<f64, N>,
    fx: f64,
    scheme: GradientScheme,
) -> (SVector<f64, N>, usize)
where
    O: Objective<N> + ?Sized,
{
    let mut grad = SVector::<f64, N>::zeros();
    let mut evals = 0;

    for i in 0..N {
        match scheme {
            GradientScheme::Central { step } => {
                let h = step * x[i].abs().max(1.0);
                let mut xp = *x;
                let mut xm = *x;
                xp[i] += h;
                xm[i] -= h;
                grad[i] = (objective.value(&xp) - objective.value(&xm)) / (xp[i] - xm[i]);
                evals += 2;
            }
            GradientScheme::Forward { step } => {
                let h = step * x[i].abs().max(1.0);
                let mut xp = *x;
                xp[i] += h;
                grad[i] = (objective.value(&xp) - fx) / (xp[i] - x[i]);
                evals += 1;
            }
        }
    }

    (grad, evals)
}
