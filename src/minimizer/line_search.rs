use nalgebra::SVector;

use super::{BfgsParams, Objective};

/// Accepted trial point of a line search.
#[derive(Debug, Clone, Copy)]
pub(super) struct LineSearchStep<const N: usize> {
    pub x: SVector<f64, N>,
    pub value: f64,
    pub alpha: f64,
}

/// Backtracking line search along `direction` from `x`.
///
/// Starting from `α = 1`, a trial `x + α·p` is accepted when its value is finite, strictly
/// below `fx`, and satisfies the Armijo condition `f ≤ fx + c₁·α·slope`. Otherwise `α` is
/// multiplied by `params.backtrack_shrink`, up to `params.max_line_search_steps` trials.
///
/// Return
/// ----------
/// * The accepted step, or `None` when every trial was rejected, together with the
///   number of objective evaluations spent.
pub(super) fn backtracking_armijo<O, const N: usize>(
    objective: &O,
    x: &SVector<f64, N>,
    fx: f64,
    direction: &SVector<f64, N>,
    slope: f64,
    params: &BfgsParams,
) -> (Option<LineSearchStep<N>>, usize)
where
    O: Objective<N> + ?Sized,
{
    let mut alpha = 1.0;

    for trial in 1..=params.max_line_search_steps {
        let candidate = x + direction * alpha;
        let value = objective.value(&candidate);

        if value.is_finite() && value < fx && value <= fx + params.armijo_c1 * alpha * slope {
            let step = LineSearchStep {
                x: candidate,
                value,
                alpha,
            };
            return (Some(step), trial);
        }
        alpha *= params.backtrack_shrink;
    }

    (None, params.max_line_search_steps)
}
