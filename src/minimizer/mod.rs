//! # Unconstrained minimization (BFGS)
//!
//! This module provides a small, allocation-free **quasi-Newton** minimizer over
//! fixed-size parameter vectors ([`nalgebra::SVector`]), used by the locator to invert the
//! look-angle model.
//!
//! ## Pipeline overview
//!
//! 1. **Gradient**
//!    Analytic when the [`Objective`] supplies one, otherwise finite differences selected by
//!    [`GradientScheme`] (central by default).
//!
//! 2. **Direction**
//!    `p = −H·g` with `H` the inverse-Hessian estimate. If `p` is not a descent direction
//!    `H` is reset to the identity. When [`BfgsParams::max_step`] is finite, `p` is
//!    shortened to that length.
//!
//! 3. **Line search**
//!    Backtracking with the Armijo condition. Running out of trials is a hard failure
//!    ([`GeolocError::LineSearchFailed`]).
//!
//! 4. **Curvature update**
//!    Standard BFGS inverse update, skipped when `sᵀy` is not safely positive.
//!
//! Termination is reported as a [`Termination`]: converged (gradient norm, or value,
//! below tolerance) or out of iterations. The latter still returns the best point.
//!
//! ## Example
//!
//! ```rust
//! use geoloc::minimizer::{minimize_bfgs, BfgsParams, Termination};
//! use nalgebra::Vector2;
//!
//! let bowl = |x: &Vector2<f64>| (x[0] - 3.0).powi(2) + 10.0 * (x[1] + 1.0).powi(2);
//! let result = minimize_bfgs(&bowl, Vector2::zeros(), &BfgsParams::default()).unwrap();
//!
//! assert_eq!(result.termination, Termination::Converged);
//! assert!((result.x[0] - 3.0).abs() < 1e-6);
//! ```
//!
//! ## See also
//!
//! * [`crate::locator`] – drives this minimizer with the pointing residual.
//! * [`crate::residual::PointingResidual`] – the objective minimized there.
use std::cmp::Ordering::{Greater, Less};
use std::fmt;

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::geoloc_errors::GeolocError;

mod bfgs;
mod finite_difference;
mod line_search;

pub use bfgs::minimize_bfgs;
pub use finite_difference::finite_difference_gradient;

/// Scalar function to minimize over ℝᴺ.
///
/// Any `Fn(&SVector<f64, N>) -> f64` closure is an objective without analytic gradient.
pub trait Objective<const N: usize> {
    /// Objective value at `x`. Non-finite values are rejected by the line search.
    fn value(&self, x: &SVector<f64, N>) -> f64;

    /// Analytic gradient at `x`, if available. The default falls back to finite differences.
    fn gradient(&self, _x: &SVector<f64, N>) -> Option<SVector<f64, N>> {
        None
    }
}

impl<F, const N: usize> Objective<N> for F
where
    F: Fn(&SVector<f64, N>) -> f64,
{
    fn value(&self, x: &SVector<f64, N>) -> f64 {
        self(x)
    }
}

/// Finite-difference scheme used when the objective has no analytic gradient.
///
/// The perturbation of component `i` is `step · max(1, |xᵢ|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientScheme {
    /// `(f(x + h) − f(x − h)) / 2h`, two evaluations per component.
    Central { step: f64 },
    /// `(f(x + h) − f(x)) / h`, one evaluation per component.
    Forward { step: f64 },
}

impl GradientScheme {
    /// Central differences with a relative step of `1e-6`.
    pub fn central() -> Self {
        GradientScheme::Central { step: 1e-6 }
    }

    /// Forward differences with a relative step of `√ε`.
    pub fn forward() -> Self {
        GradientScheme::Forward {
            step: f64::EPSILON.sqrt(),
        }
    }

    fn step(&self) -> f64 {
        match self {
            GradientScheme::Central { step } | GradientScheme::Forward { step } => *step,
        }
    }
}

impl Default for GradientScheme {
    fn default() -> Self {
        Self::central()
    }
}

/// How a successful minimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Gradient norm (or value) fell below tolerance.
    Converged,
    /// Iteration budget exhausted; the returned point is the best one found.
    MaxIterationsReached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::MaxIterationsReached => write!(f, "maximum iterations reached"),
        }
    }
}

/// Result of [`minimize_bfgs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeResult<const N: usize> {
    /// Best point found.
    pub x: SVector<f64, N>,
    /// Objective value at `x`.
    pub value: f64,
    /// Norm of the gradient at `x`.
    pub gradient_norm: f64,
    /// Number of accepted steps.
    pub iterations: usize,
    /// Objective evaluations, including those spent on finite differences.
    pub function_evaluations: usize,
    /// Gradient evaluations.
    pub gradient_evaluations: usize,
    pub termination: Termination,
}

impl<const N: usize> MinimizeResult<N> {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Configuration of [`minimize_bfgs`].
///
/// Fields
/// -----------------
/// * `max_iterations` – maximum number of accepted steps before giving up softly.
/// * `gradient_tolerance` – convergence threshold on the gradient norm.
/// * `value_tolerance` – optional convergence threshold on the objective value itself,
///   meaningful for objectives whose minimum is zero (squared residuals).
/// * `gradient_scheme` – finite-difference scheme when no analytic gradient exists.
/// * `armijo_c1` – sufficient-decrease constant of the Armijo condition.
/// * `backtrack_shrink` – factor applied to the step length after a rejected trial.
/// * `max_line_search_steps` – trials per line search before failing.
/// * `max_step` – upper bound on the length of the search direction (infinite: no cap).
///
/// Defaults
/// -----------------
/// * `max_iterations`: 200
/// * `gradient_tolerance`: 1e-6
/// * `value_tolerance`: none
/// * `gradient_scheme`: central, relative step 1e-6
/// * `armijo_c1`: 1e-4
/// * `backtrack_shrink`: 0.5
/// * `max_line_search_steps`: 60
/// * `max_step`: ∞
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfgsParams {
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    pub value_tolerance: Option<f64>,
    pub gradient_scheme: GradientScheme,
    pub armijo_c1: f64,
    pub backtrack_shrink: f64,
    pub max_line_search_steps: usize,
    pub max_step: f64,
}

impl BfgsParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`BfgsParamsBuilder`] initialized with the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use geoloc::minimizer::{BfgsParams, GradientScheme};
    ///
    /// let params = BfgsParams::builder()
    ///     .max_iterations(500)
    ///     .gradient_scheme(GradientScheme::forward())
    ///     .max_step(5.0)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.max_iterations, 500);
    /// ```
    pub fn builder() -> BfgsParamsBuilder {
        BfgsParamsBuilder::new()
    }
}

impl Default for BfgsParams {
    fn default() -> Self {
        BfgsParams {
            max_iterations: 200,
            gradient_tolerance: 1e-6,
            value_tolerance: None,
            gradient_scheme: GradientScheme::default(),
            armijo_c1: 1e-4,
            backtrack_shrink: 0.5,
            max_line_search_steps: 60,
            max_step: f64::INFINITY,
        }
    }
}

/// Builder for [`BfgsParams`], with validation.
#[derive(Debug, Clone)]
pub struct BfgsParamsBuilder {
    params: BfgsParams,
}

impl Default for BfgsParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BfgsParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: BfgsParams::default(),
        }
    }

    pub fn max_iterations(mut self, v: usize) -> Self {
        self.params.max_iterations = v;
        self
    }
    pub fn gradient_tolerance(mut self, v: f64) -> Self {
        self.params.gradient_tolerance = v;
        self
    }
    pub fn value_tolerance(mut self, v: Option<f64>) -> Self {
        self.params.value_tolerance = v;
        self
    }
    pub fn gradient_scheme(mut self, v: GradientScheme) -> Self {
        self.params.gradient_scheme = v;
        self
    }
    pub fn armijo_c1(mut self, v: f64) -> Self {
        self.params.armijo_c1 = v;
        self
    }
    pub fn backtrack_shrink(mut self, v: f64) -> Self {
        self.params.backtrack_shrink = v;
        self
    }
    pub fn max_line_search_steps(mut self, v: usize) -> Self {
        self.params.max_line_search_steps = v;
        self
    }
    pub fn max_step(mut self, v: f64) -> Self {
        self.params.max_step = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff 0.0 < x < 1.0.
    #[inline]
    fn in_unit_interval(x: f64) -> bool {
        Self::gt0(x) && x.partial_cmp(&1.0) == Some(Less)
    }

    /// Finalize the builder and produce a [`BfgsParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `max_iterations ≥ 1`, `max_line_search_steps ≥ 1`.
    /// * `gradient_tolerance > 0`.
    /// * `value_tolerance`, when set, must not be NaN.
    /// * `0 < armijo_c1 < 1`, `0 < backtrack_shrink < 1`.
    /// * `max_step > 0` (infinity allowed).
    /// * finite-difference step finite and `> 0`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(BfgsParams)` when every rule holds.
    /// * `Err(GeolocError::InvalidMinimizerParameter)` naming the first violated rule.
    pub fn build(self) -> Result<BfgsParams, GeolocError> {
        let p = &self.params;

        if p.max_iterations == 0 {
            return Err(GeolocError::InvalidMinimizerParameter(
                "max_iterations must be >= 1".into(),
            ));
        }
        if p.max_line_search_steps == 0 {
            return Err(GeolocError::InvalidMinimizerParameter(
                "max_line_search_steps must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.gradient_tolerance) {
            return Err(GeolocError::InvalidMinimizerParameter(
                "gradient_tolerance must be > 0".into(),
            ));
        }
        if let Some(tol) = p.value_tolerance {
            if tol.partial_cmp(&0.0).is_none() {
                return Err(GeolocError::InvalidMinimizerParameter(
                    "value_tolerance must not be NaN".into(),
                ));
            }
        }
        if !Self::in_unit_interval(p.armijo_c1) {
            return Err(GeolocError::InvalidMinimizerParameter(
                "armijo_c1 must be in (0, 1)".into(),
            ));
        }
        if !Self::in_unit_interval(p.backtrack_shrink) {
            return Err(GeolocError::InvalidMinimizerParameter(
                "backtrack_shrink must be in (0, 1)".into(),
            ));
        }
        if !Self::gt0(p.max_step) {
            return Err(GeolocError::InvalidMinimizerParameter(
                "max_step must be > 0".into(),
            ));
        }
        let step = p.gradient_scheme.step();
        if !Self::gt0(step) || !step.is_finite() {
            return Err(GeolocError::InvalidMinimizerParameter(
                "finite-difference step must be finite and > 0".into(),
            ));
        }
        Ok(self.params)
    }
}
