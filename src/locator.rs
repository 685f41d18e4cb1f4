//! # Station locator
//!
//! Inverts the look-angle model: given a compass azimuth and an elevation measured toward a
//! geostationary satellite, find the ground station that would see exactly those angles.
//!
//! ## Pipeline
//!
//! 1. A [`PointingResidual`] is bound to the observation and satellite longitude.
//! 2. The [`SeedStrategy`] picks a starting point, `(0°, 0°)` unless configured otherwise.
//! 3. [`minimize_bfgs`] minimizes the residual over `(latitude, longitude)`.
//! 4. The minimizer output is brought back into the usual coordinate ranges
//!    ([`GeoPoint::normalized`]) and wrapped into a [`LocateResult`].
//!
//! Running out of iterations is not an error: the result carries
//! [`Termination::MaxIterationsReached`] and callers decide, for instance with
//! [`LocateResult::into_converged`]. A failed line search is an error.
//!
//! ## Example
//!
//! ```rust
//! use geoloc::locator::locate;
//! use geoloc::observation::Observation;
//!
//! let target = Observation::new(183.7, 56.6).unwrap();
//! let result = locate(&target, 74.0).unwrap();
//!
//! assert!(result.converged());
//! assert!((result.point.latitude - 28.547).abs() < 0.01);
//! assert!((result.point.longitude - 76.180).abs() < 0.01);
//! ```
use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{Degree, SquaredDegree};
use crate::geoloc_errors::{GeolocError, Result};
use crate::minimizer::{minimize_bfgs, BfgsParams, GradientScheme, Termination};
use crate::observation::{GeoPoint, Observation};
use crate::residual::PointingResidual;
use crate::seed::{
    node_count, GridSearchParams, SeedStrategy, MAX_FINE_INTERVALS, MIN_COARSE_STEP,
    MIN_FINE_STEP,
};

/// Outcome of one [`Locator::locate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocateResult {
    /// Estimated station, latitude in [-90, 90], longitude in [-180, 180).
    pub point: GeoPoint,
    /// Starting point handed to the minimizer.
    pub seed: GeoPoint,
    /// Squared pointing error at `point`, degrees².
    pub residual: SquaredDegree,
    pub iterations: usize,
    pub gradient_norm: f64,
    pub function_evaluations: usize,
    pub termination: Termination,
}

impl LocateResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Keep only a converged estimate.
    ///
    /// Return
    /// ----------
    /// * The station position when the minimizer converged, otherwise
    ///   [`GeolocError::OptimizationDidNotConverge`] carrying the best point found.
    pub fn into_converged(self) -> Result<GeoPoint> {
        match self.termination {
            Termination::Converged => Ok(self.point),
            Termination::MaxIterationsReached => Err(GeolocError::OptimizationDidNotConverge {
                best: self.point,
                iterations: self.iterations,
                residual: self.residual,
            }),
        }
    }
}

impl fmt::Display for LocateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} after {} iterations, residual {:.3e} deg²)",
            self.point, self.termination, self.iterations, self.residual
        )
    }
}

/// Configuration of a [`Locator`].
///
/// Defaults
/// -----------------
/// * `seed`: fixed `(0°, 0°)`.
/// * `bfgs`: central differences, step capped at 2°, stop when the residual drops to
///   `1e-10` deg² or the gradient norm below `1e-6`, at most 200 iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorParams {
    pub seed: SeedStrategy,
    pub bfgs: BfgsParams,
}

impl LocatorParams {
    pub fn builder() -> LocatorParamsBuilder {
        LocatorParamsBuilder::new()
    }

    /// Minimizer settings tuned for the pointing residual.
    pub fn default_bfgs() -> BfgsParams {
        BfgsParams {
            gradient_scheme: GradientScheme::central(),
            max_step: 2.0,
            value_tolerance: Some(1e-10),
            max_iterations: 200,
            ..BfgsParams::default()
        }
    }
}

impl Default for LocatorParams {
    fn default() -> Self {
        LocatorParams {
            seed: SeedStrategy::default(),
            bfgs: Self::default_bfgs(),
        }
    }
}

/// Builder for [`LocatorParams`], with validation of the seed strategy.
#[derive(Debug, Clone)]
pub struct LocatorParamsBuilder {
    params: LocatorParams,
}

impl Default for LocatorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LocatorParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: LocatorParams::default(),
        }
    }

    pub fn seed(mut self, v: SeedStrategy) -> Self {
        self.params.seed = v;
        self
    }

    /// Shorthand for a [`SeedStrategy::Fixed`] seed.
    pub fn initial_guess(mut self, latitude: Degree, longitude: Degree) -> Self {
        self.params.seed = SeedStrategy::Fixed(GeoPoint::new(latitude, longitude));
        self
    }

    /// Shorthand for a [`SeedStrategy::GridSearch`] seed with default spacings.
    pub fn grid_search(mut self) -> Self {
        self.params.seed = SeedStrategy::GridSearch(GridSearchParams::default());
        self
    }

    pub fn bfgs(mut self, v: BfgsParams) -> Self {
        self.params.bfgs = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * A fixed seed must have finite coordinates.
    /// * `MIN_COARSE_STEP ≤ coarse_step ≤ 120°`, `fine_span` finite and `> 0`,
    ///   `MIN_FINE_STEP ≤ fine_step ≤ 2·fine_span`, and at most `MAX_FINE_INTERVALS`
    ///   fine intervals per axis.
    ///
    /// `bfgs` is expected to come from [`BfgsParams::builder`] and is not re-validated.
    ///
    /// Returns
    /// -----------------
    /// * `Err(GeolocError::InvalidLocatorParameter)` naming the first violated rule.
    pub fn build(self) -> Result<LocatorParams> {
        match self.params.seed {
            SeedStrategy::Fixed(p) => {
                if !p.latitude.is_finite() || !p.longitude.is_finite() {
                    return Err(GeolocError::InvalidLocatorParameter(
                        "initial guess must be finite".into(),
                    ));
                }
            }
            SeedStrategy::GridSearch(grid) => {
                let positive = |v: f64| v.is_finite() && v > 0.0;
                if !(grid.coarse_step >= MIN_COARSE_STEP && grid.coarse_step <= 120.0) {
                    return Err(GeolocError::InvalidLocatorParameter(format!(
                        "coarse_step must be in [{MIN_COARSE_STEP}, 120]"
                    )));
                }
                if !positive(grid.fine_span) {
                    return Err(GeolocError::InvalidLocatorParameter(
                        "fine_span must be > 0".into(),
                    ));
                }
                if !(grid.fine_step >= MIN_FINE_STEP && grid.fine_step <= 2.0 * grid.fine_span) {
                    return Err(GeolocError::InvalidLocatorParameter(format!(
                        "fine_step must be in [{MIN_FINE_STEP}, 2 * fine_span]"
                    )));
                }
                if node_count(2.0 * grid.fine_span, grid.fine_step) > MAX_FINE_INTERVALS {
                    return Err(GeolocError::InvalidLocatorParameter(format!(
                        "fine pass exceeds {MAX_FINE_INTERVALS} intervals per axis"
                    )));
                }
            }
        }
        Ok(self.params)
    }
}

/// Stateless station solver. One instance can serve any number of independent calls.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    params: LocatorParams,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: LocatorParams) -> Self {
        Locator { params }
    }

    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    /// Estimate the station that sees `target` when pointing at the satellite.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: measured magnetic azimuth and elevation.
    /// * `satellite_longitude`: orbital longitude of the geostationary satellite, degrees east.
    ///
    /// Return
    /// ----------
    /// * A [`LocateResult`], converged or stopped at the iteration limit.
    /// * [`GeolocError::InvalidObservation`] if the satellite longitude is not finite.
    /// * [`GeolocError::NonFiniteObjective`] if the residual is not finite at the seed.
    /// * [`GeolocError::LineSearchFailed`] if the minimizer cannot make progress.
    ///
    /// See also
    /// ------------
    /// * [`locate`] – same call with the default parameters.
    pub fn locate(&self, target: &Observation, satellite_longitude: Degree) -> Result<LocateResult> {
        if !satellite_longitude.is_finite() {
            return Err(GeolocError::InvalidObservation(format!(
                "satellite longitude must be finite, got {satellite_longitude}"
            )));
        }

        let residual = PointingResidual::new(*target, satellite_longitude);
        let seed = self.params.seed.initial_point(&residual);
        debug!(
            azimuth = target.azimuth,
            elevation = target.elevation,
            satellite_longitude,
            seed_latitude = seed.latitude,
            seed_longitude = seed.longitude,
            "locating station"
        );

        let x0 = Vector2::new(seed.latitude, seed.longitude);
        let outcome = minimize_bfgs(&residual, x0, &self.params.bfgs)?;

        let result = LocateResult {
            point: GeoPoint::normalized(outcome.x[0], outcome.x[1]),
            seed,
            residual: outcome.value,
            iterations: outcome.iterations,
            gradient_norm: outcome.gradient_norm,
            function_evaluations: outcome.function_evaluations,
            termination: outcome.termination,
        };

        match result.termination {
            Termination::Converged => debug!(%result, "station located"),
            Termination::MaxIterationsReached => warn!(%result, "locator stopped before converging"),
        }

        Ok(result)
    }
}

/// Locate a station with the default [`LocatorParams`].
pub fn locate(target: &Observation, satellite_longitude: Degree) -> Result<LocateResult> {
    Locator::new().locate(target, satellite_longitude)
}
