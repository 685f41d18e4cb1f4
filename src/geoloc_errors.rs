use thiserror::Error;

use crate::constants::{
    Degree, SquaredDegree, INDETERMINATE_AZIMUTH_SENTINEL, OUT_OF_COVERAGE_OFFSET,
};
use crate::observation::GeoPoint;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeolocError {
    #[error("Azimuth is indeterminate for a station on the equator (latitude {latitude})")]
    IndeterminateAzimuth { latitude: Degree },

    #[error("Station ({latitude}, {longitude}) is outside the magnetic declination model")]
    OutOfMagneticCoverage {
        latitude: Degree,
        longitude: Degree,
        /// True azimuth computed before the declination lookup, when available.
        true_azimuth: Option<Degree>,
    },

    #[error("Singular elevation geometry (station aligned with the sub-satellite axis), limit {limit}")]
    SingularGeometry { limit: Degree },

    #[error("Optimization stopped after {iterations} iterations without converging (residual {residual}) at {best}")]
    OptimizationDidNotConverge {
        best: GeoPoint,
        iterations: usize,
        residual: SquaredDegree,
    },

    #[error("Line search failed to find a descent step after {iterations} iterations (value {value}, gradient norm {gradient_norm})")]
    LineSearchFailed {
        iterations: usize,
        value: f64,
        gradient_norm: f64,
    },

    #[error("Objective is not finite at the initial point: {0}")]
    NonFiniteObjective(f64),

    #[error("Invalid minimizer parameter: {0}")]
    InvalidMinimizerParameter(String),

    #[error("Invalid locator parameter: {0}")]
    InvalidLocatorParameter(String),

    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
}

impl GeolocError {
    /// Numeric value reported for this condition by legacy pointing tables.
    ///
    /// Return
    /// ----------
    /// * `Some(999.0)` for [`GeolocError::IndeterminateAzimuth`].
    /// * `Some(true_azimuth + 1000.0)` for [`GeolocError::OutOfMagneticCoverage`] when the
    ///   true azimuth is known.
    /// * `Some(limit)` for [`GeolocError::SingularGeometry`].
    /// * `None` for every other variant.
    pub fn sentinel(&self) -> Option<Degree> {
        match self {
            GeolocError::IndeterminateAzimuth { .. } => Some(INDETERMINATE_AZIMUTH_SENTINEL),
            GeolocError::OutOfMagneticCoverage { true_azimuth, .. } => {
                true_azimuth.map(|az| az + OUT_OF_COVERAGE_OFFSET)
            }
            GeolocError::SingularGeometry { limit } => Some(*limit),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeolocError>;
