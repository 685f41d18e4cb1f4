//! # Pointing residual
//!
//! Squared angular mismatch between the look angles predicted at a candidate station and a
//! measured [`Observation`]:
//!
//! ```text
//! r(lat, lon) = (elevation(lat, lon) − el_obs)² + (azimuth_magnetic(lat, lon) − az_obs)²
//! ```
//!
//! Both terms are in degrees² and carry equal weight. Degenerate stations are scored with
//! the legacy sentinel values (`999`, `true azimuth + 1000`, singular elevation limit), so the
//! residual is huge but finite there and the minimizer steers away from them.
use nalgebra::Vector2;

use crate::constants::{Degree, SquaredDegree};
use crate::look_angles::{azimuth_magnetic_or_sentinel, elevation_or_sentinel};
use crate::minimizer::Objective;
use crate::observation::Observation;

/// Residual of one observation against the look-angle model of one satellite.
///
/// The minimizer parameter vector is `[latitude, longitude]`, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointingResidual {
    pub target: Observation,
    pub satellite_longitude: Degree,
}

impl PointingResidual {
    pub fn new(target: Observation, satellite_longitude: Degree) -> Self {
        PointingResidual {
            target,
            satellite_longitude,
        }
    }

    /// Squared error at a candidate station.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: candidate latitude, degrees.
    /// * `longitude`: candidate longitude, degrees.
    ///
    /// Return
    /// ----------
    /// * `Δel² + Δaz²` in degrees², non-negative.
    pub fn evaluate(&self, latitude: Degree, longitude: Degree) -> SquaredDegree {
        let el = elevation_or_sentinel(self.satellite_longitude, latitude, longitude);
        let az = azimuth_magnetic_or_sentinel(self.satellite_longitude, latitude, longitude);
        (el - self.target.elevation).powi(2) + (az - self.target.azimuth).powi(2)
    }
}

impl Objective<2> for PointingResidual {
    fn value(&self, x: &Vector2<f64>) -> f64 {
        self.evaluate(x[0], x[1])
    }
}

#[cfg(test)]
mod residual_test {
    use super::*;
    use crate::look_angles::look_angles;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_at_own_look_angles() {
        let angles = look_angles(74.0, 28.547, 76.18).unwrap();
        let target = Observation::new(angles.azimuth, angles.elevation).unwrap();
        let residual = PointingResidual::new(target, 74.0);
        assert_eq!(residual.evaluate(28.547, 76.18), 0.0);
        assert!(residual.evaluate(28.6, 76.18) > 0.0);
    }

    #[test]
    fn test_sum_of_squares() {
        let target = Observation::new(183.7, 56.6).unwrap();
        let residual = PointingResidual::new(target, 74.0);
        let expected = (56.60029523010843 - 56.6_f64).powi(2)
            + (183.69931232506514 - 183.7_f64).powi(2);
        assert_abs_diff_eq!(residual.evaluate(28.547, 76.18), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(
            residual.value(&Vector2::new(28.547, 76.18)),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degenerate_stations_use_sentinels() {
        let target = Observation::new(183.7, 56.6).unwrap();
        let residual = PointingResidual::new(target, 74.0);

        // equator: azimuth sentinel 999
        let r = residual.evaluate(0.0, 0.0);
        assert!(r.is_finite());
        assert!(r > (999.0_f64 - 183.7).powi(2));

        // polar station: true azimuth + 1000
        let r = residual.evaluate(70.0, 76.0);
        assert!(r.is_finite());
        assert!(r > 1000.0_f64.powi(2) * 0.5);
    }
}
