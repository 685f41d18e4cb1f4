//! # Observations and ground positions
//!
//! Value types exchanged with the locator:
//!
//! - [`Observation`] – a measured pointing toward a satellite: **magnetic** azimuth
//!   (clockwise from magnetic north) and elevation above the horizon, both in degrees.
//! - [`GeoPoint`] – a ground station position (latitude, longitude) in degrees.
//!
//! Both are small `Copy` values, serializable with `serde` for the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::Degree;
use crate::geoloc_errors::{GeolocError, Result};

/// A measured pointing toward a geostationary satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Compass azimuth, degrees clockwise from magnetic north.
    pub azimuth: Degree,
    /// Elevation above the local horizon, degrees.
    pub elevation: Degree,
}

impl Observation {
    /// Build an observation from a compass azimuth and an elevation.
    ///
    /// Arguments
    /// -----------------
    /// * `azimuth`: compass bearing in degrees, clockwise from magnetic north.
    /// * `elevation`: elevation in degrees above the horizon.
    ///
    /// Return
    /// ----------
    /// * The observation, or [`GeolocError::InvalidObservation`] if either angle is not finite.
    pub fn new(azimuth: Degree, elevation: Degree) -> Result<Self> {
        if !azimuth.is_finite() {
            return Err(GeolocError::InvalidObservation(format!(
                "azimuth must be finite, got {azimuth}"
            )));
        }
        if !elevation.is_finite() {
            return Err(GeolocError::InvalidObservation(format!(
                "elevation must be finite, got {elevation}"
            )));
        }
        Ok(Observation { azimuth, elevation })
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "az {:.4}°, el {:.4}°", self.azimuth, self.elevation)
    }
}

/// Geographic position of a ground station, in degrees (east-positive longitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: Degree,
    pub longitude: Degree,
}

impl GeoPoint {
    pub fn new(latitude: Degree, longitude: Degree) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Bring an unconstrained (latitude, longitude) pair back to the usual ranges.
    ///
    /// The minimizer works on an unbounded plane, so its output may wander past a pole or
    /// around the antimeridian. A latitude beyond ±90° is reflected across the pole and the
    /// longitude shifted by 180°, which leaves the geometric elevation and true azimuth
    /// unchanged; the longitude is then wrapped into [-180, 180).
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: any finite latitude, degrees.
    /// * `longitude`: any finite longitude, degrees.
    ///
    /// Return
    /// ----------
    /// * A point with latitude in [-90, 90] and longitude in [-180, 180).
    pub fn normalized(latitude: Degree, longitude: Degree) -> Self {
        let mut lat = wrap_180(latitude);
        let mut lon = longitude;
        if lat > 90.0 {
            lat = 180.0 - lat;
            lon += 180.0;
        } else if lat < -90.0 {
            lat = -180.0 - lat;
            lon += 180.0;
        }
        GeoPoint {
            latitude: lat,
            longitude: wrap_180(lon),
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat {:.6}°, lon {:.6}°", self.latitude, self.longitude)
    }
}

/// Wrap an angle into [-180, 180).
pub(crate) fn wrap_180(angle: Degree) -> Degree {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod observation_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_observation_rejects_non_finite() {
        assert!(Observation::new(183.7, 56.6).is_ok());
        assert!(matches!(
            Observation::new(f64::NAN, 10.0),
            Err(GeolocError::InvalidObservation(_))
        ));
        assert!(matches!(
            Observation::new(10.0, f64::INFINITY),
            Err(GeolocError::InvalidObservation(_))
        ));
    }

    #[test]
    fn test_normalized_wraps_longitude() {
        let p = GeoPoint::normalized(35.0, -941.0);
        assert_abs_diff_eq!(p.latitude, 35.0);
        assert_abs_diff_eq!(p.longitude, 139.0, epsilon = 1e-12);

        let p = GeoPoint::normalized(10.0, 180.0);
        assert_abs_diff_eq!(p.longitude, -180.0);

        let p = GeoPoint::normalized(-20.0, 359.5);
        assert_abs_diff_eq!(p.longitude, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_normalized_reflects_over_pole() {
        let p = GeoPoint::normalized(100.0, 10.0);
        assert_abs_diff_eq!(p.latitude, 80.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.longitude, -170.0, epsilon = 1e-12);

        let p = GeoPoint::normalized(-95.0, -10.0);
        assert_abs_diff_eq!(p.latitude, -85.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.longitude, 170.0, epsilon = 1e-12);
    }

    #[test]
    fn test_display() {
        let p = GeoPoint::new(28.547, 76.18);
        assert_eq!(p.to_string(), "lat 28.547000°, lon 76.180000°");
        let o = Observation::new(183.7, 56.6).unwrap();
        assert_eq!(o.to_string(), "az 183.7000°, el 56.6000°");
    }
}
