//! # Look angles toward a geostationary satellite
//!
//! Closed-form forward model mapping a ground station (latitude, longitude) and a
//! geostationary satellite longitude to the **elevation** and **magnetic azimuth** an
//! observer would read on a compass-referenced mount.
//!
//! ## Model
//!
//! With Δ the station/satellite longitude difference, φ the station latitude and
//! r₁ = [`ORBIT_RADIUS_RATIO`]:
//!
//! ```text
//! term1 = r₁·cosφ·cosΔ − 1
//! term2 = r₁·sqrt(1 − cos²φ·cos²Δ)
//! elevation = atan(term1 / term2)                  (+ refraction below 30°)
//! azimuth   = 180 + atan(tanΔ / sinφ)              (southern flip, then − declination)
//! ```
//!
//! Angles are converted with [`DEG_PER_RAD`] (`57.29578`) in both directions, not with
//! `to_radians`, so the results match legacy pointing tables to the last digit.
//!
//! ## Errors and sentinels
//!
//! Degenerate geometries are reported as typed errors:
//!
//! | Condition                                  | Error                                         | Legacy value          |
//! |--------------------------------------------|-----------------------------------------------|-----------------------|
//! | station on the equator                     | [`GeolocError::IndeterminateAzimuth`]         | `999`                 |
//! | station outside the declination model      | [`GeolocError::OutOfMagneticCoverage`]        | `true azimuth + 1000` |
//! | station on the sub-satellite axis          | [`GeolocError::SingularGeometry`]             | limiting elevation    |
//!
//! The `*_or_sentinel` functions collapse these errors back into the legacy numbers; the
//! residual minimized by [`crate::locator`] is built on them.

use serde::{Deserialize, Serialize};

use crate::constants::{
    Degree, Kilometer, Radian, DEG_PER_RAD, GEO_ALTITUDE_KM, MEAN_EARTH_RADIUS_KM,
    ORBIT_RADIUS_RATIO, REFRACTION_CONSTANT, REFRACTION_THRESHOLD_DEG,
};
use crate::declination::DECLINATION_GRID;
use crate::geoloc_errors::{GeolocError, Result};

/// Elevation and magnetic azimuth seen from one station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookAngles {
    pub azimuth: Degree,
    pub elevation: Degree,
}

/// Convert degrees to radians with the pointing-table factor.
#[inline]
fn to_rad(angle: Degree) -> Radian {
    angle / DEG_PER_RAD
}

/// Elevation of the satellite above the geometric horizon, without refraction.
///
/// Arguments
/// -----------------
/// * `satellite_longitude`: orbital longitude of the satellite, degrees east.
/// * `latitude`: station latitude, degrees.
/// * `longitude`: station longitude, degrees east.
///
/// Return
/// ----------
/// * The geometric elevation in degrees (negative below the horizon), or
///   [`GeolocError::SingularGeometry`] when `term2` vanishes, i.e. the station sits on the
///   equator at the sub-satellite point or its antipode. The error carries the limiting
///   value `±90°` approached by the formula.
pub fn geometric_elevation(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Result<Degree> {
    let delta = to_rad(longitude - satellite_longitude);
    let phi = to_rad(latitude);

    let term1 = ORBIT_RADIUS_RATIO * phi.cos() * delta.cos() - 1.0;
    let term2 = ORBIT_RADIUS_RATIO * (1.0 - phi.cos().powi(2) * delta.cos().powi(2)).sqrt();

    if term2 == 0.0 {
        return Err(GeolocError::SingularGeometry {
            limit: DEG_PER_RAD * term1.atan2(term2),
        });
    }
    Ok(DEG_PER_RAD * (term1 / term2).atan())
}

/// Empirical atmospheric refraction applied near the horizon.
///
/// Below [`REFRACTION_THRESHOLD_DEG`] the apparent elevation is
/// `(e + sqrt(e² + 4.132)) / 2`; at and above it the geometric value is returned unchanged.
///
/// The two branches do not meet: just below 30° the corrected value is about `30.0344°`,
/// so the apparent elevation jumps by roughly `0.0344°` across the threshold.
pub fn refraction_correction(elevation: Degree) -> Degree {
    if elevation < REFRACTION_THRESHOLD_DEG {
        (elevation + (elevation * elevation + REFRACTION_CONSTANT).sqrt()) / 2.0
    } else {
        elevation
    }
}

/// Apparent elevation (geometric elevation plus refraction), in degrees.
///
/// A singular geometry is still reported as [`GeolocError::SingularGeometry`], with the
/// refracted limiting value as `limit`.
pub fn elevation(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Result<Degree> {
    match geometric_elevation(satellite_longitude, latitude, longitude) {
        Ok(e) => Ok(refraction_correction(e)),
        Err(GeolocError::SingularGeometry { limit }) => Err(GeolocError::SingularGeometry {
            limit: refraction_correction(limit),
        }),
        Err(e) => Err(e),
    }
}

/// Bearing to the satellite from true north, clockwise, in [0, 360).
///
/// Arguments
/// -----------------
/// * `satellite_longitude`: orbital longitude of the satellite, degrees east.
/// * `latitude`: station latitude, degrees.
/// * `longitude`: station longitude, degrees east.
///
/// Return
/// ----------
/// * The true azimuth, or [`GeolocError::IndeterminateAzimuth`] if `sin(latitude)` is
///   exactly zero.
pub fn true_azimuth(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Result<Degree> {
    let delta = to_rad(longitude - satellite_longitude);
    let sin_lat = to_rad(latitude).sin();

    if sin_lat == 0.0 {
        return Err(GeolocError::IndeterminateAzimuth { latitude });
    }

    let mut azimuth = 180.0 + DEG_PER_RAD * (delta.tan() / sin_lat).atan();
    if latitude < 0.0 {
        azimuth -= 180.0;
    }
    if azimuth < 0.0 {
        azimuth += 360.0;
    }
    Ok(azimuth)
}

/// Bearing to the satellite from **magnetic** north, as read on a compass.
///
/// The true azimuth is corrected by the interpolated declination of
/// [`DECLINATION_GRID`] and brought into (-180, 360].
///
/// Return
/// ----------
/// * The magnetic azimuth in degrees.
/// * [`GeolocError::IndeterminateAzimuth`] for a station on the equator.
/// * [`GeolocError::OutOfMagneticCoverage`] with `true_azimuth` filled in when the station
///   lies outside the declination model.
pub fn azimuth_magnetic(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Result<Degree> {
    let azimuth = true_azimuth(satellite_longitude, latitude, longitude)?;

    let declination = DECLINATION_GRID
        .declination_at(latitude, longitude)
        .map_err(|_| GeolocError::OutOfMagneticCoverage {
            latitude,
            longitude,
            true_azimuth: Some(azimuth),
        })?;

    let mut adjusted = azimuth - declination;
    if adjusted < -180.0 {
        adjusted += 360.0;
    }
    if adjusted > 360.0 {
        adjusted -= 360.0;
    }
    Ok(adjusted)
}

/// Elevation and magnetic azimuth for one station.
pub fn look_angles(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Result<LookAngles> {
    Ok(LookAngles {
        azimuth: azimuth_magnetic(satellite_longitude, latitude, longitude)?,
        elevation: elevation(satellite_longitude, latitude, longitude)?,
    })
}

/// [`elevation`], with a singular geometry collapsed to its limiting value.
pub fn elevation_or_sentinel(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Degree {
    elevation(satellite_longitude, latitude, longitude)
        .unwrap_or_else(|err| err.sentinel().unwrap_or(f64::NAN))
}

/// [`azimuth_magnetic`], with degenerate stations collapsed to the legacy sentinels
/// (`999` on the equator, `true azimuth + 1000` outside the declination model).
pub fn azimuth_magnetic_or_sentinel(
    satellite_longitude: Degree,
    latitude: Degree,
    longitude: Degree,
) -> Degree {
    azimuth_magnetic(satellite_longitude, latitude, longitude)
        .unwrap_or_else(|err| err.sentinel().unwrap_or(f64::NAN))
}

/// Great-circle distance between the station and the sub-satellite point.
///
/// Uses a spherical Earth of radius [`MEAN_EARTH_RADIUS_KM`]; the elevation is converted
/// with the exact `π/180` factor.
///
/// Arguments
/// -----------------
/// * `elevation`: elevation of the satellite above the horizon, degrees.
///
/// Return
/// ----------
/// * Ground distance in kilometers: `0` at zenith, growing toward the visibility edge.
pub fn subsatellite_distance_km(elevation: Degree) -> Kilometer {
    let el = elevation.to_radians();
    let ratio = 1.0 + GEO_ALTITUDE_KM / MEAN_EARTH_RADIUS_KM;
    let central_angle = std::f64::consts::FRAC_PI_2 - el - (el.cos() / ratio).asin();
    MEAN_EARTH_RADIUS_KM * central_angle
}

#[cfg(test)]
mod look_angles_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_elevation_reference_values() {
        assert_abs_diff_eq!(
            elevation(74.0, 28.547, 76.18).unwrap(),
            56.60029523010843,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            elevation(13.0, 40.1234, 10.5678).unwrap(),
            43.51765662711436,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            elevation(20.0, -33.9249, 18.4241).unwrap(),
            50.52423087354998,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_elevation_low_is_refracted() {
        let raw = geometric_elevation(74.0, 60.0, 0.0).unwrap();
        assert!(raw < 0.0);
        let apparent = elevation(74.0, 60.0, 0.0).unwrap();
        assert_abs_diff_eq!(apparent, 0.6992445964211209, epsilon = 1e-9);
        assert!(apparent > 0.0);
    }

    #[test]
    fn test_refraction_branch_jump() {
        assert_eq!(refraction_correction(30.0), 30.0);
        assert_eq!(refraction_correction(45.0), 45.0);

        let below = refraction_correction(30.0 - 1e-7);
        assert_abs_diff_eq!(below - 30.0, 0.034393802, epsilon = 1e-6);

        // continuous inside the refracted branch
        let a = refraction_correction(10.0);
        let b = refraction_correction(10.0 + 1e-9);
        assert!((b - a).abs() < 1e-8);
    }

    #[test]
    fn test_singular_geometry() {
        // sub-satellite point on the equator
        let err = geometric_elevation(74.0, 0.0, 74.0).unwrap_err();
        match err {
            GeolocError::SingularGeometry { limit } => {
                assert_abs_diff_eq!(limit, 90.0, epsilon = 1e-4)
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(matches!(
            elevation(74.0, 0.0, 74.0),
            Err(GeolocError::SingularGeometry { .. })
        ));
        // a hair off the axis the formula is regular again
        assert!(elevation(74.0, 1e-3, 74.0).unwrap() > 89.99);

        assert_abs_diff_eq!(
            elevation_or_sentinel(74.0, 0.0, 74.0),
            90.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_azimuth_reference_values() {
        assert_abs_diff_eq!(
            azimuth_magnetic(74.0, 28.547, 76.18).unwrap(),
            183.69931232506514,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            azimuth_magnetic(13.0, 40.1234, 10.5678).unwrap(),
            174.20057301313196,
            epsilon = 1e-9
        );
        // southern hemisphere: satellite to the north
        assert_abs_diff_eq!(
            azimuth_magnetic(20.0, -33.9249, 18.4241).unwrap(),
            28.26886082462294,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_true_azimuth_quadrants() {
        // satellite due south of a northern station, due north of a southern one
        assert_abs_diff_eq!(true_azimuth(10.0, 45.0, 10.0).unwrap(), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(true_azimuth(10.0, -45.0, 10.0).unwrap(), 0.0, epsilon = 1e-12);

        // satellite to the east of a southern station lands in the first quadrant
        let az = true_azimuth(30.0, -30.0, 10.0).unwrap();
        assert!(az > 0.0 && az < 90.0);
        // and to the west in the fourth
        let az = true_azimuth(-10.0, -30.0, 10.0).unwrap();
        assert!(az > 270.0 && az < 360.0);
    }

    #[test]
    fn test_equator_sentinel() {
        for lon in [-120.0, 0.0, 37.5, 74.0, 179.0] {
            assert_eq!(azimuth_magnetic_or_sentinel(74.0, 0.0, lon), 999.0);
            assert!(matches!(
                azimuth_magnetic(74.0, 0.0, lon),
                Err(GeolocError::IndeterminateAzimuth { .. })
            ));
        }
    }

    #[test]
    fn test_out_of_coverage_sentinel() {
        for lon in [-40.0, 10.0, 76.0] {
            let true_az = true_azimuth(74.0, 75.0, lon).unwrap();
            assert_eq!(
                azimuth_magnetic_or_sentinel(74.0, 75.0, lon),
                true_az + 1000.0
            );
        }
        assert_abs_diff_eq!(
            azimuth_magnetic_or_sentinel(74.0, 75.0, 76.0),
            1182.0704920060507,
            epsilon = 1e-9
        );

        let true_az = true_azimuth(74.0, -65.0, 70.0).unwrap();
        match azimuth_magnetic(74.0, -65.0, 70.0).unwrap_err() {
            GeolocError::OutOfMagneticCoverage {
                true_azimuth: Some(az),
                ..
            } => assert_eq!(az, true_az),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_look_angles_bundle() {
        let angles = look_angles(74.0, 28.547, 76.18).unwrap();
        assert_eq!(angles.azimuth, azimuth_magnetic(74.0, 28.547, 76.18).unwrap());
        assert_eq!(angles.elevation, elevation(74.0, 28.547, 76.18).unwrap());
        assert!(look_angles(74.0, 0.0, 76.18).is_err());
    }

    #[test]
    fn test_subsatellite_distance() {
        assert_abs_diff_eq!(subsatellite_distance_km(90.0), 0.0, epsilon = 1e-9);

        let near = subsatellite_distance_km(60.0);
        let far = subsatellite_distance_km(10.0);
        assert!(near < far);

        // horizon: central angle acos(R / (R + h))
        let horizon = subsatellite_distance_km(0.0);
        let expected = MEAN_EARTH_RADIUS_KM
            * (MEAN_EARTH_RADIUS_KM / (MEAN_EARTH_RADIUS_KM + GEO_ALTITUDE_KM)).acos();
        assert_abs_diff_eq!(horizon, expected, epsilon = 1e-6);
    }
}
