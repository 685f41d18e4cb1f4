use approx::assert_abs_diff_eq;
use geoloc::constants::Degree;
use geoloc::look_angles::look_angles;
use geoloc::{GeoPoint, LocateResult, Observation};

/// Observation a station at (`latitude`, `longitude`) would make toward the satellite.
pub fn observation_from(
    latitude: Degree,
    longitude: Degree,
    satellite_longitude: Degree,
) -> Observation {
    let angles = look_angles(satellite_longitude, latitude, longitude)
        .expect("test station must have well-defined look angles");
    Observation::new(angles.azimuth, angles.elevation).unwrap()
}

/// Check that the located station sees the target within `epsilon` degrees.
pub fn assert_reproduces(
    result: &LocateResult,
    target: &Observation,
    satellite_longitude: Degree,
    epsilon: f64,
) {
    assert!(result.converged(), "did not converge: {result}");
    let GeoPoint {
        latitude,
        longitude,
    } = result.point;
    let angles = look_angles(satellite_longitude, latitude, longitude).unwrap();
    assert_abs_diff_eq!(angles.azimuth, target.azimuth, epsilon = epsilon);
    assert_abs_diff_eq!(angles.elevation, target.elevation, epsilon = epsilon);
}
