//! # Magnetic declination grid
//!
//! A coarse, survey-derived table of **magnetic declination** (east-positive, degrees) sampled
//! every 30° of longitude and on five latitude lines, with bilinear interpolation between
//! the four surrounding nodes.
//!
//! ## Layout
//!
//! The table is indexed `[longitude band][latitude line]`:
//!
//! ```text
//!   band a  : longitude -180 + 30·a      a = 0..=12   (row 12 repeats row 0, wrap seam)
//!   line b  : latitude   60 - 30·b       b = 0..=4    (+60, +30, 0, -30, -60)
//! ```
//!
//! ## Coverage
//!
//! The model covers latitudes in [-60°, 60°). Exactly 60° is nudged just inside the grid;
//! anything at or above `59.999999°`, below `-60°`, or non-finite is reported as
//! [`GeolocError::OutOfMagneticCoverage`]. Longitudes are wrapped onto the grid seam, with
//! exactly 180° nudged to `179.99999°`.
//!
//! ## Example
//!
//! ```rust
//! use geoloc::declination::DECLINATION_GRID;
//!
//! // Nodes return their literal table value.
//! let d = DECLINATION_GRID.declination_at(30.0, -150.0).unwrap();
//! assert_eq!(d, 11.36);
//!
//! // Polar stations are outside the model.
//! assert!(DECLINATION_GRID.declination_at(75.0, 0.0).is_err());
//! ```

use crate::constants::Degree;
use crate::geoloc_errors::{GeolocError, Result};

/// Number of longitude bands stored, including the duplicated seam row.
pub const LONGITUDE_BANDS: usize = 13;

/// Number of latitude lines (+60, +30, 0, -30, -60).
pub const LATITUDE_LINES: usize = 5;

/// Spacing between grid nodes, in degrees, along both axes.
pub const GRID_SPACING_DEG: Degree = 30.0;

const LATITUDE_NUDGED: Degree = 59.99999;
const LATITUDE_LIMIT: Degree = 59.999_999;
const LONGITUDE_NUDGED: Degree = 179.99999;
const LONGITUDE_LIMIT: Degree = 179.999_999;

/// Survey values, one row per longitude band from -180° to +180°.
const DECLINATION_TABLE: [[Degree; LATITUDE_LINES]; LONGITUDE_BANDS] = [
    [2.73, 6.52, 9.69, 16.79, 47.45],
    [15.96, 11.36, 9.27, 17.5, 43.22],
    [18.28, 11.48, 8.62, 16.64, 39.01],
    [-7.5, -0.93, 3.24, 13.32, 28.59],
    [-25.01, -15.4, -15.83, -10.12, 10.0],
    [-15.8, -9.98, -17.7, -24.74, -5.7],
    [-1.43, 0.12, -5.06, -22.39, -20.11],
    [10.72, 4.35, 1.67, -25.4, -41.87],
    [17.47, 2.62, -3.6, -31.48, -62.34],
    [7.54, -0.32, -1.87, -16.13, -74.45],
    [-13.19, -5.43, 0.25, 0.47, -60.84],
    [-11.28, -3.22, 5.04, 10.85, 42.14],
    [2.73, 6.52, 9.69, 16.79, 47.45],
];

/// Process-wide declination model.
pub static DECLINATION_GRID: DeclinationGrid = DeclinationGrid::new();

/// Immutable magnetic declination table with bilinear lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclinationGrid {
    table: [[Degree; LATITUDE_LINES]; LONGITUDE_BANDS],
}

impl Default for DeclinationGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclinationGrid {
    pub const fn new() -> Self {
        DeclinationGrid {
            table: DECLINATION_TABLE,
        }
    }

    /// Literal sample at a grid node, if the indices are inside the table.
    ///
    /// `band` counts longitude bands eastward from -180°, `line` counts latitude lines
    /// southward from +60°.
    pub fn sample(&self, band: usize, line: usize) -> Option<Degree> {
        self.table.get(band)?.get(line).copied()
    }

    /// Interpolated magnetic declination at a station.
    ///
    /// The latitude axis is interpolated first, independently in the western and eastern
    /// longitude bands bracketing the station, then the two results are blended along
    /// longitude. Offsets are measured from the southern and western edges of the cell.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: station latitude in degrees.
    /// * `longitude`: station longitude in degrees, any range.
    ///
    /// Return
    /// ----------
    /// * The declination in degrees (east positive), or
    ///   [`GeolocError::OutOfMagneticCoverage`] (with `true_azimuth: None`) when the station
    ///   lies outside the model.
    pub fn declination_at(&self, latitude: Degree, longitude: Degree) -> Result<Degree> {
        let out_of_coverage = || GeolocError::OutOfMagneticCoverage {
            latitude,
            longitude,
            true_azimuth: None,
        };

        let lat = clamp_latitude(latitude).ok_or_else(out_of_coverage)?;
        let lon = wrap_longitude(longitude).ok_or_else(out_of_coverage)?;

        let lat_band = (((lat + 60.0) / GRID_SPACING_DEG).floor() as usize).min(3);
        let band = (((lon + 180.0) / GRID_SPACING_DEG).floor() as usize).min(11);
        let line = 3 - lat_band;

        let lat_offset = lat - (-60.0 + GRID_SPACING_DEG * lat_band as f64);
        let long_offset = lon + 180.0 - GRID_SPACING_DEG * band as f64;

        let west_north = self.sample(band, line).ok_or_else(out_of_coverage)?;
        let west_south = self.sample(band, line + 1).ok_or_else(out_of_coverage)?;
        let east_north = self.sample(band + 1, line).ok_or_else(out_of_coverage)?;
        let east_south = self.sample(band + 1, line + 1).ok_or_else(out_of_coverage)?;

        let u1 = west_south + (west_north - west_south) * lat_offset / GRID_SPACING_DEG;
        let u2 = east_south + (east_north - east_south) * lat_offset / GRID_SPACING_DEG;
        Ok(u1 + (u2 - u1) * long_offset / GRID_SPACING_DEG)
    }
}

/// Nudge the northern edge inside the grid and reject latitudes it does not cover.
fn clamp_latitude(latitude: Degree) -> Option<Degree> {
    let lat = if latitude == 60.0 {
        LATITUDE_NUDGED
    } else {
        latitude
    };
    // written so that NaN falls through to None
    if lat >= -60.0 && lat < LATITUDE_LIMIT {
        Some(lat)
    } else {
        None
    }
}

/// Map a longitude onto the grid seam: exactly 180° is nudged west, anything past the
/// nudged edge or below -180° is wrapped by whole turns.
fn wrap_longitude(longitude: Degree) -> Option<Degree> {
    if !longitude.is_finite() {
        return None;
    }
    if longitude == 180.0 {
        return Some(LONGITUDE_NUDGED);
    }
    if longitude > LONGITUDE_LIMIT || longitude < -180.0 {
        let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
        return Some(if wrapped >= 180.0 {
            LONGITUDE_NUDGED
        } else {
            wrapped
        });
    }
    Some(longitude)
}

#[cfg(test)]
mod declination_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_nodes_return_literal_values() {
        // 60° is nudged and the 180° seam is nudged, so skip those nodes
        for band in 0..12 {
            for line in 1..LATITUDE_LINES {
                let lat = 60.0 - GRID_SPACING_DEG * line as f64;
                let lon = -180.0 + GRID_SPACING_DEG * band as f64;
                let expected = DECLINATION_TABLE[band][line];
                assert_eq!(
                    DECLINATION_GRID.declination_at(lat, lon).unwrap(),
                    expected,
                    "node ({lat}, {lon})"
                );
            }
        }
    }

    #[test]
    fn test_seam_rows_match() {
        assert_eq!(DECLINATION_TABLE[0], DECLINATION_TABLE[LONGITUDE_BANDS - 1]);
    }

    #[test]
    fn test_interpolated_values() {
        let d = DECLINATION_GRID.declination_at(28.547, 76.18).unwrap();
        assert_abs_diff_eq!(d, 0.8550930575555553, epsilon = 1e-12);

        // cell centers are the mean of their four corners
        let d = DECLINATION_GRID.declination_at(45.0, -165.0).unwrap();
        assert_abs_diff_eq!(d, (2.73 + 6.52 + 15.96 + 11.36) / 4.0, epsilon = 1e-12);

        let d = DECLINATION_GRID.declination_at(-45.0, 15.0).unwrap();
        assert_abs_diff_eq!(d, (-22.39 - 20.11 - 25.4 - 41.87) / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_latitude_coverage() {
        assert!(DECLINATION_GRID.declination_at(60.0, 10.0).is_ok());
        assert!(DECLINATION_GRID.declination_at(-60.0, 10.0).is_ok());
        assert!(DECLINATION_GRID.declination_at(59.99999, 10.0).is_ok());

        for lat in [59.999_999, 59.999_999_5, 60.5, 75.0, 90.0, -60.000_001, -89.0, f64::NAN] {
            let err = DECLINATION_GRID.declination_at(lat, 10.0).unwrap_err();
            assert!(matches!(
                err,
                GeolocError::OutOfMagneticCoverage {
                    true_azimuth: None,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_longitude_wrapping() {
        let seam = DECLINATION_GRID.declination_at(20.0, 180.0).unwrap();
        let nudged = DECLINATION_GRID.declination_at(20.0, 179.99999).unwrap();
        assert_eq!(seam, nudged);

        let east = DECLINATION_GRID.declination_at(20.0, 200.0).unwrap();
        let west = DECLINATION_GRID.declination_at(20.0, -160.0).unwrap();
        assert_abs_diff_eq!(east, west, epsilon = 1e-12);

        let far = DECLINATION_GRID.declination_at(-10.0, -935.0).unwrap();
        let near = DECLINATION_GRID.declination_at(-10.0, 145.0).unwrap();
        assert_abs_diff_eq!(far, near, epsilon = 1e-9);

        // the wrap seam is continuous
        let left = DECLINATION_GRID.declination_at(10.0, 179.999_99).unwrap();
        let right = DECLINATION_GRID.declination_at(10.0, -180.0).unwrap();
        assert_abs_diff_eq!(left, right, epsilon = 1e-5);

        assert!(DECLINATION_GRID.declination_at(10.0, f64::NAN).is_err());
        assert!(DECLINATION_GRID.declination_at(10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_sample_bounds() {
        assert_eq!(DECLINATION_GRID.sample(0, 0), Some(2.73));
        assert_eq!(DECLINATION_GRID.sample(12, 4), Some(47.45));
        assert_eq!(DECLINATION_GRID.sample(13, 0), None);
        assert_eq!(DECLINATION_GRID.sample(0, 5), None);
    }
}
