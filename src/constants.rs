//! # Constants and type definitions for geoloc
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **unit
//! aliases** used by the look-angle model and the locator.
//!
//! ## Overview
//!
//! - Earth and geostationary orbit geometry (Clarke-orbit values)
//! - The historical degree/radian factor `57.29578`
//! - Atmospheric refraction constants
//! - Numeric sentinels kept for compatibility with legacy pointing tables
//!
//! None of these values are configurable: they encode the reference geometry the
//! pointing tables were produced with.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees per radian, truncated to the value used by classic antenna pointing tables.
///
/// This is **not** `180/π`; the small deviation is part of the reference model and is used
/// for both degree → radian and radian → degree conversions in [`crate::look_angles`].
pub const DEG_PER_RAD: f64 = 57.29578;

/// Earth equatorial radius in kilometers used by the pointing model
pub const EARTH_RADIUS_KM: Kilometer = 6378.16;

/// Mean Earth radius in kilometers, used for ground range estimates
pub const MEAN_EARTH_RADIUS_KM: Kilometer = 6371.0;

/// Altitude of the geostationary orbit above the equator, in kilometers
pub const GEO_ALTITUDE_KM: Kilometer = 35786.0;

/// Geostationary orbit radius expressed in Earth radii (r₁ = 1 + h / R)
pub const ORBIT_RADIUS_RATIO: f64 = 1.0 + GEO_ALTITUDE_KM / EARTH_RADIUS_KM;

/// Below this geometric elevation the refraction correction is applied
pub const REFRACTION_THRESHOLD_DEG: Degree = 30.0;

/// Additive constant of the empirical refraction formula `(e + sqrt(e² + c)) / 2`
pub const REFRACTION_CONSTANT: f64 = 4.132;

// -------------------------------------------------------------------------------------------------
// Legacy sentinels
// -------------------------------------------------------------------------------------------------

/// Azimuth reported for a station exactly on the equator (azimuth indeterminate)
pub const INDETERMINATE_AZIMUTH_SENTINEL: Degree = 999.0;

/// Offset added to the true azimuth when the station is outside the declination model
pub const OUT_OF_COVERAGE_OFFSET: Degree = 1000.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Squared angular error, in degrees²
pub type SquaredDegree = f64;
