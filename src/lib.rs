//! Locate a ground station from the compass azimuth and elevation it measures toward a
//! geostationary satellite.
//!
//! The forward model ([`look_angles`]) predicts the look angles of any station; the
//! [`locator`] inverts it with a BFGS minimizer ([`minimizer`]) over the squared pointing
//! error ([`residual`]).
pub mod constants;
pub mod declination;
pub mod geoloc_errors;
pub mod locator;
pub mod look_angles;
pub mod minimizer;
pub mod observation;
pub mod residual;
pub mod seed;

pub use geoloc_errors::{GeolocError, Result};
pub use locator::{locate, LocateResult, Locator, LocatorParams};
pub use observation::{GeoPoint, Observation};
