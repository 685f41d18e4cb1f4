//! # Initial guesses for the locator
//!
//! BFGS only finds the minimum of the basin it starts in. Two strategies are offered:
//!
//! - [`SeedStrategy::Fixed`] – a caller-chosen point, `(0°, 0°)` by default. Cheap, and
//!   mainly suited to northern-hemisphere stations: southern stations tend to stall next
//!   to the equator, where the indeterminate-azimuth sentinel breaks up the residual
//!   surface. Prefer [`SeedStrategy::GridSearch`] there, or whenever the rough position is
//!   unknown.
//! - [`SeedStrategy::GridSearch`] – a deterministic lattice scan: a coarse pass over
//!   latitudes [-60°, 60°] and all longitudes, then a fine pass around the best coarse
//!   node. Nodes that cannot see the satellite (geometric elevation below 0°) are skipped.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::Degree;
use crate::look_angles::geometric_elevation;
use crate::observation::GeoPoint;
use crate::residual::PointingResidual;

const SCAN_MIN_LATITUDE: Degree = -60.0;
const SCAN_MAX_LATITUDE: Degree = 60.0;
const SCAN_MIN_LONGITUDE: Degree = -180.0;
const SCAN_MAX_LONGITUDE: Degree = 180.0;

/// Smallest coarse spacing accepted by [`crate::locator::LocatorParamsBuilder::build`].
pub const MIN_COARSE_STEP: Degree = 0.1;
/// Smallest fine spacing accepted by [`crate::locator::LocatorParamsBuilder::build`].
pub const MIN_FINE_STEP: Degree = 1e-4;
/// Largest number of fine-pass intervals per axis (`2·fine_span / fine_step`).
pub const MAX_FINE_INTERVALS: usize = 2000;

/// Spacing of the two lattice passes of [`SeedStrategy::GridSearch`], in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSearchParams {
    /// Spacing of the global coarse pass.
    pub coarse_step: Degree,
    /// Spacing of the local fine pass.
    pub fine_step: Degree,
    /// Half-width of the fine pass around the best coarse node.
    pub fine_span: Degree,
}

impl Default for GridSearchParams {
    fn default() -> Self {
        GridSearchParams {
            coarse_step: 1.0,
            fine_step: 0.01,
            fine_span: 1.0,
        }
    }
}

/// How the locator picks the starting point of the minimization.
///
/// The default is a fixed `(0°, 0°)` seed; see the module docs for when to prefer
/// [`SeedStrategy::GridSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeedStrategy {
    Fixed(GeoPoint),
    GridSearch(GridSearchParams),
}

impl Default for SeedStrategy {
    fn default() -> Self {
        SeedStrategy::Fixed(GeoPoint::new(0.0, 0.0))
    }
}

impl SeedStrategy {
    /// Starting point for minimizing `residual`.
    pub fn initial_point(&self, residual: &PointingResidual) -> GeoPoint {
        match self {
            SeedStrategy::Fixed(point) => *point,
            SeedStrategy::GridSearch(params) => grid_search_seed(residual, params),
        }
    }
}

/// Best lattice node for `residual`, coarse pass first, then refined locally.
///
/// The coarse pass visits `lat = -60 + i·coarse_step` and `lon = -180 + j·coarse_step`
/// without passing the scan bounds. The fine pass visits every `fine_step` node within
/// `±fine_span` of the coarse winner and only replaces it on a strict improvement.
/// Nodes below the geometric horizon are skipped in both passes.
///
/// Arguments
/// -----------------
/// * `residual`: objective bound to the observation and satellite.
/// * `params`: lattice spacings; expected to be positive (checked by
///   [`crate::locator::LocatorParamsBuilder::build`]).
///
/// Return
/// ----------
/// * The lowest-residual visible node, or `(0°, 0°)` if no node sees the satellite.
pub fn grid_search_seed(residual: &PointingResidual, params: &GridSearchParams) -> GeoPoint {
    let mut best: Option<(GeoPoint, f64)> = None;

    let coarse_lat = node_count(SCAN_MAX_LATITUDE - SCAN_MIN_LATITUDE, params.coarse_step);
    let coarse_lon = node_count(SCAN_MAX_LONGITUDE - SCAN_MIN_LONGITUDE, params.coarse_step);
    for i in 0..=coarse_lat {
        let lat = SCAN_MIN_LATITUDE + i as f64 * params.coarse_step;
        for j in 0..=coarse_lon {
            let lon = SCAN_MIN_LONGITUDE + j as f64 * params.coarse_step;
            visit(residual, lat, lon, &mut best);
        }
    }

    let Some((coarse, coarse_value)) = best else {
        debug!("no lattice node sees the satellite, falling back to (0, 0)");
        return GeoPoint::new(0.0, 0.0);
    };

    let fine = node_count(2.0 * params.fine_span, params.fine_step);
    for i in 0..=fine {
        let lat = coarse.latitude - params.fine_span + i as f64 * params.fine_step;
        for j in 0..=fine {
            let lon = coarse.longitude - params.fine_span + j as f64 * params.fine_step;
            visit(residual, lat, lon, &mut best);
        }
    }

    let (seed, value) = best.unwrap_or((coarse, coarse_value));
    debug!(
        latitude = seed.latitude,
        longitude = seed.longitude,
        residual = value,
        coarse_residual = coarse_value,
        "grid search seed selected"
    );
    seed
}

/// Number of whole `step` intervals that fit in `extent`.
pub(crate) fn node_count(extent: Degree, step: Degree) -> usize {
    // the small bias keeps exact divisions such as 2 / 0.01 from losing an interval
    (extent / step + 1e-9).floor() as usize
}

fn visit(
    residual: &PointingResidual,
    lat: Degree,
    lon: Degree,
    best: &mut Option<(GeoPoint, f64)>,
) {
    let horizon = geometric_elevation(residual.satellite_longitude, lat, lon)
        .unwrap_or_else(|err| err.sentinel().unwrap_or(f64::NAN));
    if !(horizon >= 0.0) {
        return;
    }
    let value = residual.evaluate(lat, lon);
    if best.map_or(true, |(_, current)| value < current) {
        *best = Some((GeoPoint::new(lat, lon), value));
    }
}
