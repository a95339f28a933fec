//! UTM zone selection

use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{Hemisphere, UtmZone};
use geo::Point;

/// Southern limit of the UTM system in degrees
pub const MIN_LATITUDE: f64 = -80.0;
/// Northern limit of the UTM system in degrees
pub const MAX_LATITUDE: f64 = 84.0;

/// Select the UTM zone for a WGS84 point (`x` = longitude, `y` = latitude)
pub fn zone_for(point: Point<f64>) -> Result<UtmZone> {
    let (lon, lat) = (point.x(), point.y());
    if !lat.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
        return Err(CoverageError::LatitudeOutOfRange { latitude: lat });
    }
    if !lon.is_finite() {
        return Err(CoverageError::Projection { reason: format!("non-finite longitude {}", lon) });
    }

    let zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8;
    let hemisphere = if lat >= 0.0 { Hemisphere::North } else { Hemisphere::South };

    Ok(UtmZone::new(zone, hemisphere))
}
