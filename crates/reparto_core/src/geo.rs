//! Geographic coordinate type shared by geocoding, delivery records and the
//! map display.

use thiserror::Error;

/// A latitude/longitude pair that failed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinates out of range: lat {lat}, lon {lon}")]
pub struct InvalidCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Geographic position in decimal degrees.
///
/// Construction validates latitude to [-90, 90] and longitude to
/// [-180, 180]; a `GeoPoint` in hand is always displayable on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinates> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
        if !lat_ok || !lon_ok {
            return Err(InvalidCoordinates { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}
