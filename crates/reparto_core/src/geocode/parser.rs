use crate::geo::GeoPoint;

use super::error::GeocodeError;
use super::response::PlaceCandidate;

/// Take the first candidate (rank 0) as authoritative and turn it into a
/// validated coordinate pair.
pub(super) fn parse_search_response(
    candidates: Vec<PlaceCandidate>,
) -> Result<GeoPoint, GeocodeError> {
    let first = candidates.into_iter().next().ok_or(GeocodeError::NotFound)?;

    let lat = parse_coordinate("lat", &first.lat)?;
    let lon = parse_coordinate("lon", &first.lon)?;

    GeoPoint::new(lat, lon).map_err(|err| GeocodeError::Payload(err.to_string()))
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64, GeocodeError> {
    raw.trim().parse::<f64>().map_err(|_| {
        GeocodeError::Payload(format!("candidate `{field}` is not a decimal: `{raw}`"))
    })
}
