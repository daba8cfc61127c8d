use reqwest::{blocking::Client, Url};

use crate::geo::GeoPoint;

use super::error::GeocodeError;
use super::parser::parse_search_response;
use super::response::PlaceCandidate;
use super::{GeocodeConfig, Geocoder};

/// Thin HTTP client for Nominatim-style address search.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    /// Create a client for the configured endpoint. The configured timeout
    /// bounds every resolve call.
    pub fn new(config: GeocodeConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build geocoding client");
        Self { client, config }
    }

    /// The query actually sent for an operator-entered address: the address
    /// plus the fixed locality suffix.
    fn compose_query(&self, address: &str) -> String {
        let address = address.trim();
        if self.config.locality_suffix.is_empty() {
            address.to_string()
        } else {
            format!("{}, {}", address, self.config.locality_suffix)
        }
    }
}

impl Geocoder for GeocodeClient {
    fn resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let base = format!("{}/search", self.config.endpoint.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|err| GeocodeError::Payload(format!("failed to build lookup URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", &self.compose_query(address));

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(GeocodeError::Network)?;

        let candidates: Vec<PlaceCandidate> = response
            .json()
            .map_err(|err| GeocodeError::Payload(format!("undecodable candidate list: {err}")))?;

        parse_search_response(candidates)
    }
}
