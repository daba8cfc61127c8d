//! Free-text address resolution against a Nominatim-style lookup service.
//!
//! This module wraps a blocking HTTP client and exposes the small [`Geocoder`]
//! seam the assignment pipeline depends on, so tests and embedded callers can
//! substitute fakes without touching the network.

mod cache;
mod client;
mod error;
mod parser;
mod response;

pub use cache::{normalize_address, CachedGeocoder, DEFAULT_CACHE_CAPACITY};
pub use client::GeocodeClient;
pub use error::GeocodeError;

use std::time::Duration;

use crate::geo::GeoPoint;

/// Default public lookup endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// Locality bias appended to every operator-entered address.
pub const DEFAULT_LOCALITY_SUFFIX: &str = "San Miguel de Tucumán, Tucumán, Argentina";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves a free-text address to coordinates.
///
/// `resolve` must be a pure function of the address text: same input, same
/// outbound request. Callers own retry policy; implementations never retry.
pub trait Geocoder: Send + Sync {
    fn resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError>;
}

/// Connection settings for [`GeocodeClient`].
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Base URL of the lookup service.
    pub endpoint: String,
    /// Fixed locality/country suffix appended to each query for
    /// disambiguation. Empty string disables the bias.
    pub locality_suffix: String,
    /// Upper bound on each resolve call, connection time included.
    pub timeout: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            locality_suffix: DEFAULT_LOCALITY_SUFFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeocodeConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_locality_suffix(mut self, suffix: &str) -> Self {
        self.locality_suffix = suffix.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
