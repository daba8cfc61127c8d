use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::geo::GeoPoint;

use super::error::GeocodeError;
use super::Geocoder;

/// Default number of resolved addresses kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Canonical cache key for an operator-entered address: trimmed, lowercased,
/// internal whitespace collapsed.
pub fn normalize_address(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// LRU cache in front of another [`Geocoder`].
///
/// Only successful resolutions are cached. Failures pass through untouched:
/// a cached `NotFound` would keep rejecting an address the operator has
/// since corrected, and network errors are transient by definition.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Mutex<LruCache<String, GeoPoint>>,
}

impl<G> CachedGeocoder<G> {
    pub fn new(inner: G, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_default_capacity(inner: G) -> Self {
        let capacity =
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("default capacity is non-zero");
        Self::new(inner, capacity)
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    fn resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let key = normalize_address(address);

        if let Some(point) = self
            .cache
            .lock()
            .expect("geocode cache lock poisoned")
            .get(&key)
            .copied()
        {
            tracing::debug!(address = %key, "geocode cache hit");
            return Ok(point);
        }

        let point = self.inner.resolve(address)?;
        self.cache
            .lock()
            .expect("geocode cache lock poisoned")
            .put(key, point);
        Ok(point)
    }
}
