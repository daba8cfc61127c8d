#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use reparto_core::geo::GeoPoint;
use reparto_core::geocode::{GeocodeError, Geocoder};
use reparto_core::pipeline::AssignmentRequest;

/// Seeded depot coordinates so every test reuses the same geography.
pub fn depot_point() -> GeoPoint {
    GeoPoint::new(-26.8241, -65.2226).expect("depot coordinates are valid")
}

/// A plain in-range point distinct from the depot.
pub fn sample_point() -> GeoPoint {
    GeoPoint::new(10.0, 20.0).expect("sample coordinates are valid")
}

pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 5).expect("sample date is valid")
}

pub fn sample_request(courier: &str, address: &str) -> AssignmentRequest {
    AssignmentRequest {
        courier_name: courier.to_string(),
        address: address.to_string(),
        delivery_date: sample_date(),
        order_id: None,
    }
}

/// Geocoder fake returning a fixed outcome and counting resolve calls.
pub struct ScriptedGeocoder {
    outcome: Result<GeoPoint, fn() -> GeocodeError>,
    pub calls: AtomicUsize,
}

impl ScriptedGeocoder {
    pub fn resolving_to(point: GeoPoint) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(point),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing_with(error: fn() -> GeocodeError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for ScriptedGeocoder {
    fn resolve(&self, _address: &str) -> Result<GeoPoint, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(point) => Ok(*point),
            Err(make_error) => Err(make_error()),
        }
    }
}
