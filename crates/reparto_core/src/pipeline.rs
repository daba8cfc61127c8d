//! Delivery assignment: geocode first, persist second.
//!
//! The pipeline is the single write path for delivery records. It owns the
//! ordering invariant behind the record store's data model: a record only
//! exists once its address resolved to coordinates, so a geocoding failure
//! aborts the whole operation with nothing persisted.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::geocode::{GeocodeError, Geocoder};
use crate::order::Order;
use crate::store::{DeliveryRecord, DeliveryRecordStore, NewDelivery, PersistenceError};

/// One delivery assignment as submitted by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRequest {
    pub courier_name: String,
    pub address: String,
    pub delivery_date: NaiveDate,
    /// Order this delivery fulfills, when assigned from the order screen.
    pub order_id: Option<u64>,
}

/// Failure modes of an assignment attempt. `AddressNotFound` asks the
/// operator to correct the address; everything else is worth a retry.
#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("courier name must not be empty")]
    EmptyCourier,
    #[error("delivery address must not be empty")]
    EmptyAddress,
    #[error("delivery address was not found; correct it and resubmit")]
    AddressNotFound,
    #[error("could not resolve the delivery address")]
    Geocode(#[source] GeocodeError),
    #[error("could not persist the delivery record")]
    Persistence(#[from] PersistenceError),
}

impl AssignmentError {
    /// Whether resubmitting the same request can succeed without changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssignmentError::Geocode(_) | AssignmentError::Persistence(_)
        )
    }
}

/// Orchestrates geocoding and persistence as one operation.
///
/// Dependencies are injected at construction and shared by reference; the
/// pipeline itself holds no mutable state, so one instance serves any number
/// of concurrent operator threads.
pub struct DeliveryPipeline {
    geocoder: Arc<dyn Geocoder>,
    store: Arc<dyn DeliveryRecordStore>,
}

impl DeliveryPipeline {
    pub fn new(geocoder: Arc<dyn Geocoder>, store: Arc<dyn DeliveryRecordStore>) -> Self {
        Self { geocoder, store }
    }

    /// Run one assignment: validate, geocode, persist.
    ///
    /// On success the returned record is durably stored. On any error
    /// nothing was persisted by this call; resubmitting re-runs the same
    /// geocode-then-create steps (at worst appending a duplicate record,
    /// never a record without coordinates).
    pub fn assign(&self, request: AssignmentRequest) -> Result<DeliveryRecord, AssignmentError> {
        if request.courier_name.trim().is_empty() {
            return Err(AssignmentError::EmptyCourier);
        }
        if request.address.trim().is_empty() {
            return Err(AssignmentError::EmptyAddress);
        }

        tracing::debug!(
            courier = %request.courier_name,
            address = %request.address,
            "resolving delivery address"
        );

        let position = self.geocoder.resolve(&request.address).map_err(|err| {
            tracing::warn!(address = %request.address, error = %err, "geocoding failed; nothing persisted");
            match err {
                GeocodeError::NotFound => AssignmentError::AddressNotFound,
                other => AssignmentError::Geocode(other),
            }
        })?;

        let record = self.store.create(NewDelivery {
            courier_name: request.courier_name,
            address: request.address,
            position,
            delivery_date: request.delivery_date,
            order_id: request.order_id,
        })?;

        tracing::info!(
            id = %record.id,
            courier = %record.courier_name,
            lat = record.position.lat(),
            lon = record.position.lon(),
            "delivery assigned"
        );
        Ok(record)
    }

    /// Assign a delivery straight from a registered order.
    pub fn assign_order(
        &self,
        order: &Order,
        courier_name: &str,
    ) -> Result<DeliveryRecord, AssignmentError> {
        self.assign(AssignmentRequest {
            courier_name: courier_name.to_string(),
            address: order.delivery_address.clone(),
            delivery_date: order.requested_date,
            order_id: Some(order.id),
        })
    }
}
