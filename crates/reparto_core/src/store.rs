//! Append-only storage for delivery-assignment records.
//!
//! A record states that a courier delivers to a resolved address on a date.
//! Records are facts: there is no update and no delete. If a later feature
//! needs to supersede a record it appends a new one referencing the old,
//! keeping the log auditable.

mod jsonl;
mod memory;

pub use jsonl::JsonlDeliveryStore;
pub use memory::MemoryDeliveryStore;

use chrono::NaiveDate;
use thiserror::Error;

use crate::geo::GeoPoint;

/// Storage failure while appending or reading delivery records.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("delivery log I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("delivery record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("delivery log corrupt at {path}:{line}: {reason}")]
    Corrupt {
        path: String,
        line: usize,
        reason: String,
    },
}

/// A delivery assignment about to be persisted. Coordinates are already
/// resolved — the store never sees an ungeocoded address.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDelivery {
    pub courier_name: String,
    pub address: String,
    pub position: GeoPoint,
    pub delivery_date: NaiveDate,
    pub order_id: Option<u64>,
}

/// A persisted delivery assignment, identified by a store-minted id.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub id: String,
    pub courier_name: String,
    pub address: String,
    pub position: GeoPoint,
    pub delivery_date: NaiveDate,
    pub order_id: Option<u64>,
}

impl DeliveryRecord {
    fn from_new(id: String, delivery: NewDelivery) -> Self {
        Self {
            id,
            courier_name: delivery.courier_name,
            address: delivery.address,
            position: delivery.position,
            delivery_date: delivery.delivery_date,
            order_id: delivery.order_id,
        }
    }
}

/// Store-minted record identifier: zero-padded append position.
fn record_id(position: u64) -> String {
    format!("rep-{position:06}")
}

/// Append-only record store the pipeline and the route sheet depend on.
///
/// `create` must not report success unless the record is durably appended;
/// callers treat an error as "nothing was saved" and may resubmit.
pub trait DeliveryRecordStore: Send + Sync {
    /// Append a record and return it with its minted id.
    fn create(&self, delivery: NewDelivery) -> Result<DeliveryRecord, PersistenceError>;

    /// Every record, in insertion order.
    fn list_all(&self) -> Result<Vec<DeliveryRecord>, PersistenceError>;

    /// Records assigned to the named courier, in insertion order.
    fn list_by_courier(&self, courier: &str) -> Result<Vec<DeliveryRecord>, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_are_zero_padded_and_ordered() {
        assert_eq!(record_id(1), "rep-000001");
        assert_eq!(record_id(42), "rep-000042");
        assert!(record_id(2) > record_id(1));
    }
}
