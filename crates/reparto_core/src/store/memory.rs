use std::sync::Mutex;

use super::{record_id, DeliveryRecord, DeliveryRecordStore, NewDelivery, PersistenceError};

/// In-memory delivery store for tests and embedded use. Appends serialize
/// on the mutex, mirroring the atomic-append guarantee of the file store.
#[derive(Debug, Default)]
pub struct MemoryDeliveryStore {
    records: Mutex<Vec<DeliveryRecord>>,
}

impl MemoryDeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeliveryRecordStore for MemoryDeliveryStore {
    fn create(&self, delivery: NewDelivery) -> Result<DeliveryRecord, PersistenceError> {
        let mut records = self.records.lock().expect("delivery log lock poisoned");
        let id = record_id(records.len() as u64 + 1);
        let record = DeliveryRecord::from_new(id, delivery);
        records.push(record.clone());
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<DeliveryRecord>, PersistenceError> {
        let records = self.records.lock().expect("delivery log lock poisoned");
        Ok(records.clone())
    }

    fn list_by_courier(&self, courier: &str) -> Result<Vec<DeliveryRecord>, PersistenceError> {
        let records = self.records.lock().expect("delivery log lock poisoned");
        Ok(records
            .iter()
            .filter(|record| record.courier_name == courier)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::geo::GeoPoint;

    use super::*;

    fn delivery_for(courier: &str) -> NewDelivery {
        NewDelivery {
            courier_name: courier.to_string(),
            address: "Calle 25 de Mayo 455".to_string(),
            position: GeoPoint::new(-26.8241, -65.2226).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            order_id: None,
        }
    }

    #[test]
    fn create_mints_sequential_ids() {
        let store = MemoryDeliveryStore::new();
        let first = store.create(delivery_for("Juan")).expect("first");
        let second = store.create(delivery_for("Marta")).expect("second");

        assert_eq!(first.id, "rep-000001");
        assert_eq!(second.id, "rep-000002");
    }

    #[test]
    fn list_all_preserves_insertion_order() {
        let store = MemoryDeliveryStore::new();
        store.create(delivery_for("Juan")).expect("create");
        store.create(delivery_for("Marta")).expect("create");
        store.create(delivery_for("Juan")).expect("create");

        let couriers: Vec<_> = store
            .list_all()
            .expect("list")
            .into_iter()
            .map(|record| record.courier_name)
            .collect();
        assert_eq!(couriers, ["Juan", "Marta", "Juan"]);
    }

    #[test]
    fn list_by_courier_filters_exact_name() {
        let store = MemoryDeliveryStore::new();
        store.create(delivery_for("Juan")).expect("create");
        store.create(delivery_for("Marta")).expect("create");

        let records = store.list_by_courier("Juan").expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].courier_name, "Juan");
        assert!(store.list_by_courier("Pedro").expect("list").is_empty());
    }
}
