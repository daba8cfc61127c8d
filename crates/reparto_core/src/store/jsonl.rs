use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

use super::{record_id, DeliveryRecord, DeliveryRecordStore, NewDelivery, PersistenceError};

/// Wire shape of one persisted record, one JSON object per line:
/// `{ "id", "courier", "address", "deliveryDate", "lat", "lon", "linkedOrderId"? }`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDelivery {
    id: String,
    courier: String,
    address: String,
    delivery_date: chrono::NaiveDate,
    lat: f64,
    lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_order_id: Option<u64>,
}

impl From<&DeliveryRecord> for StoredDelivery {
    fn from(record: &DeliveryRecord) -> Self {
        Self {
            id: record.id.clone(),
            courier: record.courier_name.clone(),
            address: record.address.clone(),
            delivery_date: record.delivery_date,
            lat: record.position.lat(),
            lon: record.position.lon(),
            linked_order_id: record.order_id,
        }
    }
}

impl StoredDelivery {
    fn into_record(self, path: &Path, line: usize) -> Result<DeliveryRecord, PersistenceError> {
        let position =
            GeoPoint::new(self.lat, self.lon).map_err(|err| PersistenceError::Corrupt {
                path: path.display().to_string(),
                line,
                reason: err.to_string(),
            })?;
        Ok(DeliveryRecord {
            id: self.id,
            courier_name: self.courier,
            address: self.address,
            position,
            delivery_date: self.delivery_date,
            order_id: self.linked_order_id,
        })
    }
}

/// Append-only JSON Lines delivery log.
///
/// Each `create` appends exactly one line; listings re-read the log so a
/// second process appending to the same file is picked up. The mutex holds
/// the next append position and serializes writers within this process.
#[derive(Debug)]
pub struct JsonlDeliveryStore {
    path: PathBuf,
    next_position: Mutex<u64>,
}

impl JsonlDeliveryStore {
    /// Open (or start) the delivery log at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let existing = read_records(&path)?;
        Ok(Self {
            next_position: Mutex::new(existing.len() as u64 + 1),
            path,
        })
    }
}

fn read_records(path: &Path) -> Result<Vec<DeliveryRecord>, PersistenceError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut records = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let stored: StoredDelivery =
            serde_json::from_str(line).map_err(|err| PersistenceError::Corrupt {
                path: path.display().to_string(),
                line: idx + 1,
                reason: err.to_string(),
            })?;
        records.push(stored.into_record(path, idx + 1)?);
    }
    Ok(records)
}

impl DeliveryRecordStore for JsonlDeliveryStore {
    fn create(&self, delivery: NewDelivery) -> Result<DeliveryRecord, PersistenceError> {
        let mut next_position = self
            .next_position
            .lock()
            .expect("delivery log lock poisoned");

        let record = DeliveryRecord::from_new(record_id(*next_position), delivery);
        let line = serde_json::to_string(&StoredDelivery::from(&record))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        *next_position += 1;
        tracing::debug!(id = %record.id, path = %self.path.display(), "delivery record appended");
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<DeliveryRecord>, PersistenceError> {
        read_records(&self.path)
    }

    fn list_by_courier(&self, courier: &str) -> Result<Vec<DeliveryRecord>, PersistenceError> {
        Ok(read_records(&self.path)?
            .into_iter()
            .filter(|record| record.courier_name == courier)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn delivery_for(courier: &str, order_id: Option<u64>) -> NewDelivery {
        NewDelivery {
            courier_name: courier.to_string(),
            address: "Av. Aconquija 1400".to_string(),
            position: GeoPoint::new(-26.8241, -65.2226).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            order_id,
        }
    }

    #[test]
    fn appended_records_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonlDeliveryStore::open(dir.path().join("repartos.jsonl")).expect("open");

        let created = store.create(delivery_for("Juan", Some(7))).expect("create");
        let listed = store.list_all().expect("list");

        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn log_lines_use_the_documented_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("repartos.jsonl");
        let store = JsonlDeliveryStore::open(&path).expect("open");
        store.create(delivery_for("Juan", Some(7))).expect("create");

        let raw = fs::read_to_string(&path).expect("log readable");
        assert!(raw.contains("\"courier\":\"Juan\""));
        assert!(raw.contains("\"deliveryDate\":\"2024-11-05\""));
        assert!(raw.contains("\"lat\":-26.8241"));
        assert!(raw.contains("\"lon\":-65.2226"));
        assert!(raw.contains("\"linkedOrderId\":7"));
    }

    #[test]
    fn linked_order_id_is_omitted_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("repartos.jsonl");
        let store = JsonlDeliveryStore::open(&path).expect("open");
        store.create(delivery_for("Juan", None)).expect("create");

        let raw = fs::read_to_string(&path).expect("log readable");
        assert!(!raw.contains("linkedOrderId"));
    }

    #[test]
    fn reopening_continues_the_id_series() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("repartos.jsonl");

        let store = JsonlDeliveryStore::open(&path).expect("open");
        store.create(delivery_for("Juan", None)).expect("create");
        drop(store);

        let reopened = JsonlDeliveryStore::open(&path).expect("reopen");
        let second = reopened.create(delivery_for("Marta", None)).expect("create");
        assert_eq!(second.id, "rep-000002");

        let couriers: Vec<_> = reopened
            .list_all()
            .expect("list")
            .into_iter()
            .map(|record| record.courier_name)
            .collect();
        assert_eq!(couriers, ["Juan", "Marta"]);
    }

    #[test]
    fn corrupt_lines_are_reported_with_their_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("repartos.jsonl");
        let store = JsonlDeliveryStore::open(&path).expect("open");
        store.create(delivery_for("Juan", None)).expect("create");

        let mut file = OpenOptions::new().append(true).open(&path).expect("append");
        file.write_all(b"{ not json\n").expect("write garbage");

        let err = store.list_all().expect_err("corrupt log");
        assert!(matches!(err, PersistenceError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn out_of_range_coordinates_in_the_log_are_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("repartos.jsonl");
        fs::write(
            &path,
            "{\"id\":\"rep-000001\",\"courier\":\"Juan\",\"address\":\"x\",\"deliveryDate\":\"2024-11-05\",\"lat\":99.0,\"lon\":0.0}\n",
        )
        .expect("seed log");

        let err = JsonlDeliveryStore::open(&path).expect_err("invalid coordinates");
        assert!(matches!(err, PersistenceError::Corrupt { line: 1, .. }));
    }
}
