use std::collections::HashMap;
use std::sync::Mutex;

use super::{SequenceStore, SequenceStoreError};

/// In-memory sequence store. The mutex is the storage layer here: the
/// conditional update runs entirely under it, so concurrent allocators see
/// the same atomicity as a hosted document store's conditional write.
#[derive(Debug, Default)]
pub struct MemorySequenceStore {
    values: Mutex<HashMap<String, u64>>,
}

impl MemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceStore for MemorySequenceStore {
    fn read(&self, name: &str) -> Result<Option<u64>, SequenceStoreError> {
        let values = self.values.lock().expect("sequence map lock poisoned");
        Ok(values.get(name).copied())
    }

    fn compare_and_swap(
        &self,
        name: &str,
        current: u64,
        next: u64,
    ) -> Result<bool, SequenceStoreError> {
        let mut values = self.values.lock().expect("sequence map lock poisoned");
        match values.get_mut(name) {
            Some(value) if *value == current => {
                *value = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn provision(&self, name: &str, initial: u64) -> Result<(), SequenceStoreError> {
        let mut values = self.values.lock().expect("sequence map lock poisoned");
        let value = values.entry(name.to_string()).or_insert(initial);
        *value = (*value).max(initial);
        Ok(())
    }
}
