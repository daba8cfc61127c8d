use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{SequenceStore, SequenceStoreError};

/// Stored shape of a single counter: `{ "lastValue": n }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SequenceDoc {
    #[serde(rename = "lastValue")]
    last_value: u64,
}

/// File-backed sequence store: one JSON document holding every counter,
/// keyed by sequence name.
///
/// The whole document is rewritten through a temp-file rename so a crashed
/// writer can never leave a half-written file behind, and an in-process
/// mutex spans each read-check-write so the conditional update is atomic
/// for every allocator sharing this store.
#[derive(Debug)]
pub struct FileSequenceStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSequenceStore {
    /// Use (or later create) the sequence document at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, SequenceDoc>, SequenceStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn persist(&self, docs: &BTreeMap<String, SequenceDoc>) -> Result<(), SequenceStoreError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(docs)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SequenceStore for FileSequenceStore {
    fn read(&self, name: &str) -> Result<Option<u64>, SequenceStoreError> {
        let _guard = self.guard.lock().expect("sequence file lock poisoned");
        Ok(self.load()?.get(name).map(|doc| doc.last_value))
    }

    fn compare_and_swap(
        &self,
        name: &str,
        current: u64,
        next: u64,
    ) -> Result<bool, SequenceStoreError> {
        let _guard = self.guard.lock().expect("sequence file lock poisoned");
        let mut docs = self.load()?;
        match docs.get_mut(name) {
            Some(doc) if doc.last_value == current => {
                doc.last_value = next;
                self.persist(&docs)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn provision(&self, name: &str, initial: u64) -> Result<(), SequenceStoreError> {
        let _guard = self.guard.lock().expect("sequence file lock poisoned");
        let mut docs = self.load()?;
        let doc = docs
            .entry(name.to_string())
            .or_insert(SequenceDoc { last_value: initial });
        doc.last_value = doc.last_value.max(initial);
        self.persist(&docs)
    }
}
