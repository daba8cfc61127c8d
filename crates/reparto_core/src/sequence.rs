//! Named monotonic counters for minting entity identifiers.
//!
//! Each registration screen (customers, products, orders) owns one named
//! sequence. Allocation is a conditional update at the storage layer: the
//! allocator reads the current value and applies a compare-and-swap, so two
//! concurrent `allocate` calls for the same name can never hand out the same
//! identifier — the loser of the race retries against the fresh value.

mod file;
mod memory;

pub use file::FileSequenceStore;
pub use memory::MemorySequenceStore;

use std::sync::Arc;

use thiserror::Error;

/// Sequence names used by the registration screens.
pub const CUSTOMERS_SEQUENCE: &str = "customersCounter";
pub const PRODUCTS_SEQUENCE: &str = "productsCounter";
pub const ORDERS_SEQUENCE: &str = "ordersCounter";

/// Bounded number of compare-and-swap attempts before an allocation gives up.
const MAX_CAS_ATTEMPTS: u32 = 8;

/// Storage-layer failure while reading or writing a sequence document.
#[derive(Debug, Error)]
pub enum SequenceStoreError {
    #[error("sequence storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("sequence document malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure modes of [`SequenceAllocator::allocate`].
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The named sequence was never provisioned.
    #[error("sequence `{0}` is not provisioned")]
    NotFound(String),
    /// Storage failed during the conditional update. The stored value is
    /// unchanged by this call.
    #[error("failed to allocate from sequence `{name}`")]
    AllocationFailed {
        name: String,
        #[source]
        source: SequenceStoreError,
    },
    /// Every compare-and-swap attempt lost its race. The stored value only
    /// moved forward through other callers.
    #[error("allocation from sequence `{name}` lost {attempts} compare-and-swap races")]
    Contended { name: String, attempts: u32 },
}

impl SequenceError {
    /// Whether retrying the same call can succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SequenceError::NotFound(_))
    }
}

/// Narrow storage seam for sequence documents.
///
/// Implementations must make `compare_and_swap` atomic with respect to other
/// callers of the same store: the swap applies only if the stored value still
/// equals `current`, and a `false` return leaves the value untouched.
pub trait SequenceStore: Send + Sync {
    /// Current value of the sequence, or `None` if never provisioned.
    fn read(&self, name: &str) -> Result<Option<u64>, SequenceStoreError>;

    /// Replace `current` with `next` iff the stored value still equals
    /// `current`. Returns `false` when the caller lost the race.
    fn compare_and_swap(
        &self,
        name: &str,
        current: u64,
        next: u64,
    ) -> Result<bool, SequenceStoreError>;

    /// Create the sequence at `initial` if absent. Idempotent; never lowers
    /// an existing value.
    fn provision(&self, name: &str, initial: u64) -> Result<(), SequenceStoreError>;
}

/// Hands out collision-free, strictly increasing identifiers per sequence
/// name via a bounded compare-and-swap retry loop.
pub struct SequenceAllocator {
    store: Arc<dyn SequenceStore>,
    max_attempts: u32,
}

impl SequenceAllocator {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self {
            store,
            max_attempts: MAX_CAS_ATTEMPTS,
        }
    }

    /// Override the attempt bound (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Allocate the next identifier from the named sequence.
    ///
    /// The returned value is strictly greater than every value previously
    /// returned for `name`, across all concurrent callers of the same store.
    pub fn allocate(&self, name: &str) -> Result<u64, SequenceError> {
        for _ in 0..self.max_attempts {
            let current = self
                .read(name)?
                .ok_or_else(|| SequenceError::NotFound(name.to_string()))?;
            let next = current + 1;

            let swapped = self
                .store
                .compare_and_swap(name, current, next)
                .map_err(|source| SequenceError::AllocationFailed {
                    name: name.to_string(),
                    source,
                })?;

            if swapped {
                tracing::debug!(sequence = name, value = next, "allocated identifier");
                return Ok(next);
            }
        }

        Err(SequenceError::Contended {
            name: name.to_string(),
            attempts: self.max_attempts,
        })
    }

    fn read(&self, name: &str) -> Result<Option<u64>, SequenceError> {
        self.store
            .read(name)
            .map_err(|source| SequenceError::AllocationFailed {
                name: name.to_string(),
                source,
            })
    }
}
