//! Collaborator contracts for the external transaction store. The engine
//! reads whole records and writes partial patches keyed by id; it never owns
//! transaction persistence.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::rules::{TransactionPatch, TransactionRecord};

pub use memory::InMemoryTransactions;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Read side of the transaction collaborator.
pub trait TransactionReader: Send + Sync {
    fn read_all(&self) -> Result<Vec<TransactionRecord>>;
}

/// Write side of the transaction collaborator. A batch is applied as one
/// logical unit; individual patch failures are reported, not raised.
pub trait TransactionWriter: Send + Sync {
    /// Applies every patch, returning the ones that failed. `Err` is
    /// reserved for total collapse of the underlying store.
    fn apply_batch(&mut self, patches: &[TransactionPatch]) -> Result<Vec<WriteFailure>>;
}

/// One transaction the writer could not update during a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteFailure {
    pub transaction_id: u64,
    pub message: String,
}
