use std::collections::HashSet;

use crate::rules::{TransactionPatch, TransactionRecord};

use super::{Result, TransactionReader, TransactionWriter, WriteFailure};

/// In-memory transaction store. Backs the test suites and embedding hosts
/// that already hold the corpus (an importer batch, a synced snapshot).
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactions {
    records: Vec<TransactionRecord>,
    rejected_ids: HashSet<u64>,
}

impl InMemoryTransactions {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            rejected_ids: HashSet::new(),
        }
    }

    /// Marks transaction ids whose writes should fail, simulating a store
    /// that rejects individual updates mid-batch.
    pub fn reject_writes_for(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.rejected_ids = ids.into_iter().collect();
        self
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn record(&self, id: u64) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}

impl TransactionReader for InMemoryTransactions {
    fn read_all(&self) -> Result<Vec<TransactionRecord>> {
        Ok(self.records.clone())
    }
}

impl TransactionWriter for InMemoryTransactions {
    fn apply_batch(&mut self, patches: &[TransactionPatch]) -> Result<Vec<WriteFailure>> {
        let mut failures = Vec::new();
        for patch in patches {
            if self.rejected_ids.contains(&patch.id) {
                failures.push(WriteFailure {
                    transaction_id: patch.id,
                    message: "write rejected by store".into(),
                });
                continue;
            }
            match self.records.iter_mut().find(|record| record.id == patch.id) {
                Some(record) => patch.apply_to(record),
                None => failures.push(WriteFailure {
                    transaction_id: patch.id,
                    message: "unknown transaction id".into(),
                }),
            }
        }
        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(id: u64) -> TransactionRecord {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        TransactionRecord::new(id, "COLES 0412", -32.5, date)
    }

    #[test]
    fn apply_batch_updates_known_records() {
        let mut store = InMemoryTransactions::new(vec![sample(1), sample(2)]);
        let patch = TransactionPatch {
            id: 2,
            bucket_id: Some(4),
            verified: Some(true),
            ..TransactionPatch::default()
        };
        let failures = store.apply_batch(&[patch]).unwrap();
        assert!(failures.is_empty());
        assert_eq!(store.record(2).unwrap().bucket_id, Some(4));
        assert_eq!(store.record(1).unwrap().bucket_id, None);
    }

    #[test]
    fn rejected_ids_surface_as_failures() {
        let mut store = InMemoryTransactions::new(vec![sample(1)]).reject_writes_for([1]);
        let patch = TransactionPatch {
            id: 1,
            verified: Some(true),
            ..TransactionPatch::default()
        };
        let failures = store.apply_batch(&[patch]).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].transaction_id, 1);
        assert!(!store.record(1).unwrap().verified);
    }
}
