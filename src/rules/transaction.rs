use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A transaction as returned by the external transaction reader. The engine
/// never owns transactions; it reads records and emits patches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: u64,
    pub description: String,
    /// Signed amount: negative = expense, positive = income.
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl TransactionRecord {
    pub fn new(id: u64, description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            date,
            verified: false,
            tags: Vec::new(),
            bucket_id: None,
            assigned_to: None,
        }
    }
}

/// Partial update for one transaction, keyed by id. Only fields that should
/// change are set; an all-`None` patch is never emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionPatch {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl TransactionPatch {
    pub fn for_transaction(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bucket_id.is_none()
            && self.tags.is_none()
            && self.verified.is_none()
            && self.assigned_to.is_none()
    }

    /// Applies the patch to a record in place.
    pub fn apply_to(&self, record: &mut TransactionRecord) {
        if let Some(bucket_id) = self.bucket_id {
            record.bucket_id = Some(bucket_id);
        }
        if let Some(tags) = &self.tags {
            record.tags = tags.clone();
        }
        if let Some(verified) = self.verified {
            record.verified = verified;
        }
        if let Some(member) = &self.assigned_to {
            record.assigned_to = Some(member.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_reports_empty() {
        let patch = TransactionPatch::for_transaction(7);
        assert!(patch.is_empty());
    }

    #[test]
    fn apply_to_only_touches_set_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut record = TransactionRecord::new(1, "WOOLWORTHS 1234", -54.20, date);
        record.assigned_to = Some("alex".into());

        let patch = TransactionPatch {
            id: 1,
            bucket_id: Some(9),
            verified: Some(true),
            ..TransactionPatch::default()
        };
        patch.apply_to(&mut record);

        assert_eq!(record.bucket_id, Some(9));
        assert!(record.verified);
        assert_eq!(record.assigned_to.as_deref(), Some("alex"));
        assert!(record.tags.is_empty());
    }
}
