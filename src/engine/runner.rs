//! Bulk application of the full rule set. Verified transactions are skipped
//! before any rule evaluation unless the caller opts into overwriting, so
//! manual corrections survive a routine run. Patches carry only fields that
//! actually change; a no-change match emits nothing, which makes re-runs
//! idempotent.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::rules::{Rule, TransactionPatch, TransactionRecord};
use crate::transactions::{TransactionReader, TransactionWriter, WriteFailure};

use super::resolver;

/// Outcome of one bulk run. `mutated` counts successful writes only;
/// failures are reported per transaction and never abort the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutcome {
    pub mutated: usize,
    pub skipped_verified: usize,
    pub unmatched: usize,
    pub failures: Vec<WriteFailure>,
}

/// Resolves the winning rule for every transaction and applies the
/// resulting patches as one batch through `writer`.
pub fn run(
    rules: &[Rule],
    reader: &dyn TransactionReader,
    writer: &mut dyn TransactionWriter,
    overwrite_verified: bool,
) -> Result<RunOutcome, EngineError> {
    let transactions = reader.read_all()?;
    let mut outcome = RunOutcome::default();
    let mut patches = Vec::new();

    for transaction in &transactions {
        if transaction.verified && !overwrite_verified {
            outcome.skipped_verified += 1;
            continue;
        }
        let Some(winner) = resolver::resolve(rules, transaction) else {
            outcome.unmatched += 1;
            continue;
        };
        let patch = build_patch(winner, transaction);
        if patch.is_empty() {
            continue;
        }
        debug!(
            transaction = transaction.id,
            rule = %winner.id,
            bucket = winner.bucket_id,
            "rule matched"
        );
        patches.push(patch);
    }

    outcome.failures = writer.apply_batch(&patches)?;
    outcome.mutated = patches.len().saturating_sub(outcome.failures.len());
    info!(
        scanned = transactions.len(),
        mutated = outcome.mutated,
        skipped_verified = outcome.skipped_verified,
        failed = outcome.failures.len(),
        "bulk run finished"
    );
    Ok(outcome)
}

/// Builds the mutation intent for a matched transaction. Only fields the
/// rule would actually change are set.
fn build_patch(rule: &Rule, transaction: &TransactionRecord) -> TransactionPatch {
    let mut patch = TransactionPatch::for_transaction(transaction.id);

    if transaction.bucket_id != Some(rule.bucket_id) {
        patch.bucket_id = Some(rule.bucket_id);
    }

    if !rule.apply_tags.is_empty() {
        let mut merged = transaction.tags.clone();
        for tag in &rule.apply_tags {
            if !merged.contains(tag) {
                merged.push(tag.clone());
            }
        }
        if merged.len() != transaction.tags.len() {
            patch.tags = Some(merged);
        }
    }

    // Matched transactions become verified unless the rule asks for review.
    let target_verified = !rule.mark_for_review;
    if transaction.verified != target_verified {
        patch.verified = Some(target_verified);
    }

    if let Some(member) = &rule.assign_to {
        if transaction.assigned_to.as_deref() != Some(member) {
            patch.assigned_to = Some(member.clone());
        }
    }

    patch
}
