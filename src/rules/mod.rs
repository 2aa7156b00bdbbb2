//! Rule domain models, persistence-friendly types, and helpers.

pub mod rule;
pub mod rulebook;
pub mod transaction;

pub use rule::{keyword_list, tag_list, CandidateRule, Rule, RuleDraft};
pub use rulebook::{BulkDeleteOutcome, RuleBook};
pub use transaction::{TransactionPatch, TransactionRecord};
