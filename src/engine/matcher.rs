//! Pure match evaluation. A rule matches a transaction when any keyword is a
//! substring of the lower-cased description AND the absolute amount sits
//! inside the rule's inclusive bounds. No side effects, no I/O; "no match"
//! is `false`, never an error.

use crate::rules::{CandidateRule, Rule, TransactionRecord};

/// Evaluates a stored rule against one transaction.
pub fn matches(rule: &Rule, transaction: &TransactionRecord) -> bool {
    keyword_hit(&rule.keywords, &transaction.description)
        && within_bounds(rule.min_amount, rule.max_amount, transaction.amount)
}

/// Evaluates an unsaved candidate (preview input) against one transaction.
pub fn candidate_matches(candidate: &CandidateRule, transaction: &TransactionRecord) -> bool {
    keyword_hit(&candidate.keywords, &transaction.description)
        && within_bounds(
            candidate.min_amount,
            candidate.max_amount,
            transaction.amount,
        )
}

/// OR semantics across keywords: "woolworths, coles" means either.
fn keyword_hit(keywords: &[String], description: &str) -> bool {
    let description = description.to_lowercase();
    keywords.iter().any(|keyword| description.contains(keyword))
}

/// Bounds apply to the absolute amount so one rule covers a charge and its
/// refund. Unset bounds are vacuously true.
fn within_bounds(min: Option<f64>, max: Option<f64>, amount: f64) -> bool {
    let magnitude = amount.abs();
    if let Some(min) = min {
        if magnitude < min {
            return false;
        }
    }
    if let Some(max) = max {
        if magnitude > max {
            return false;
        }
    }
    true
}
