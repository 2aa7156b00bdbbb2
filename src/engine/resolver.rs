//! Winning-rule resolution. First-match-wins over a deterministic candidate
//! order: amount-filtered rules always outrank generic keyword rules, and
//! within a tier priority descends with persisted position breaking ties.
//! Only one rule's effects apply per transaction per run.

use std::cmp::Reverse;

use crate::rules::{Rule, TransactionRecord};

use super::matcher;

/// Returns the single winning rule for `transaction`, or `None`. `rules`
/// must be in persisted order; slice position is the tie-break.
pub fn resolve<'a>(rules: &'a [Rule], transaction: &TransactionRecord) -> Option<&'a Rule> {
    let mut candidates: Vec<(usize, &Rule)> = rules.iter().enumerate().collect();
    candidates.sort_by_key(|(position, rule)| {
        (
            tier_rank(rule),
            Reverse(rule.priority),
            *position,
        )
    });
    candidates
        .into_iter()
        .map(|(_, rule)| rule)
        .find(|rule| matcher::matches(rule, transaction))
}

/// Amount-filtered rules scan before generic ones regardless of stored
/// priority values.
fn tier_rank(rule: &Rule) -> u8 {
    if rule.is_amount_filtered() {
        0
    } else {
        1
    }
}
