//! Candidate-rule preview: "how many transactions contain this keyword and
//! amount combination". The candidate is evaluated alone, without the stored
//! rule set. Precedence against existing rules is not part of the answer, so
//! the count can differ from what a bulk run would mutate when a more
//! specific stored rule would win.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::rules::{CandidateRule, TransactionRecord};
use crate::transactions::TransactionReader;

use super::matcher;

/// Preview result: total match count plus a bounded most-recent-first
/// sample for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewReport {
    pub match_count: usize,
    pub sample: Vec<TransactionRecord>,
}

/// Evaluates `candidate` against every transaction without mutating any.
/// An empty corpus yields `match_count = 0`, not an error.
pub fn preview(
    candidate: &CandidateRule,
    reader: &dyn TransactionReader,
    limit: usize,
) -> Result<PreviewReport, EngineError> {
    let mut matched: Vec<TransactionRecord> = reader
        .read_all()?
        .into_iter()
        .filter(|transaction| matcher::candidate_matches(candidate, transaction))
        .collect();
    let match_count = matched.len();
    matched.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    matched.truncate(limit);
    Ok(PreviewReport {
        match_count,
        sample: matched,
    })
}
