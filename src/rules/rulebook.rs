use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;

use super::rule::{tag_list, Rule, RuleDraft};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Margin added above the current maximum priority when a draft omits one,
/// so newly authored specific rules outrank older generic ones.
pub const DEFAULT_PRIORITY_STEP: i64 = 10;

/// The ordered rule collection for one household. Vec position is the
/// persisted order and the authoritative within-tier tie-break; priority
/// values may collide, positions may not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub rules: Vec<Rule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "RuleBook::schema_version_default")]
    pub schema_version: u8,
}

/// Result of a bulk delete: ids removed and ids that were not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<Uuid>,
    pub missing: Vec<Uuid>,
}

impl RuleBook {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Validates `draft`, assigns an id and (when omitted) a computed
    /// priority, and appends the rule at the last position.
    pub fn create(&mut self, draft: &RuleDraft, priority_step: i64) -> Result<Rule, EngineError> {
        let keywords = draft.validate()?;
        let priority = draft
            .priority
            .unwrap_or_else(|| self.max_priority() + priority_step);
        let rule = Rule {
            id: Uuid::new_v4(),
            keywords,
            bucket_id: draft.bucket_id,
            priority,
            min_amount: draft.min_amount,
            max_amount: draft.max_amount,
            apply_tags: tag_list(&draft.apply_tags),
            mark_for_review: draft.mark_for_review,
            assign_to: draft.normalized_assignee(),
            created_at: Utc::now(),
        };
        self.rules.push(rule.clone());
        self.touch();
        Ok(rule)
    }

    /// Replaces the fields of the rule identified by `id`, keeping its id,
    /// position, and creation stamp. A draft without a priority keeps the
    /// existing one.
    pub fn update(&mut self, id: Uuid, draft: &RuleDraft) -> Result<Rule, EngineError> {
        let keywords = draft.validate()?;
        let rule = self
            .rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or(EngineError::RuleNotFound(id))?;
        rule.keywords = keywords;
        rule.bucket_id = draft.bucket_id;
        if let Some(priority) = draft.priority {
            rule.priority = priority;
        }
        rule.min_amount = draft.min_amount;
        rule.max_amount = draft.max_amount;
        rule.apply_tags = tag_list(&draft.apply_tags);
        rule.mark_for_review = draft.mark_for_review;
        rule.assign_to = draft.normalized_assignee();
        let updated = rule.clone();
        self.touch();
        Ok(updated)
    }

    /// Removes the rule identified by `id`, returning the removed instance.
    /// Positions after it close over; no gaps remain.
    pub fn delete(&mut self, id: Uuid) -> Result<Rule, EngineError> {
        let index = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or(EngineError::RuleNotFound(id))?;
        let removed = self.rules.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Removes every listed rule that exists. Unknown ids are reported, not
    /// errors; the surviving rules keep their relative order.
    pub fn bulk_delete(&mut self, ids: &[Uuid]) -> BulkDeleteOutcome {
        let requested: HashSet<Uuid> = ids.iter().copied().collect();
        let existing: HashSet<Uuid> = self.rules.iter().map(|rule| rule.id).collect();
        let mut outcome = BulkDeleteOutcome::default();
        for id in ids {
            if existing.contains(id) {
                if !outcome.deleted.contains(id) {
                    outcome.deleted.push(*id);
                }
            } else if !outcome.missing.contains(id) {
                outcome.missing.push(*id);
            }
        }
        if !outcome.deleted.is_empty() {
            self.rules.retain(|rule| !requested.contains(&rule.id));
            self.touch();
        }
        outcome
    }

    /// Atomically replaces the persisted order. Rejected, leaving the book
    /// untouched, unless `ids` is exactly a permutation of the stored id set.
    pub fn reorder(&mut self, ids: &[Uuid]) -> Result<(), EngineError> {
        if ids.len() != self.rules.len() {
            return Err(EngineError::ReorderMismatch);
        }
        let positions: HashMap<Uuid, usize> = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| (rule.id, index))
            .collect();
        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        if unique.len() != ids.len() || ids.iter().any(|id| !positions.contains_key(id)) {
            return Err(EngineError::ReorderMismatch);
        }
        self.rules = ids
            .iter()
            .map(|id| self.rules[positions[id]].clone())
            .collect();
        self.touch();
        Ok(())
    }

    pub fn rule(&self, id: Uuid) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.rules.iter().position(|rule| rule.id == id)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn max_priority(&self) -> i64 {
        self.rules.iter().map(|rule| rule.priority).max().unwrap_or(0)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new()
    }
}
