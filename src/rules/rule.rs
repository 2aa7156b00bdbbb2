use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;

/// A user-authored categorization rule. Keyword and amount conditions on the
/// left, category and side effects on the right.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: Uuid,
    /// Normalized: trimmed, lower-cased, de-duplicated, never empty.
    pub keywords: Vec<String>,
    pub bucket_id: u64,
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub apply_tags: Vec<String>,
    #[serde(default)]
    pub mark_for_review: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// Amount-filtered rules form the higher precedence tier.
    pub fn is_amount_filtered(&self) -> bool {
        self.min_amount.is_some() || self.max_amount.is_some()
    }
}

/// Caller-supplied fields for creating or replacing a rule. Keyword and tag
/// inputs arrive as comma-separated text, the way the rule form submits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDraft {
    pub keywords: String,
    pub bucket_id: u64,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub apply_tags: String,
    #[serde(default)]
    pub mark_for_review: bool,
    #[serde(default)]
    pub assign_to: Option<String>,
}

impl RuleDraft {
    pub fn new(keywords: impl Into<String>, bucket_id: u64) -> Self {
        Self {
            keywords: keywords.into(),
            bucket_id,
            ..Self::default()
        }
    }

    pub fn with_amounts(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Validates the draft, returning the normalized keyword set.
    pub fn validate(&self) -> Result<Vec<String>, EngineError> {
        let keywords = keyword_list(&self.keywords);
        if keywords.is_empty() {
            return Err(EngineError::validation(
                "keywords",
                "at least one non-empty keyword is required",
            ));
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(EngineError::validation(
                    "min_amount",
                    format!("lower bound {} exceeds upper bound {}", min, max),
                ));
            }
        }
        Ok(keywords)
    }

    /// Blank assignee input means "leave unchanged".
    pub fn normalized_assignee(&self) -> Option<String> {
        self.assign_to
            .as_deref()
            .map(str::trim)
            .filter(|member| !member.is_empty())
            .map(str::to_string)
    }
}

/// The match half of a rule that is not yet persisted, as submitted for a
/// preview request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRule {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
}

impl CandidateRule {
    pub fn from_input(
        keywords: &str,
        min_amount: Option<f64>,
        max_amount: Option<f64>,
    ) -> Result<Self, EngineError> {
        let keywords = keyword_list(keywords);
        if keywords.is_empty() {
            return Err(EngineError::validation(
                "keywords",
                "at least one non-empty keyword is required",
            ));
        }
        Ok(Self {
            keywords,
            min_amount,
            max_amount,
        })
    }
}

impl From<&Rule> for CandidateRule {
    fn from(rule: &Rule) -> Self {
        Self {
            keywords: rule.keywords.clone(),
            min_amount: rule.min_amount,
            max_amount: rule.max_amount,
        }
    }
}

/// Splits comma-separated keyword input into trimmed, lower-cased, unique
/// tokens. Empty tokens are discarded; first-seen order is kept.
pub fn keyword_list(input: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in input.split(',') {
        let keyword = token.trim().to_lowercase();
        if !keyword.is_empty() && !seen.contains(&keyword) {
            seen.push(keyword);
        }
    }
    seen
}

/// Splits comma-separated tag input into trimmed, unique tokens. Tag case is
/// preserved.
pub fn tag_list(input: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in input.split(',') {
        let tag = token.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_list_normalizes_input() {
        let keywords = keyword_list(" Woolworths, Coles ,,NETFLIX, coles ");
        assert_eq!(keywords, vec!["woolworths", "coles", "netflix"]);
    }

    #[test]
    fn tag_list_preserves_case() {
        let tags = tag_list("Streaming, shared , Streaming");
        assert_eq!(tags, vec!["Streaming", "shared"]);
    }

    #[test]
    fn draft_without_keywords_is_rejected() {
        let draft = RuleDraft::new(" , ,", 3);
        let err = draft.validate().expect_err("must reject");
        assert!(
            matches!(err, EngineError::Validation { field: "keywords", .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn draft_with_inverted_bounds_is_rejected() {
        let draft = RuleDraft::new("netflix", 3).with_amounts(Some(50.0), Some(20.0));
        let err = draft.validate().expect_err("must reject");
        assert!(matches!(err, EngineError::Validation { field: "min_amount", .. }));
    }

    #[test]
    fn zero_bound_is_a_value_not_unset() {
        let draft = RuleDraft::new("netflix", 3).with_amounts(Some(0.0), Some(20.0));
        assert!(draft.validate().is_ok());
        assert_eq!(draft.min_amount, Some(0.0));
    }

    #[test]
    fn blank_assignee_means_unchanged() {
        let mut draft = RuleDraft::new("rent", 1);
        draft.assign_to = Some("   ".into());
        assert_eq!(draft.normalized_assignee(), None);

        draft.assign_to = Some(" sam ".into());
        assert_eq!(draft.normalized_assignee(), Some("sam".into()));
    }
}
