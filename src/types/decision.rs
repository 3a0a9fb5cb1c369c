//! Decision verdicts and per-transaction evaluation results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final verdict for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accepted,
    InReview,
    Rejected,
}

impl Decision {
    /// Map an accumulated risk score to a verdict.
    pub fn from_score(score: i64, cutoffs: &DecisionThresholds) -> Self {
        if score >= cutoffs.reject_at {
            Decision::Rejected
        } else if score >= cutoffs.review_at {
            Decision::InReview
        } else {
            Decision::Accepted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "ACCEPTED",
            Decision::InReview => "IN_REVIEW",
            Decision::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cut-offs for the verdict mapping.
///
/// `reject_at` must be strictly greater than `review_at`; the configuration
/// layer validates this at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub reject_at: i64,
    pub review_at: i64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            reject_at: 10,
            review_at: 4,
        }
    }
}

/// Outcome of evaluating one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Final verdict
    pub decision: Decision,

    /// Accumulated risk score; 100 is reserved for hard blocks. Negative
    /// totals are carried as-is, never clamped.
    pub risk_score: i64,

    /// Fired-rule labels in stage order
    pub reasons: Vec<String>,
}

impl DecisionResult {
    /// The audit trail as a single semicolon-joined column value.
    pub fn reason_trail(&self) -> String {
        self.reasons.join(";")
    }
}
