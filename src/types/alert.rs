//! Review alert data structures

use crate::types::decision::{Decision, DecisionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert emitted for every transaction that was not accepted, for the
/// manual-review queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAlert {
    /// Unique alert identifier
    pub alert_id: String,

    /// 1-based row number of the transaction in the input batch
    pub row: u64,

    /// Verdict that triggered the alert
    pub decision: Decision,

    /// Accumulated risk score
    pub risk_score: i64,

    /// Fired-rule labels in stage order
    pub reasons: Vec<String>,

    /// Alert generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl ReviewAlert {
    /// Create an alert from a flagged decision.
    pub fn new(row: u64, result: &DecisionResult) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            row,
            decision: result.decision,
            risk_score: result.risk_score,
            reasons: result.reasons.clone(),
            timestamp: Utc::now(),
        }
    }
}
