//! Fraud Decision Engine Library
//!
//! A rule-based payment fraud decision pipeline: an ordered sequence of
//! scoring stages turns one transaction record into a verdict, an integer
//! risk score and an auditable trail of the rules that fired.

pub mod config;
pub mod engine;
pub mod metrics;
pub mod reader;
pub mod types;
pub mod writer;

pub use config::{AppConfig, ScoringConfig};
pub use engine::evaluator::RiskEvaluator;
pub use metrics::BatchMetrics;
pub use reader::TransactionReader;
pub use types::{
    alert::ReviewAlert,
    decision::{Decision, DecisionResult},
    transaction::Transaction,
};
pub use writer::{AlertWriter, DecisionWriter};
