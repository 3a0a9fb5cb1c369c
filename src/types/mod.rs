//! Type definitions for the fraud decision pipeline

pub mod alert;
pub mod decision;
pub mod transaction;

pub use alert::ReviewAlert;
pub use decision::{Decision, DecisionResult};
pub use transaction::Transaction;
