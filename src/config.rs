//! Configuration management for the fraud decision pipeline

use crate::types::decision::DecisionThresholds;
use crate::types::transaction::DEFAULT_PRODUCT_TYPE;
use anyhow::{bail, Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use tracing::warn;

/// Environment variable overriding `score_to_decision.reject_at`.
pub const REJECT_AT_ENV: &str = "REJECT_AT";

/// Environment variable overriding `score_to_decision.review_at`.
pub const REVIEW_AT_ENV: &str = "REVIEW_AT";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub io: IoConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Input/output file configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Path of the transaction CSV to evaluate
    pub input_path: String,
    /// Path of the decision CSV to write
    pub output_path: String,
    /// Optional JSON-lines file receiving one alert per flagged transaction
    pub alerts_path: Option<String>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: "transactions_examples.csv".to_string(),
            output_path: "decisions.csv".to_string(),
            alerts_path: None,
        }
    }
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of concurrent evaluation workers
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Rule weights and thresholds for the risk evaluator.
///
/// Constructed once at startup and shared read-only across all evaluations;
/// nothing mutates it after [`ScoringConfig::validate`] has passed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// High-amount threshold per product type; the `_default` key is the
    /// required fallback for unknown product types
    pub amount_thresholds: HashMap<String, f64>,
    /// Latency at or above which the extreme-latency rule fires
    pub latency_ms_extreme: u64,
    /// Chargeback count at or above which the hard block applies
    pub chargeback_hard_block: u32,
    /// Signed score deltas per rule
    pub score_weights: ScoreWeights,
    /// Score cut-offs for the final verdict
    pub score_to_decision: DecisionThresholds,
}

/// Signed score deltas, per categorical level or per scalar rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub ip_risk: HashMap<String, i64>,
    pub email_risk: HashMap<String, i64>,
    pub device_fingerprint_risk: HashMap<String, i64>,
    pub user_reputation: HashMap<String, i64>,
    pub night_hour: i64,
    pub geo_mismatch: i64,
    pub high_amount: i64,
    pub latency_extreme: i64,
    pub new_user_high_amount: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut amount_thresholds = HashMap::new();
        amount_thresholds.insert("digital".to_string(), 2500.0);
        amount_thresholds.insert("physical".to_string(), 6000.0);
        amount_thresholds.insert("subscription".to_string(), 1500.0);
        amount_thresholds.insert(DEFAULT_PRODUCT_TYPE.to_string(), 4000.0);

        Self {
            amount_thresholds,
            latency_ms_extreme: 2500,
            chargeback_hard_block: 2,
            score_weights: ScoreWeights::default(),
            score_to_decision: DecisionThresholds::default(),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        let mut ip_risk = HashMap::new();
        ip_risk.insert("low".to_string(), 0);
        ip_risk.insert("medium".to_string(), 2);
        ip_risk.insert("high".to_string(), 4);

        let mut email_risk = HashMap::new();
        email_risk.insert("low".to_string(), 0);
        email_risk.insert("medium".to_string(), 1);
        email_risk.insert("high".to_string(), 3);
        email_risk.insert("new_domain".to_string(), 2);

        let mut device_fingerprint_risk = HashMap::new();
        device_fingerprint_risk.insert("low".to_string(), 0);
        device_fingerprint_risk.insert("medium".to_string(), 2);
        device_fingerprint_risk.insert("high".to_string(), 4);

        let mut user_reputation = HashMap::new();
        user_reputation.insert("trusted".to_string(), -2);
        user_reputation.insert("recurrent".to_string(), -1);
        user_reputation.insert("new".to_string(), 0);
        user_reputation.insert("high_risk".to_string(), 4);

        Self {
            ip_risk,
            email_risk,
            device_fingerprint_risk,
            user_reputation,
            night_hour: 1,
            geo_mismatch: 2,
            high_amount: 2,
            latency_extreme: 2,
            new_user_high_amount: 2,
        }
    }
}

impl ScoringConfig {
    /// Resolve the high-amount threshold for a product type, falling back to
    /// the `_default` entry for unknown types.
    pub fn amount_threshold(&self, product_type: &str) -> f64 {
        self.amount_thresholds
            .get(product_type)
            .or_else(|| self.amount_thresholds.get(DEFAULT_PRODUCT_TYPE))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Apply `REJECT_AT` / `REVIEW_AT` environment overrides.
    ///
    /// An override that does not parse as an integer is discarded with a
    /// warning and the configured value kept.
    pub fn apply_env_overrides(&mut self) {
        self.apply_threshold_overrides(
            env::var(REJECT_AT_ENV).ok().as_deref(),
            env::var(REVIEW_AT_ENV).ok().as_deref(),
        );
    }

    fn apply_threshold_overrides(&mut self, reject_at: Option<&str>, review_at: Option<&str>) {
        if let Some(raw) = reject_at {
            match raw.trim().parse::<i64>() {
                Ok(value) => self.score_to_decision.reject_at = value,
                Err(_) => warn!(
                    value = %raw,
                    "Ignoring unparseable {} override, keeping {}",
                    REJECT_AT_ENV,
                    self.score_to_decision.reject_at
                ),
            }
        }
        if let Some(raw) = review_at {
            match raw.trim().parse::<i64>() {
                Ok(value) => self.score_to_decision.review_at = value,
                Err(_) => warn!(
                    value = %raw,
                    "Ignoring unparseable {} override, keeping {}",
                    REVIEW_AT_ENV,
                    self.score_to_decision.review_at
                ),
            }
        }
    }

    /// Check construction-time invariants. A configuration that fails here
    /// must not reach the evaluator.
    pub fn validate(&self) -> Result<()> {
        if !self.amount_thresholds.contains_key(DEFAULT_PRODUCT_TYPE) {
            bail!(
                "amount_thresholds must contain a \"{}\" fallback entry",
                DEFAULT_PRODUCT_TYPE
            );
        }
        let cutoffs = &self.score_to_decision;
        if cutoffs.reject_at <= cutoffs.review_at {
            bail!(
                "score_to_decision requires reject_at > review_at (got reject_at={}, review_at={})",
                cutoffs.reject_at,
                cutoffs.review_at
            );
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a TOML file; a missing file yields the
    /// compiled-in defaults. Environment overrides and validation are the
    /// caller's construction steps.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let config = Config::builder()
            .add_source(File::from(path))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
