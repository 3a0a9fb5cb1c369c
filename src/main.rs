//! Fraud Decision Engine - Main Entry Point
//!
//! Reads a transaction CSV, evaluates every row through the rule pipeline,
//! and writes the decisions CSV plus optional review alerts.
//! Supports parallel row evaluation for large batches.

use anyhow::Result;
use fraud_decision_engine::{
    config::AppConfig, engine::evaluator::RiskEvaluator, metrics::BatchMetrics,
    reader::TransactionReader, types::alert::ReviewAlert, types::decision::Decision,
    writer::{AlertWriter, DecisionWriter},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let from_file = Path::new(&config_path).exists();
    let mut config = AppConfig::load_from_path(&config_path)?;

    // Initialize logging; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!("Starting Fraud Decision Engine");
    if from_file {
        info!(path = %config_path, "Configuration loaded");
    } else {
        info!(path = %config_path, "No configuration file found, using built-in defaults");
    }

    // Named environment overrides are applied once, before validation;
    // the scoring configuration is immutable from here on
    config.scoring.apply_env_overrides();
    config.scoring.validate()?;
    info!(
        reject_at = config.scoring.score_to_decision.reject_at,
        review_at = config.scoring.score_to_decision.review_at,
        chargeback_hard_block = config.scoring.chargeback_hard_block,
        "Decision thresholds"
    );

    let metrics = Arc::new(BatchMetrics::new());
    let evaluator = Arc::new(RiskEvaluator::new(config.scoring.clone()));

    let mut reader = TransactionReader::open(&config.io.input_path)?;
    let mut writer = DecisionWriter::create(&config.io.output_path)?;
    writer.write_headers(reader.headers())?;

    let mut alerts = match &config.io.alerts_path {
        Some(path) => {
            info!(path = %path, "Review alerts enabled");
            Some(AlertWriter::create(path)?)
        }
        None => None,
    };

    let num_workers = config.pipeline.workers;
    info!(workers = num_workers, "Starting batch evaluation");

    // Rows are evaluated concurrently but written back in input order
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let mut pending = Vec::new();

    for (idx, row) in reader.rows().enumerate() {
        let row_number = idx as u64 + 1;
        let (record, transaction) = match row {
            Ok(pair) => pair,
            Err(e) => {
                warn!(row = row_number, error = %e, "Skipping unreadable row");
                continue;
            }
        };

        let permit = semaphore.clone().acquire_owned().await?;
        let evaluator = evaluator.clone();
        let metrics = metrics.clone();

        let handle = tokio::spawn(async move {
            let start_time = Instant::now();
            let result = evaluator.evaluate(&transaction);
            metrics.record_decision(start_time.elapsed(), &result);
            drop(permit);
            result
        });
        pending.push((row_number, record, handle));
    }

    let mut written = 0u64;
    for (row_number, record, handle) in pending {
        let result = handle.await?;

        if result.decision == Decision::Accepted {
            debug!(
                row = row_number,
                risk_score = result.risk_score,
                "Transaction accepted"
            );
        } else {
            metrics.record_alert();
            info!(
                row = row_number,
                decision = %result.decision,
                risk_score = result.risk_score,
                reasons = %result.reason_trail(),
                "Transaction flagged"
            );
            if let Some(alert_writer) = alerts.as_mut() {
                alert_writer.publish(&ReviewAlert::new(row_number, &result))?;
            }
        }

        writer.write(&record, &result)?;
        written += 1;

        if written % 1000 == 0 {
            info!(
                written,
                throughput = format!("{:.1} tx/s", metrics.get_throughput()),
                "Processing milestone"
            );
        }
    }

    writer.flush()?;
    if let Some(alert_writer) = alerts.as_mut() {
        alert_writer.flush()?;
    }

    info!(
        rows = written,
        output = %config.io.output_path,
        "Batch complete"
    );
    metrics.print_summary();

    Ok(())
}
