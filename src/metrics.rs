//! Batch statistics tracking for the fraud decision pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::decision::DecisionResult;

/// Metrics collector for a batch run
pub struct BatchMetrics {
    /// Total transactions evaluated
    pub transactions_processed: AtomicU64,
    /// Total review alerts emitted
    pub alerts_generated: AtomicU64,
    /// Decisions by verdict
    decisions_by_verdict: RwLock<HashMap<String, u64>>,
    /// Fired-rule counts across the batch
    rule_counts: RwLock<HashMap<String, u64>>,
    /// Per-row evaluation times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Risk scores seen (hard blocks included)
    scores: RwLock<Vec<i64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl BatchMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            transactions_processed: AtomicU64::new(0),
            alerts_generated: AtomicU64::new(0),
            decisions_by_verdict: RwLock::new(HashMap::new()),
            rule_counts: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            scores: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record one evaluated transaction
    pub fn record_decision(&self, processing_time: Duration, result: &DecisionResult) {
        self.transactions_processed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
        }

        if let Ok(mut scores) = self.scores.write() {
            scores.push(result.risk_score);
        }

        if let Ok(mut verdicts) = self.decisions_by_verdict.write() {
            *verdicts
                .entry(result.decision.as_str().to_string())
                .or_insert(0) += 1;
        }

        if let Ok(mut rules) = self.rule_counts.write() {
            for reason in &result.reasons {
                *rules.entry(rule_name(reason).to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Record an emitted review alert
    pub fn record_alert(&self) {
        self.alerts_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Get evaluation time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get risk score spread across the batch
    pub fn get_score_stats(&self) -> ScoreStats {
        let scores = self.scores.read().unwrap();
        if scores.is_empty() {
            return ScoreStats::default();
        }

        ScoreStats {
            min: scores.iter().copied().min().unwrap_or(0),
            max: scores.iter().copied().max().unwrap_or(0),
            mean: scores.iter().sum::<i64>() as f64 / scores.len() as f64,
        }
    }

    /// Get current throughput (transactions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get decisions by verdict
    pub fn get_decisions_by_verdict(&self) -> HashMap<String, u64> {
        self.decisions_by_verdict.read().unwrap().clone()
    }

    /// Get fired-rule counts
    pub fn get_rule_counts(&self) -> HashMap<String, u64> {
        self.rule_counts.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let tx_count = self.transactions_processed.load(Ordering::Relaxed);
        let alert_count = self.alerts_generated.load(Ordering::Relaxed);
        let alert_rate = if tx_count > 0 {
            (alert_count as f64 / tx_count as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let score_stats = self.get_score_stats();
        let verdicts = self.get_decisions_by_verdict();
        let rules = self.get_rule_counts();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║          FRAUD DECISION PIPELINE - BATCH SUMMARY             ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Evaluated: {:>8}  │  Throughput: {:>6.1} tx/s ║",
            tx_count, throughput
        );
        info!(
            "║ Review Alerts:          {:>8}  │  Alert Rate: {:>6.1}%     ║",
            alert_count, alert_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Evaluation Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!(
            "║ Risk Score: min={:>4} mean={:>6.1} max={:>4}                     ║",
            score_stats.min, score_stats.mean, score_stats.max
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Decisions by Verdict:                                        ║");
        for (verdict, count) in &verdicts {
            let pct = if tx_count > 0 {
                (*count as f64 / tx_count as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", verdict, count, pct);
        }
        info!("╚══════════════════════════════════════════════════════════════╝");

        if !rules.is_empty() {
            let mut fired: Vec<_> = rules.iter().collect();
            fired.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            info!("Fired rules:");
            for (rule, count) in fired {
                info!("  {}: {}", rule, count);
            }
        }
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// The rule behind a reason label, e.g. "ip_risk:medium(+2)" -> "ip_risk".
fn rule_name(reason: &str) -> &str {
    reason.split([':', '(']).next().unwrap_or(reason)
}

/// Evaluation time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Risk score spread
#[derive(Debug, Default)]
pub struct ScoreStats {
    pub min: i64,
    pub max: i64,
    pub mean: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decision::Decision;

    fn result(decision: Decision, score: i64, reasons: &[&str]) -> DecisionResult {
        DecisionResult {
            decision,
            risk_score: score,
            reasons: reasons.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = BatchMetrics::new();

        metrics.record_decision(
            Duration::from_micros(100),
            &result(Decision::Accepted, 0, &[]),
        );
        metrics.record_decision(
            Duration::from_micros(200),
            &result(Decision::Rejected, 100, &["hard_block:chargebacks>=2+ip_high"]),
        );
        metrics.record_alert();

        assert_eq!(metrics.transactions_processed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.alerts_generated.load(Ordering::Relaxed), 1);

        let verdicts = metrics.get_decisions_by_verdict();
        assert_eq!(verdicts.get("ACCEPTED"), Some(&1));
        assert_eq!(verdicts.get("REJECTED"), Some(&1));

        let scores = metrics.get_score_stats();
        assert_eq!(scores.min, 0);
        assert_eq!(scores.max, 100);
    }

    #[test]
    fn test_rule_counts_strip_values() {
        let metrics = BatchMetrics::new();

        metrics.record_decision(
            Duration::from_micros(50),
            &result(
                Decision::InReview,
                4,
                &["ip_risk:medium(+2)", "geo_mismatch:US!=MX(+2)"],
            ),
        );
        metrics.record_decision(
            Duration::from_micros(50),
            &result(Decision::Accepted, 1, &["ip_risk:medium(+2)", "frequency_buffer(-1)"]),
        );

        let rules = metrics.get_rule_counts();
        assert_eq!(rules.get("ip_risk"), Some(&2));
        assert_eq!(rules.get("geo_mismatch"), Some(&1));
        assert_eq!(rules.get("frequency_buffer"), Some(&1));
    }
}
