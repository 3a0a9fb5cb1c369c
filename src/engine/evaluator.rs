//! Rule-based risk evaluator for payment transactions

use crate::config::ScoringConfig;
use crate::engine::scorecard::ScoreTrail;
use crate::types::decision::{Decision, DecisionResult};
use crate::types::transaction::{RiskTier, Transaction, UserReputation};

/// Score reserved exclusively for hard-block rejections.
pub const HARD_BLOCK_SCORE: i64 = 100;

/// Trailing-30-day transaction count at which the frequency buffer applies.
const FREQUENCY_BUFFER_MIN_TXN: u32 = 3;

/// Night window: 22:00 through 05:59.
fn is_night(hour: u8) -> bool {
    hour >= 22 || hour <= 5
}

/// Evaluates transactions against a fixed, ordered sequence of scoring
/// stages: hard block, categorical risks, reputation, contextual risks,
/// frequency buffer, verdict mapping.
///
/// Evaluation is a pure function of the transaction and the injected
/// configuration: no I/O, no clock reads, no state shared between calls.
/// Identical inputs always produce identical results.
pub struct RiskEvaluator {
    config: ScoringConfig,
}

impl RiskEvaluator {
    /// Create an evaluator from an already-validated configuration.
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one transaction and map the total to a verdict.
    ///
    /// Total over the whole input domain: malformed field values were already
    /// coerced to their defaults at the record boundary, and every stage
    /// tolerates unmapped categorical levels (delta 0, no reason emitted).
    pub fn evaluate(&self, tx: &Transaction) -> DecisionResult {
        if self.is_hard_block(tx) {
            return self.hard_block_result();
        }

        let mut trail = ScoreTrail::new();
        self.apply_categorical_risks(tx, &mut trail);
        self.apply_reputation(tx, &mut trail);
        self.apply_contextual_risks(tx, &mut trail);
        self.apply_frequency_buffer(tx, &mut trail);
        self.map_decision(trail)
    }

    /// Repeated chargebacks from a high-risk IP bypass scoring entirely.
    fn is_hard_block(&self, tx: &Transaction) -> bool {
        tx.chargeback_count >= self.config.chargeback_hard_block
            && tx.ip_risk == RiskTier::High
    }

    fn hard_block_result(&self) -> DecisionResult {
        DecisionResult {
            decision: Decision::Rejected,
            risk_score: HARD_BLOCK_SCORE,
            reasons: vec![format!(
                "hard_block:chargebacks>={}+ip_high",
                self.config.chargeback_hard_block
            )],
        }
    }

    fn apply_categorical_risks(&self, tx: &Transaction, trail: &mut ScoreTrail) {
        let weights = &self.config.score_weights;
        let signals = [
            ("ip_risk", &weights.ip_risk, tx.ip_risk.as_str()),
            ("email_risk", &weights.email_risk, tx.email_risk.as_str()),
            (
                "device_fingerprint_risk",
                &weights.device_fingerprint_risk,
                tx.device_fingerprint_risk.as_str(),
            ),
        ];

        for (field, table, level) in signals {
            let delta = table.get(level).copied().unwrap_or(0);
            trail.apply(delta, &format!("{field}:{level}"));
        }
    }

    fn apply_reputation(&self, tx: &Transaction, trail: &mut ScoreTrail) {
        let level = tx.user_reputation.as_str();
        let delta = self
            .config
            .score_weights
            .user_reputation
            .get(level)
            .copied()
            .unwrap_or(0);
        trail.apply(delta, &format!("user_reputation:{level}"));
    }

    /// Time, geography, amount and latency rules, in that fixed order.
    fn apply_contextual_risks(&self, tx: &Transaction, trail: &mut ScoreTrail) {
        let weights = &self.config.score_weights;

        if is_night(tx.hour) {
            trail.apply(weights.night_hour, &format!("night_hour:{}", tx.hour));
        }

        let bin_country = tx.bin_country.trim().to_uppercase();
        let ip_country = tx.ip_country.trim().to_uppercase();
        if !bin_country.is_empty() && !ip_country.is_empty() && bin_country != ip_country {
            trail.apply(
                weights.geo_mismatch,
                &format!("geo_mismatch:{bin_country}!={ip_country}"),
            );
        }

        let product_type = tx.product_type.trim().to_lowercase();
        if tx.amount_mxn >= self.config.amount_threshold(&product_type) {
            trail.apply(
                weights.high_amount,
                &format!("high_amount:{}:{}", product_type, tx.amount_mxn),
            );
            // bonus only assessed when the high-amount rule itself fired
            if tx.user_reputation == UserReputation::New {
                trail.apply(weights.new_user_high_amount, "new_user_high_amount");
            }
        }

        if tx.latency_ms >= self.config.latency_ms_extreme {
            trail.apply(
                weights.latency_extreme,
                &format!("latency_extreme:{}ms", tx.latency_ms),
            );
        }
    }

    /// Small discount for established customers, only while the running
    /// score is strictly positive. The discount size is fixed, not a weight.
    fn apply_frequency_buffer(&self, tx: &Transaction, trail: &mut ScoreTrail) {
        let established = matches!(
            tx.user_reputation,
            UserReputation::Recurrent | UserReputation::Trusted
        );
        if established && tx.customer_txn_30d >= FREQUENCY_BUFFER_MIN_TXN && trail.score() > 0 {
            trail.apply(-1, "frequency_buffer");
        }
    }

    fn map_decision(&self, trail: ScoreTrail) -> DecisionResult {
        let (score, reasons) = trail.into_parts();
        DecisionResult {
            decision: Decision::from_score(score, &self.config.score_to_decision),
            risk_score: score,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::EmailRisk;

    fn evaluator() -> RiskEvaluator {
        RiskEvaluator::new(ScoringConfig::default())
    }

    /// Low-risk baseline matching the shape of a typical clean row.
    fn base_tx() -> Transaction {
        Transaction {
            bin_country: "MX".into(),
            ip_country: "MX".into(),
            amount_mxn: 100.0,
            product_type: "digital".into(),
            latency_ms: 10,
            ..Transaction::default()
        }
    }

    #[test]
    fn test_low_risk_transaction_is_accepted() {
        let result = evaluator().evaluate(&base_tx());

        assert_eq!(result.decision, Decision::Accepted);
        assert_eq!(result.risk_score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_hard_block_short_circuits() {
        let tx = Transaction {
            chargeback_count: 3,
            ip_risk: RiskTier::High,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.decision, Decision::Rejected);
        assert_eq!(result.risk_score, HARD_BLOCK_SCORE);
        assert_eq!(result.reasons, vec!["hard_block:chargebacks>=2+ip_high"]);
    }

    #[test]
    fn test_hard_block_ignores_every_other_signal() {
        // maxed mitigating signals must not soften the hard block
        let tx = Transaction {
            chargeback_count: 2,
            ip_risk: RiskTier::High,
            user_reputation: UserReputation::Trusted,
            customer_txn_30d: 50,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.decision, Decision::Rejected);
        assert_eq!(result.risk_score, HARD_BLOCK_SCORE);
    }

    #[test]
    fn test_high_ip_without_chargebacks_scores_normally() {
        let tx = Transaction {
            chargeback_count: 1,
            ip_risk: RiskTier::High,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.risk_score, 4);
        assert_eq!(result.reasons, vec!["ip_risk:high(+4)"]);
        assert_eq!(result.decision, Decision::InReview);
    }

    #[test]
    fn test_geo_mismatch_fires_on_differing_countries() {
        let tx = Transaction {
            bin_country: "US".into(),
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.risk_score, 2);
        assert_eq!(result.reasons, vec!["geo_mismatch:US!=MX(+2)"]);
        assert_eq!(result.decision, Decision::Accepted);
    }

    #[test]
    fn test_geo_mismatch_compares_uppercased() {
        let tx = Transaction {
            bin_country: "mx".into(),
            ip_country: "MX".into(),
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_geo_mismatch_needs_both_countries() {
        let tx = Transaction {
            bin_country: "".into(),
            ip_country: "MX".into(),
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_high_amount_with_new_user_bonus() {
        let tx = Transaction {
            amount_mxn: 2500.0,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(
            result.reasons,
            vec!["high_amount:digital:2500(+2)", "new_user_high_amount(+2)"]
        );
        assert_eq!(result.risk_score, 4);
        assert_eq!(result.decision, Decision::InReview);
    }

    #[test]
    fn test_new_user_bonus_requires_high_amount() {
        // new user below the threshold gets neither reason
        let tx = Transaction {
            amount_mxn: 2499.99,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_high_amount_without_bonus_for_established_user() {
        let tx = Transaction {
            amount_mxn: 3000.0,
            user_reputation: UserReputation::Recurrent,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(
            result.reasons,
            vec!["user_reputation:recurrent(-1)", "high_amount:digital:3000(+2)"]
        );
        assert_eq!(result.risk_score, 1);
    }

    #[test]
    fn test_unknown_product_type_uses_default_threshold() {
        let tx = Transaction {
            amount_mxn: 4000.0,
            product_type: "giftcard".into(),
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(
            result.reasons,
            vec!["high_amount:giftcard:4000(+2)", "new_user_high_amount(+2)"]
        );
    }

    #[test]
    fn test_night_hour_boundaries() {
        for (hour, fires) in [(22, true), (5, true), (2, true), (6, false), (21, false)] {
            let tx = Transaction { hour, ..base_tx() };
            let result = evaluator().evaluate(&tx);
            assert_eq!(
                result.risk_score,
                if fires { 1 } else { 0 },
                "hour {hour}"
            );
            if fires {
                assert_eq!(result.reasons, vec![format!("night_hour:{hour}(+1)")]);
            }
        }
    }

    #[test]
    fn test_latency_boundary_is_inclusive() {
        let at = Transaction {
            latency_ms: 2500,
            ..base_tx()
        };
        let below = Transaction {
            latency_ms: 2499,
            ..base_tx()
        };

        assert_eq!(
            evaluator().evaluate(&at).reasons,
            vec!["latency_extreme:2500ms(+2)"]
        );
        assert!(evaluator().evaluate(&below).reasons.is_empty());
    }

    #[test]
    fn test_frequency_buffer_discounts_positive_score() {
        let tx = Transaction {
            ip_risk: RiskTier::Medium,
            user_reputation: UserReputation::Recurrent,
            customer_txn_30d: 5,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(
            result.reasons,
            vec![
                "ip_risk:medium(+2)",
                "user_reputation:recurrent(-1)",
                "frequency_buffer(-1)"
            ]
        );
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.decision, Decision::Accepted);
    }

    #[test]
    fn test_frequency_buffer_skipped_at_zero_score() {
        // trusted (-2) cancels ip medium (+2); buffer needs a strictly
        // positive running score
        let tx = Transaction {
            ip_risk: RiskTier::Medium,
            user_reputation: UserReputation::Trusted,
            customer_txn_30d: 4,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.risk_score, 0);
        assert_eq!(result.decision, Decision::Accepted);
        assert!(!result.reasons.iter().any(|r| r.contains("frequency_buffer")));
    }

    #[test]
    fn test_frequency_buffer_requires_enough_history() {
        let tx = Transaction {
            ip_risk: RiskTier::Medium,
            user_reputation: UserReputation::Recurrent,
            customer_txn_30d: 2,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);
        assert!(!result.reasons.iter().any(|r| r.contains("frequency_buffer")));
    }

    #[test]
    fn test_negative_score_is_not_clamped() {
        let tx = Transaction {
            user_reputation: UserReputation::Trusted,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.risk_score, -2);
        assert_eq!(result.reasons, vec!["user_reputation:trusted(-2)"]);
        assert_eq!(result.decision, Decision::Accepted);
    }

    #[test]
    fn test_score_at_reject_cutoff_rejects() {
        // 4 (ip high) + 2 (email new_domain) + 4 (device high) = 10
        let tx = Transaction {
            ip_risk: RiskTier::High,
            email_risk: EmailRisk::NewDomain,
            device_fingerprint_risk: RiskTier::High,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(result.risk_score, 10);
        assert_eq!(result.decision, Decision::Rejected);
    }

    #[test]
    fn test_stage_order_of_reasons() {
        let tx = Transaction {
            ip_risk: RiskTier::Medium,
            email_risk: EmailRisk::High,
            user_reputation: UserReputation::HighRisk,
            hour: 23,
            bin_country: "US".into(),
            amount_mxn: 2600.0,
            latency_ms: 9000,
            ..base_tx()
        };
        let result = evaluator().evaluate(&tx);

        assert_eq!(
            result.reasons,
            vec![
                "ip_risk:medium(+2)",
                "email_risk:high(+3)",
                "user_reputation:high_risk(+4)",
                "night_hour:23(+1)",
                "geo_mismatch:US!=MX(+2)",
                "high_amount:digital:2600(+2)",
                "latency_extreme:9000ms(+2)"
            ]
        );
        assert_eq!(result.risk_score, 16);
        assert_eq!(result.decision, Decision::Rejected);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let tx = Transaction {
            ip_risk: RiskTier::Medium,
            user_reputation: UserReputation::Recurrent,
            amount_mxn: 5000.0,
            customer_txn_30d: 9,
            hour: 23,
            ..base_tx()
        };
        let evaluator = evaluator();

        let first = evaluator.evaluate(&tx);
        for _ in 0..10 {
            assert_eq!(evaluator.evaluate(&tx), first);
        }
    }

    #[test]
    fn test_custom_cutoffs_move_decisions() {
        let mut config = ScoringConfig::default();
        config.score_to_decision.reject_at = 4;
        config.score_to_decision.review_at = 2;
        let evaluator = RiskEvaluator::new(config);

        let tx = Transaction {
            bin_country: "US".into(),
            ..base_tx()
        };
        // geo mismatch alone now lands in review
        assert_eq!(evaluator.evaluate(&tx).decision, Decision::InReview);
    }
}
