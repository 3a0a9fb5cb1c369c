//! Test Transaction Generator
//!
//! Generates randomized transaction rows as CSV input for pipeline testing.

use rand::Rng;
use serde::Serialize;
use tracing::info;

/// Row structure matching the pipeline's expected input columns
#[derive(Debug, Clone, Serialize)]
struct TransactionRow {
    chargeback_count: u32,
    ip_risk: String,
    email_risk: String,
    device_fingerprint_risk: String,
    user_reputation: String,
    hour: u8,
    bin_country: String,
    ip_country: String,
    amount_mxn: f64,
    product_type: String,
    latency_ms: u64,
    customer_txn_30d: u32,
}

/// Transaction generator for testing
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a random legitimate transaction
    fn generate_legitimate(&mut self) -> TransactionRow {
        let country = self.random_choice(&["MX", "US", "CA", "CO", "AR"]).to_string();

        TransactionRow {
            chargeback_count: 0,
            ip_risk: self.random_choice(&["low", "low", "low", "medium"]).to_string(),
            email_risk: self.random_choice(&["low", "low", "medium"]).to_string(),
            device_fingerprint_risk: self.random_choice(&["low", "low", "medium"]).to_string(),
            user_reputation: self
                .random_choice(&["trusted", "recurrent", "new"])
                .to_string(),
            hour: self.rng.gen_range(8..21), // Business hours
            bin_country: country.clone(),
            ip_country: country, // Matching geography
            amount_mxn: self.rng.gen_range(50.0..1200.0),
            product_type: self
                .random_choice(&["digital", "physical", "subscription"])
                .to_string(),
            latency_ms: self.rng.gen_range(5..400),
            customer_txn_30d: self.rng.gen_range(0..12),
        }
    }

    /// Generate a suspicious transaction
    fn generate_suspicious(&mut self) -> TransactionRow {
        TransactionRow {
            chargeback_count: self.rng.gen_range(1..5), // Prior chargebacks
            ip_risk: self.random_choice(&["medium", "high"]).to_string(),
            email_risk: self
                .random_choice(&["medium", "high", "new_domain"])
                .to_string(),
            device_fingerprint_risk: self.random_choice(&["medium", "high"]).to_string(),
            user_reputation: self.random_choice(&["new", "high_risk"]).to_string(),
            hour: self.rng.gen_range(0..6), // Night time
            bin_country: self.random_choice(&["MX", "US"]).to_string(),
            ip_country: self.random_choice(&["RU", "CN", "NG"]).to_string(), // Mismatched geography
            amount_mxn: self.rng.gen_range(2500.0..20000.0), // High amount
            product_type: self
                .random_choice(&["digital", "physical", "giftcard"])
                .to_string(),
            latency_ms: self.rng.gen_range(2500..15000), // Extreme latency
            customer_txn_30d: self.rng.gen_range(0..2),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_generator=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let count: usize = args
        .next()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(100);
    let output = args
        .next()
        .unwrap_or_else(|| "transactions_examples.csv".to_string());

    let mut generator = TransactionGenerator::new();
    let mut writer = csv::Writer::from_path(&output)?;
    let mut suspicious = 0usize;

    for _ in 0..count {
        // Roughly one suspicious row in five
        let row = if generator.rng.gen_bool(0.2) {
            suspicious += 1;
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };
        writer.serialize(&row)?;
    }
    writer.flush()?;

    info!(
        count,
        suspicious,
        output = %output,
        "Generated test transactions"
    );

    Ok(())
}
