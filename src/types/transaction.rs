//! Transaction data structures for payment fraud decisioning

use serde::{Deserialize, Serialize};

/// Fallback key into the amount threshold table, also the product type
/// assumed when a record carries none.
pub const DEFAULT_PRODUCT_TYPE: &str = "_default";

/// Hour of day assumed when a record carries none.
pub const DEFAULT_HOUR: u8 = 12;

/// Three-level categorical risk signal (IP address, device fingerprint).
///
/// Labels are matched case-insensitively; anything unrecognized falls back
/// to `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            _ => None,
        }
    }
}

/// Email risk signal; `new_domain` marks addresses on recently registered
/// domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailRisk {
    #[default]
    Low,
    Medium,
    High,
    NewDomain,
}

impl EmailRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailRisk::Low => "low",
            EmailRisk::Medium => "medium",
            EmailRisk::High => "high",
            EmailRisk::NewDomain => "new_domain",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(EmailRisk::Low),
            "medium" => Some(EmailRisk::Medium),
            "high" => Some(EmailRisk::High),
            "new_domain" => Some(EmailRisk::NewDomain),
            _ => None,
        }
    }
}

/// Customer reputation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserReputation {
    Trusted,
    Recurrent,
    #[default]
    New,
    HighRisk,
}

impl UserReputation {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserReputation::Trusted => "trusted",
            UserReputation::Recurrent => "recurrent",
            UserReputation::New => "new",
            UserReputation::HighRisk => "high_risk",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "trusted" => Some(UserReputation::Trusted),
            "recurrent" => Some(UserReputation::Recurrent),
            "new" => Some(UserReputation::New),
            "high_risk" => Some(UserReputation::HighRisk),
            _ => None,
        }
    }
}

/// A single payment transaction to be scored for fraud risk.
///
/// Every field is optional in the input: a missing column, an empty cell or
/// an unparseable value coerces to the field's documented default instead of
/// failing the record, so malformed input degrades toward the lowest-risk
/// interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Number of prior chargebacks on the account
    #[serde(default, deserialize_with = "de::count")]
    pub chargeback_count: u32,

    /// IP address risk signal
    #[serde(default, deserialize_with = "de::risk_tier")]
    pub ip_risk: RiskTier,

    /// Email address risk signal
    #[serde(default, deserialize_with = "de::email_risk")]
    pub email_risk: EmailRisk,

    /// Device fingerprint risk signal
    #[serde(default, deserialize_with = "de::risk_tier")]
    pub device_fingerprint_risk: RiskTier,

    /// Customer reputation bucket
    #[serde(default, deserialize_with = "de::reputation")]
    pub user_reputation: UserReputation,

    /// Local hour of day the transaction was made (0-23)
    #[serde(default = "default_hour", deserialize_with = "de::hour")]
    pub hour: u8,

    /// Issuing-bank country code (BIN lookup)
    #[serde(default, deserialize_with = "de::country")]
    pub bin_country: String,

    /// Country resolved from the client IP
    #[serde(default, deserialize_with = "de::country")]
    pub ip_country: String,

    /// Transaction amount in MXN
    #[serde(default, deserialize_with = "de::amount")]
    pub amount_mxn: f64,

    /// Product category, keys into the amount threshold table
    #[serde(default = "default_product_type", deserialize_with = "de::product_type")]
    pub product_type: String,

    /// Processing latency observed for the request
    #[serde(default, deserialize_with = "de::latency")]
    pub latency_ms: u64,

    /// Transactions by this customer in the trailing 30 days
    #[serde(default, deserialize_with = "de::count")]
    pub customer_txn_30d: u32,
}

fn default_hour() -> u8 {
    DEFAULT_HOUR
}

fn default_product_type() -> String {
    DEFAULT_PRODUCT_TYPE.to_string()
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            chargeback_count: 0,
            ip_risk: RiskTier::Low,
            email_risk: EmailRisk::Low,
            device_fingerprint_risk: RiskTier::Low,
            user_reputation: UserReputation::New,
            hour: DEFAULT_HOUR,
            bin_country: String::new(),
            ip_country: String::new(),
            amount_mxn: 0.0,
            product_type: DEFAULT_PRODUCT_TYPE.to_string(),
            latency_ms: 0,
            customer_txn_30d: 0,
        }
    }
}

/// Lenient field deserializers: each helper reads the raw cell as a string
/// and coerces failures to the field default rather than erroring.
mod de {
    use super::*;
    use serde::Deserializer;

    /// Cells may arrive as strings (CSV) or as native numbers (JSON);
    /// normalize everything to a string before coercing.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawField {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<RawField>::deserialize(deserializer)? {
            None => String::new(),
            Some(RawField::Text(value)) => value,
            Some(RawField::Integer(value)) => value.to_string(),
            Some(RawField::Float(value)) => value.to_string(),
        })
    }

    /// Integer cells may arrive in float notation ("3.0"); accept both.
    fn parse_integer(raw: &str) -> Option<u64> {
        let s = raw.trim();
        s.parse::<u64>().ok().or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(parse_integer(&raw(deserializer)?)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0))
    }

    pub fn latency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        Ok(parse_integer(&raw(deserializer)?).unwrap_or(0))
    }

    pub fn hour<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        Ok(parse_integer(&raw(deserializer)?)
            .and_then(|n| u8::try_from(n).ok())
            .unwrap_or(DEFAULT_HOUR))
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(raw(deserializer)?.trim().parse().unwrap_or(0.0))
    }

    pub fn risk_tier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RiskTier, D::Error> {
        Ok(RiskTier::from_label(&raw(deserializer)?).unwrap_or_default())
    }

    pub fn email_risk<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EmailRisk, D::Error> {
        Ok(EmailRisk::from_label(&raw(deserializer)?).unwrap_or_default())
    }

    pub fn reputation<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<UserReputation, D::Error> {
        Ok(UserReputation::from_label(&raw(deserializer)?).unwrap_or_default())
    }

    pub fn country<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(raw(deserializer)?.trim().to_string())
    }

    pub fn product_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = raw(deserializer)?.trim().to_lowercase();
        if value.is_empty() {
            Ok(DEFAULT_PRODUCT_TYPE.to_string())
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_csv(data: &str) -> Transaction {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let record = reader.records().next().unwrap().unwrap();
        record.deserialize(Some(&headers)).unwrap()
    }

    #[test]
    fn test_full_row_parses() {
        let tx = parse_csv(
            "chargeback_count,ip_risk,email_risk,device_fingerprint_risk,user_reputation,hour,bin_country,ip_country,amount_mxn,product_type,latency_ms,customer_txn_30d\n\
             2,high,new_domain,medium,trusted,23,MX,US,1500.5,digital,3000,7",
        );

        assert_eq!(tx.chargeback_count, 2);
        assert_eq!(tx.ip_risk, RiskTier::High);
        assert_eq!(tx.email_risk, EmailRisk::NewDomain);
        assert_eq!(tx.device_fingerprint_risk, RiskTier::Medium);
        assert_eq!(tx.user_reputation, UserReputation::Trusted);
        assert_eq!(tx.hour, 23);
        assert_eq!(tx.bin_country, "MX");
        assert_eq!(tx.ip_country, "US");
        assert_eq!(tx.amount_mxn, 1500.5);
        assert_eq!(tx.product_type, "digital");
        assert_eq!(tx.latency_ms, 3000);
        assert_eq!(tx.customer_txn_30d, 7);
    }

    #[test]
    fn test_missing_columns_fall_back_to_defaults() {
        let tx = parse_csv("amount_mxn,ip_risk\n9000,high");

        assert_eq!(tx.amount_mxn, 9000.0);
        assert_eq!(tx.ip_risk, RiskTier::High);
        assert_eq!(tx.hour, DEFAULT_HOUR);
        assert_eq!(tx.product_type, DEFAULT_PRODUCT_TYPE);
        assert_eq!(tx.user_reputation, UserReputation::New);
        assert_eq!(tx.chargeback_count, 0);
    }

    #[test]
    fn test_malformed_cells_coerce_to_defaults() {
        let tx = parse_csv(
            "chargeback_count,ip_risk,hour,amount_mxn,latency_ms,product_type\n\
             not_a_number,suspicious,99x,abc,oops,",
        );

        assert_eq!(tx.chargeback_count, 0);
        assert_eq!(tx.ip_risk, RiskTier::Low);
        assert_eq!(tx.hour, DEFAULT_HOUR);
        assert_eq!(tx.amount_mxn, 0.0);
        assert_eq!(tx.latency_ms, 0);
        assert_eq!(tx.product_type, DEFAULT_PRODUCT_TYPE);
    }

    #[test]
    fn test_categorical_labels_are_case_insensitive() {
        let tx = parse_csv(
            "ip_risk,user_reputation,email_risk,product_type\nHIGH,Trusted,New_Domain,DIGITAL",
        );

        assert_eq!(tx.ip_risk, RiskTier::High);
        assert_eq!(tx.user_reputation, UserReputation::Trusted);
        assert_eq!(tx.email_risk, EmailRisk::NewDomain);
        // product type is normalized to lowercase for threshold lookup
        assert_eq!(tx.product_type, "digital");
    }

    #[test]
    fn test_integer_cells_accept_float_notation() {
        let tx = parse_csv("chargeback_count,hour\n3.0,22.0");

        assert_eq!(tx.chargeback_count, 3);
        assert_eq!(tx.hour, 22);
    }

    #[test]
    fn test_serialization_round_trip() {
        let tx = Transaction {
            ip_risk: RiskTier::Medium,
            email_risk: EmailRisk::NewDomain,
            user_reputation: UserReputation::HighRisk,
            amount_mxn: 250.0,
            ..Transaction::default()
        };

        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"new_domain\""));
        assert!(json.contains("\"high_risk\""));

        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }
}
