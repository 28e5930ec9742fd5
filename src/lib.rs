//! # Transaction Datagen
//!
//! A seeded generator of synthetic money-transfer datasets for graph-based fraud analytics.
//!
//! ## Features
//!
//! - **Deterministic Generation**: Explicitly seeded RNG, identical datasets for identical inputs
//! - **Suspicious Transfers**: Rare high-value transfers routed through high-risk jurisdictions
//! - **Country Risk Catalog**: Static (country, risk score) pairs attached to every transfer
//! - **Stable CSV Schema**: Fixed column order for downstream graph loaders
//! - **Dataset Validation**: Re-checks generated files against every record invariant
//! - **Network Summary**: Local preview of the dashboard metrics for a dataset
//!
//! ## Example
//!
//! ```no_run
//! use transaction_datagen::{GeneratorConfig, TransactionGenerator};
//!
//! let config = GeneratorConfig::default();
//! let mut generator = TransactionGenerator::new(config.clone()).unwrap();
//! let transactions = generator.generate().unwrap();
//! transaction_datagen::write_transactions(&config.output_path, &transactions).unwrap();
//! ```

pub mod config;
pub mod country_catalog;
pub mod dataset_validation;
pub mod generator;
pub mod network_summary;
pub mod output;

pub use config::{AmountRange, GeneratorConfig, MAX_LOOKBACK_DAYS};
pub use country_catalog::{Country, CountryCatalog, DASHBOARD_RISK_THRESHOLD};
pub use dataset_validation::{DatasetValidator, RecordViolation, ValidationReport, Violation};
pub use generator::TransactionGenerator;
pub use network_summary::{NetworkSummary, SenderTotal, SharedDevice, TransferGraph, TransferPath};
pub use output::{fingerprint_file, read_transactions, write_transactions, CSV_HEADER};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp layout used in the CSV output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generator errors
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Synthetic money transfer, one CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub from_account: String,
    pub to_account: String,
    #[serde(with = "amount_format")]
    pub amount: f64,
    pub device_id: String,
    pub ip_address: String,
    pub country: String,
    pub risk_score: f64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    /// Produced by the rare high-value branch; not part of the file schema
    #[serde(skip)]
    pub elevated: bool,
}

impl Transaction {
    /// Check if the transfer lands in a country the dashboard flags
    pub fn is_high_risk(&self) -> bool {
        self.risk_score > DASHBOARD_RISK_THRESHOLD
    }

    /// Format the timestamp the way it is written to disk
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

mod amount_format {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.2}", amount))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        f64::deserialize(deserializer)
    }
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn sample_transaction() -> Transaction {
        Transaction {
            from_account: "ACC0001".to_string(),
            to_account: "ACC0002".to_string(),
            amount: 1234.5,
            device_id: "D001".to_string(),
            ip_address: "10.20.30.40".to_string(),
            country: "USA".to_string(),
            risk_score: 0.2,
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 3)
                .unwrap(),
            elevated: false,
        }
    }

    #[test]
    fn test_timestamp_string() {
        let tx = sample_transaction();
        assert_eq!(tx.timestamp_string(), "2024-03-09 07:05:03");
    }

    #[test]
    fn test_high_risk_flag() {
        let mut tx = sample_transaction();
        assert!(!tx.is_high_risk());

        tx.country = "Panama".to_string();
        tx.risk_score = 0.85;
        assert!(tx.is_high_risk());
    }

    #[test]
    fn test_json_excludes_elevated_flag() {
        let mut tx = sample_transaction();
        tx.elevated = true;

        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"amount\":\"1234.50\""));
        assert!(json.contains("\"timestamp\":\"2024-03-09 07:05:03\""));
        assert!(!json.contains("elevated"));
    }

    #[test]
    fn test_json_error_converts() {
        let err: GeneratorError = serde_json::from_str::<Transaction>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, GeneratorError::Json(_)));
        assert!(err.to_string().starts_with("JSON error: "));
    }

    #[test]
    fn test_error_display() {
        let err = GeneratorError::InvalidConfig("device pool must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: device pool must not be empty"
        );
    }
}
