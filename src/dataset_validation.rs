//! Dataset validation against the generator's record invariants

use crate::config::GeneratorConfig;
use crate::{Result, Transaction};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Record-level violations
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordViolation {
    #[error("Sender and receiver are the same account: {0}")]
    SelfTransfer(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Country {country} does not carry risk score {risk_score}")]
    InconsistentCountryRisk { country: String, risk_score: f64 },

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Timestamp outside window: {0}")]
    TimestampOutsideWindow(String),

    #[error("Expected {expected} records, found {actual}")]
    RecordCountMismatch { expected: usize, actual: usize },
}

impl RecordViolation {
    /// Short category name used for aggregation
    pub fn kind(&self) -> &'static str {
        match self {
            RecordViolation::SelfTransfer(_) => "self_transfer",
            RecordViolation::UnknownAccount(_) => "unknown_account",
            RecordViolation::UnknownDevice(_) => "unknown_device",
            RecordViolation::InconsistentCountryRisk { .. } => "inconsistent_country_risk",
            RecordViolation::AmountOutOfRange(_) => "amount_out_of_range",
            RecordViolation::InvalidIpAddress(_) => "invalid_ip_address",
            RecordViolation::TimestampOutsideWindow(_) => "timestamp_outside_window",
            RecordViolation::RecordCountMismatch { .. } => "record_count_mismatch",
        }
    }
}

/// A violation and the 0-based row it was found in (None for dataset-level findings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub row: Option<usize>,
    pub violation: RecordViolation,
}

/// Validation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub records_checked: usize,
    /// Records in the elevated amount range paired with a high-risk country
    pub elevated_records: usize,
    pub violations: Vec<Violation>,
    pub validated_at: DateTime<Utc>,
}

impl ValidationReport {
    /// Check if the dataset passed every check
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violation counts per category
    pub fn counts_by_kind(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for v in &self.violations {
            *counts.entry(v.violation.kind().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Export as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Validates datasets produced with a given configuration
pub struct DatasetValidator {
    config: GeneratorConfig,
    account_pattern: Regex,
    device_pattern: Regex,
    ip_pattern: Regex,
    window_end: Option<NaiveDateTime>,
}

impl DatasetValidator {
    /// Create a validator for datasets generated with `config`
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            account_pattern: Regex::new(r"^ACC(\d{4,})$")?,
            device_pattern: Regex::new(r"^D(\d{3,})$")?,
            ip_pattern: Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$")?,
            window_end: None,
        })
    }

    /// Check timestamps against a window ending at the generation time.
    ///
    /// Without it the window ends at the latest timestamp in the dataset.
    pub fn with_window_end(mut self, window_end: NaiveDateTime) -> Self {
        self.window_end = Some(window_end);
        self
    }

    /// Validate every record of a dataset
    pub fn validate(&self, transactions: &[Transaction]) -> ValidationReport {
        let window_end = self
            .window_end
            .or_else(|| transactions.iter().map(|tx| tx.timestamp).max());
        let mut violations = Vec::new();
        let mut elevated_records = 0;

        for (row, tx) in transactions.iter().enumerate() {
            let (elevated, found) = self.check_record(tx, window_end);
            if elevated {
                elevated_records += 1;
            }
            violations.extend(found.into_iter().map(|violation| Violation {
                row: Some(row),
                violation,
            }));
        }

        if violations.is_empty() {
            debug!(records = transactions.len(), "Dataset passed validation");
        } else {
            warn!(
                records = transactions.len(),
                violations = violations.len(),
                "Dataset validation found violations"
            );
        }

        ValidationReport {
            records_checked: transactions.len(),
            elevated_records,
            violations,
            validated_at: Utc::now(),
        }
    }

    /// Validate records and the configured record count
    pub fn validate_with_count(&self, transactions: &[Transaction]) -> ValidationReport {
        let mut report = self.validate(transactions);
        let expected = self.config.num_transactions;
        if transactions.len() != expected {
            report.violations.push(Violation {
                row: None,
                violation: RecordViolation::RecordCountMismatch {
                    expected,
                    actual: transactions.len(),
                },
            });
        }
        report
    }

    /// Check a single record, returning whether it is an elevated transfer
    fn check_record(
        &self,
        tx: &Transaction,
        window_end: Option<NaiveDateTime>,
    ) -> (bool, Vec<RecordViolation>) {
        let mut found = Vec::new();

        if tx.from_account == tx.to_account {
            found.push(RecordViolation::SelfTransfer(tx.from_account.clone()));
        }

        for account in [&tx.from_account, &tx.to_account] {
            let known = self.is_known_id(
                &self.account_pattern,
                account,
                self.config.num_accounts,
                |i| self.config.account_id(i),
            );
            if !known {
                found.push(RecordViolation::UnknownAccount(account.clone()));
            }
        }

        let known_device = self.is_known_id(
            &self.device_pattern,
            &tx.device_id,
            self.config.num_devices,
            |i| self.config.device_id(i),
        );
        if !known_device {
            found.push(RecordViolation::UnknownDevice(tx.device_id.clone()));
        }

        if !self.config.countries.is_consistent(&tx.country, tx.risk_score) {
            found.push(RecordViolation::InconsistentCountryRisk {
                country: tx.country.clone(),
                risk_score: tx.risk_score,
            });
        }

        let elevated = self.config.elevated_amount.contains(tx.amount)
            && tx.risk_score >= self.config.high_risk_threshold;
        if !elevated && !self.config.normal_amount.contains(tx.amount) {
            found.push(RecordViolation::AmountOutOfRange(format!(
                "{:.2} is outside {}-{} and not an elevated transfer",
                tx.amount, self.config.normal_amount.min, self.config.normal_amount.max
            )));
        }

        if !self.is_valid_ip(&tx.ip_address) {
            found.push(RecordViolation::InvalidIpAddress(tx.ip_address.clone()));
        }

        if let Some(end) = window_end {
            // Windows reaching past the calendar start are open-ended
            let start = Duration::try_days(self.config.lookback_days)
                .and_then(|lookback| end.checked_sub_signed(lookback))
                .unwrap_or(NaiveDateTime::MIN);
            if tx.timestamp < start || tx.timestamp > end {
                found.push(RecordViolation::TimestampOutsideWindow(format!(
                    "{} is outside {} to {}",
                    tx.timestamp_string(),
                    start,
                    end
                )));
            }
        }

        (elevated, found)
    }

    /// Check an identifier against its pattern, 1-based pool size and canonical form
    fn is_known_id(
        &self,
        pattern: &Regex,
        id: &str,
        pool_size: usize,
        canonical: impl Fn(usize) -> String,
    ) -> bool {
        pattern
            .captures(id)
            .and_then(|caps| caps[1].parse::<usize>().ok())
            .filter(|&n| n >= 1 && n <= pool_size)
            .is_some_and(|n| canonical(n - 1) == id)
    }

    fn is_valid_ip(&self, ip: &str) -> bool {
        let Some(caps) = self.ip_pattern.captures(ip) else {
            return false;
        };
        let (min, max) = (
            u16::from(self.config.ip_octet_min),
            u16::from(self.config.ip_octet_max),
        );
        (1..=4).all(|i| {
            caps[i]
                .parse::<u16>()
                .is_ok_and(|octet| octet >= min && octet <= max)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_transaction;
    use crate::TransactionGenerator;
    use chrono::NaiveDate;

    fn validator() -> DatasetValidator {
        DatasetValidator::new(&GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn test_valid_record() {
        let report = validator().validate(&[sample_transaction()]);

        assert!(report.is_valid());
        assert_eq!(report.records_checked, 1);
        assert_eq!(report.elevated_records, 0);
    }

    #[test]
    fn test_generated_dataset_is_valid() {
        let config = GeneratorConfig {
            num_transactions: 1000,
            ..Default::default()
        };
        let reference = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let transactions = TransactionGenerator::new(config.clone())
            .unwrap()
            .generate_at(reference)
            .unwrap();

        let report = DatasetValidator::new(&config)
            .unwrap()
            .with_window_end(reference)
            .validate_with_count(&transactions);

        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(
            report.elevated_records,
            transactions.iter().filter(|tx| tx.elevated).count()
        );
    }

    #[test]
    fn test_self_transfer() {
        let mut tx = sample_transaction();
        tx.to_account = tx.from_account.clone();

        let report = validator().validate(&[tx]);
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v.violation, RecordViolation::SelfTransfer(_))));
    }

    #[test]
    fn test_unknown_identifiers() {
        let mut tx = sample_transaction();
        tx.to_account = "ACC0301".to_string();
        tx.device_id = "DEV-1".to_string();

        let report = validator().validate(&[tx]);
        let counts = report.counts_by_kind();
        assert_eq!(counts["unknown_account"], 1);
        assert_eq!(counts["unknown_device"], 1);
    }

    #[test]
    fn test_non_canonical_identifiers() {
        for (account, device) in [("ACC00001", "D0001"), ("ACC01", "D1"), ("ACC0000", "D000")] {
            let mut tx = sample_transaction();
            tx.from_account = account.to_string();
            tx.device_id = device.to_string();

            let counts = validator().validate(&[tx]).counts_by_kind();
            assert_eq!(counts.get("unknown_account"), Some(&1), "{}", account);
            assert_eq!(counts.get("unknown_device"), Some(&1), "{}", device);
        }
    }

    #[test]
    fn test_inconsistent_country_risk() {
        let mut tx = sample_transaction();
        tx.risk_score = 0.9;

        let report = validator().validate(&[tx]);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].row, Some(0));
        assert!(matches!(
            report.violations[0].violation,
            RecordViolation::InconsistentCountryRisk { .. }
        ));
    }

    #[test]
    fn test_elevated_amount_requires_high_risk_country() {
        let mut tx = sample_transaction();
        tx.amount = 12_000.0;

        let report = validator().validate(&[tx.clone()]);
        assert!(!report.is_valid());

        tx.country = "Cayman Islands".to_string();
        tx.risk_score = 0.9;
        let report = validator().validate(&[tx]);
        assert!(report.is_valid());
        assert_eq!(report.elevated_records, 1);
    }

    #[test]
    fn test_invalid_ip_addresses() {
        for ip in ["10.20.30", "10.20.30.5", "10.20.30.400", "a.b.c.d"] {
            let mut tx = sample_transaction();
            tx.ip_address = ip.to_string();

            let report = validator().validate(&[tx]);
            assert!(
                report
                    .violations
                    .iter()
                    .any(|v| v.violation.kind() == "invalid_ip_address"),
                "{} should be rejected",
                ip
            );
        }
    }

    #[test]
    fn test_timestamp_window() {
        let tx = sample_transaction();
        let end = tx.timestamp + Duration::days(31);

        let report = validator().with_window_end(end).validate(&[tx.clone()]);
        assert!(matches!(
            report.violations[0].violation,
            RecordViolation::TimestampOutsideWindow(_)
        ));

        let report = validator()
            .with_window_end(tx.timestamp + Duration::days(30))
            .validate(&[tx]);
        assert!(report.is_valid());
    }

    #[test]
    fn test_window_longer_than_calendar() {
        let config = GeneratorConfig {
            lookback_days: 1_000_000_000,
            ..Default::default()
        };
        let tx = sample_transaction();

        let report = DatasetValidator::new(&config)
            .unwrap()
            .with_window_end(tx.timestamp)
            .validate(&[tx]);
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_record_count_mismatch() {
        let report = validator().validate_with_count(&[sample_transaction()]);

        let last = report.violations.last().unwrap();
        assert_eq!(last.row, None);
        assert_eq!(
            last.violation,
            RecordViolation::RecordCountMismatch {
                expected: 2000,
                actual: 1
            }
        );
    }

    #[test]
    fn test_json_export() {
        let mut tx = sample_transaction();
        tx.to_account = tx.from_account.clone();
        let report = validator().validate(&[tx]);

        let json = report.to_json().unwrap();
        assert!(json.contains("SelfTransfer"));
        assert!(json.contains("records_checked"));
    }
}
