//! Generator configuration

use crate::country_catalog::CountryCatalog;
use crate::GeneratorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest accepted lookback window, roughly one hundred years
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Inclusive amount range in currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }

    fn check(&self, label: &str) -> Result<(), GeneratorError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(GeneratorError::InvalidConfig(format!(
                "{} amount range must be finite",
                label
            )));
        }
        if self.min <= 0.0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "{} amount minimum {} must be positive",
                label, self.min
            )));
        }
        if self.min > self.max {
            return Err(GeneratorError::InvalidConfig(format!(
                "{} amount minimum {} exceeds maximum {}",
                label, self.min, self.max
            )));
        }
        // Sampled amounts are rounded to cents and must stay inside the bounds
        for bound in [self.min, self.max] {
            if (bound * 100.0).round() / 100.0 != bound {
                return Err(GeneratorError::InvalidConfig(format!(
                    "{} amount bound {} is not a whole number of cents",
                    label, bound
                )));
            }
        }
        Ok(())
    }
}

/// Transaction generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub num_accounts: usize,
    pub num_devices: usize,
    pub num_transactions: usize,
    pub countries: CountryCatalog,
    pub normal_amount: AmountRange,
    pub elevated_amount: AmountRange,
    /// Probability of the suspicious high-value branch
    pub elevated_probability: f64,
    /// Minimum country risk for suspicious high-value transfers
    pub high_risk_threshold: f64,
    pub lookback_days: i64,
    pub ip_octet_min: u8,
    pub ip_octet_max: u8,
    pub output_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_accounts: 300,
            num_devices: 100,
            num_transactions: 2000,
            countries: CountryCatalog::default_catalog(),
            normal_amount: AmountRange::new(10.0, 2000.0),
            elevated_amount: AmountRange::new(5000.0, 20000.0),
            elevated_probability: 0.05,
            high_risk_threshold: 0.85,
            lookback_days: 30,
            ip_octet_min: 10,
            ip_octet_max: 255,
            output_path: PathBuf::from("data/transactions.csv"),
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from a TOML file, defaulting missing keys
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, GeneratorError> {
        Ok(toml::from_str(raw)?)
    }

    /// Account identifier for a 0-based pool index
    pub fn account_id(&self, index: usize) -> String {
        format!("ACC{:04}", index + 1)
    }

    /// Device identifier for a 0-based pool index
    pub fn device_id(&self, index: usize) -> String {
        format!("D{:03}", index + 1)
    }

    /// Validate the configuration before any generation starts
    pub fn validate(&self) -> Result<(), GeneratorError> {
        // Receiver resampling never terminates with a single account
        if self.num_accounts < 2 {
            return Err(GeneratorError::InvalidConfig(format!(
                "at least 2 accounts are required, got {}",
                self.num_accounts
            )));
        }

        if self.num_devices == 0 {
            return Err(GeneratorError::InvalidConfig(
                "device pool must not be empty".to_string(),
            ));
        }

        self.countries
            .check()
            .map_err(GeneratorError::InvalidConfig)?;

        self.normal_amount.check("normal")?;
        self.elevated_amount.check("elevated")?;

        if !(0.0..=1.0).contains(&self.elevated_probability) {
            return Err(GeneratorError::InvalidConfig(format!(
                "elevated probability {} is outside [0, 1]",
                self.elevated_probability
            )));
        }

        if self.elevated_probability > 0.0
            && self.countries.at_or_above(self.high_risk_threshold).is_empty()
        {
            return Err(GeneratorError::InvalidConfig(format!(
                "no country has risk >= {} for elevated transfers",
                self.high_risk_threshold
            )));
        }

        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(GeneratorError::InvalidConfig(format!(
                "lookback window of {} days is outside [0, {}]",
                self.lookback_days, MAX_LOOKBACK_DAYS
            )));
        }

        if self.ip_octet_min > self.ip_octet_max {
            return Err(GeneratorError::InvalidConfig(format!(
                "ip octet minimum {} exceeds maximum {}",
                self.ip_octet_min, self.ip_octet_max
            )));
        }

        Ok(())
    }
}
