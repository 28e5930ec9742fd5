//! Synthetic transaction generator.
//!
//! Every record is sampled independently from the configured account, device and
//! country pools. A small fraction of records take the elevated branch, which
//! jointly resamples a large amount and a high-risk jurisdiction.

use crate::config::GeneratorConfig;
use crate::country_catalog::Country;
use crate::{GeneratorError, Result, Transaction};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Transaction generator that owns its random source.
pub struct TransactionGenerator<R: Rng = StdRng> {
    config: GeneratorConfig,
    rng: R,
    accounts: Vec<String>,
    devices: Vec<String>,
    elevated_countries: Vec<Country>,
}

impl TransactionGenerator<StdRng> {
    /// Create a generator seeded from `config.seed`.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> TransactionGenerator<R> {
    /// Create a generator drawing from a caller-supplied random source.
    ///
    /// The configuration is validated before any pool is built.
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let accounts = (0..config.num_accounts)
            .map(|i| config.account_id(i))
            .collect();
        let devices = (0..config.num_devices)
            .map(|i| config.device_id(i))
            .collect();
        let elevated_countries = config
            .countries
            .at_or_above(config.high_risk_threshold)
            .into_iter()
            .cloned()
            .collect();

        Ok(Self {
            config,
            rng,
            accounts,
            devices,
            elevated_countries,
        })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Account pool in index order.
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// Device pool in index order.
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Generate the full dataset with the lookback window ending now.
    pub fn generate(&mut self) -> Result<Vec<Transaction>> {
        self.generate_at(Local::now().naive_local())
    }

    /// Generate the full dataset with the lookback window ending at `reference`.
    ///
    /// Records are returned in generation order. Fails when the window does not
    /// fit before `reference` on the calendar.
    pub fn generate_at(&mut self, reference: NaiveDateTime) -> Result<Vec<Transaction>> {
        let reference = reference.with_nanosecond(0).unwrap_or(reference);
        let count = self.config.num_transactions;
        let (start, window) = self.window(reference)?;

        debug!(
            count,
            accounts = self.accounts.len(),
            devices = self.devices.len(),
            %reference,
            "Generating transactions"
        );

        let transactions: Vec<Transaction> = (0..count)
            .map(|_| self.sample_transaction(start, window))
            .collect();

        let elevated = transactions.iter().filter(|tx| tx.elevated).count();
        info!(count = transactions.len(), elevated, "Generated transactions");

        Ok(transactions)
    }

    /// Sample a single transaction.
    pub fn next_transaction(&mut self, reference: NaiveDateTime) -> Result<Transaction> {
        let (start, window) = self.window(reference)?;
        Ok(self.sample_transaction(start, window))
    }

    /// Start of the lookback window and its length in seconds.
    fn window(&self, reference: NaiveDateTime) -> Result<(NaiveDateTime, i64)> {
        let lookback = self.config.lookback_days;
        let window = lookback.checked_mul(SECONDS_PER_DAY);
        let start = window
            .and_then(Duration::try_seconds)
            .and_then(|span| reference.checked_sub_signed(span));
        match (start, window) {
            (Some(start), Some(window)) => Ok((start, window)),
            _ => Err(GeneratorError::InvalidConfig(format!(
                "lookback of {} days before {} is out of range",
                lookback, reference
            ))),
        }
    }

    fn sample_transaction(&mut self, start: NaiveDateTime, window: i64) -> Transaction {
        let sender_idx = self.rng.gen_range(0..self.accounts.len());
        let mut receiver_idx = self.rng.gen_range(0..self.accounts.len());
        while receiver_idx == sender_idx {
            receiver_idx = self.rng.gen_range(0..self.accounts.len());
        }

        let device_idx = self.rng.gen_range(0..self.devices.len());

        let country_idx = self.rng.gen_range(0..self.config.countries.len());
        let mut amount = self.sample_amount(false);

        // Amount and jurisdiction are replaced together
        let elevated = self.rng.gen_bool(self.config.elevated_probability);
        let country = if elevated {
            amount = self.sample_amount(true);
            let idx = self.rng.gen_range(0..self.elevated_countries.len());
            &self.elevated_countries[idx]
        } else {
            &self.config.countries.countries()[country_idx]
        };
        let (country, risk_score) = (country.name.clone(), country.risk_score);

        let timestamp = start + Duration::seconds(self.rng.gen_range(0..=window));
        let ip_address = self.sample_ip_address();

        Transaction {
            from_account: self.accounts[sender_idx].clone(),
            to_account: self.accounts[receiver_idx].clone(),
            amount,
            device_id: self.devices[device_idx].clone(),
            ip_address,
            country,
            risk_score,
            timestamp,
            elevated,
        }
    }

    fn sample_amount(&mut self, elevated: bool) -> f64 {
        let range = if elevated {
            self.config.elevated_amount
        } else {
            self.config.normal_amount
        };
        round_cents(self.rng.gen_range(range.min..=range.max))
    }

    fn sample_ip_address(&mut self) -> String {
        let (min, max) = (self.config.ip_octet_min, self.config.ip_octet_max);
        (0..4)
            .map(|_| self.rng.gen_range(min..=max).to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
