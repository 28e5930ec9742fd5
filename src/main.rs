//! txgen - synthetic transaction dataset CLI
//!
//! # Commands
//!
//! - `txgen generate` - Generate the dataset and write it as CSV
//! - `txgen validate --input <file>` - Check a dataset against the record invariants
//! - `txgen summary --input <file>` - Print the dashboard metrics for a dataset

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transaction_datagen::{
    fingerprint_file, read_transactions, write_transactions, DatasetValidator, GeneratorConfig,
    NetworkSummary, TransactionGenerator, TIMESTAMP_FORMAT,
};

/// Rows echoed after generation
const PREVIEW_ROWS: usize = 10;

/// Synthetic transaction dataset generator
#[derive(Parser)]
#[command(name = "txgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate transactions and write them as CSV
    Generate {
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of transactions
        #[arg(short = 'n', long)]
        transactions: Option<usize>,

        /// Number of accounts
        #[arg(short, long)]
        accounts: Option<usize>,

        /// Number of devices
        #[arg(short, long)]
        devices: Option<usize>,
    },

    /// Validate a transaction file
    Validate {
        /// Transaction file
        #[arg(short, long)]
        input: PathBuf,

        /// End of the timestamp window (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        as_of: Option<String>,

        /// Require the configured number of records
        #[arg(long)]
        strict_count: bool,
    },

    /// Print network metrics for a transaction file
    Summary {
        /// Transaction file
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            output,
            seed,
            transactions,
            accounts,
            devices,
        } => {
            let mut config = config;
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(transactions) = transactions {
                config.num_transactions = transactions;
            }
            if let Some(accounts) = accounts {
                config.num_accounts = accounts;
            }
            if let Some(devices) = devices {
                config.num_devices = devices;
            }
            run_generate(config)
        }
        Commands::Validate {
            input,
            as_of,
            strict_count,
        } => run_validate(&config, &input, as_of.as_deref(), strict_count),
        Commands::Summary { input, json } => run_summary(&input, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn run_generate(config: GeneratorConfig) -> Result<()> {
    let output = config.output_path.clone();
    let mut generator = TransactionGenerator::new(config)?;
    let transactions = generator.generate()?;

    write_transactions(&output, &transactions)
        .with_context(|| format!("failed to write {}", output.display()))?;
    let digest = fingerprint_file(&output)?;

    info!(
        count = transactions.len(),
        path = %output.display(),
        sha256 = %digest,
        "Generated transactions"
    );
    for tx in transactions.iter().take(PREVIEW_ROWS) {
        info!(
            "{} -> {} {:.2} {} {} {} {} {}",
            tx.from_account,
            tx.to_account,
            tx.amount,
            tx.device_id,
            tx.ip_address,
            tx.country,
            tx.risk_score,
            tx.timestamp_string()
        );
    }

    Ok(())
}

fn run_validate(
    config: &GeneratorConfig,
    input: &Path,
    as_of: Option<&str>,
    strict_count: bool,
) -> Result<()> {
    let transactions = read_transactions(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let mut validator = DatasetValidator::new(config)?;
    if let Some(as_of) = as_of {
        let window_end = NaiveDateTime::parse_from_str(as_of, TIMESTAMP_FORMAT)
            .with_context(|| format!("invalid --as-of timestamp {}", as_of))?;
        validator = validator.with_window_end(window_end);
    }

    let report = if strict_count {
        validator.validate_with_count(&transactions)
    } else {
        validator.validate(&transactions)
    };

    info!(
        records = report.records_checked,
        elevated = report.elevated_records,
        "Validated {}",
        input.display()
    );

    if report.is_valid() {
        return Ok(());
    }

    for v in report.violations.iter().take(20) {
        match v.row {
            Some(row) => warn!(row, "{}", v.violation),
            None => warn!("{}", v.violation),
        }
    }
    bail!(
        "{} violations found in {}",
        report.violations.len(),
        input.display()
    )
}

fn run_summary(input: &Path, json: bool) -> Result<()> {
    let transactions = read_transactions(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let summary = NetworkSummary::from_transactions(&transactions);

    if json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    println!("Accounts:     {}", summary.account_count);
    println!("Transactions: {}", summary.transfer_count);
    println!("Countries:    {}", summary.country_count);

    println!("\nHigh-risk countries:");
    for country in &summary.high_risk_countries {
        println!("  {:<20} {}", country.name, country.risk_score);
    }

    println!("\nShared devices:");
    for device in &summary.shared_devices {
        println!("  {:<8} {} connections", device.device_id, device.connections);
    }

    println!("\nHigh-risk transfer paths:");
    for path in &summary.high_risk_paths {
        println!(
            "  {} -> {} ({}, {})",
            path.sender, path.receiver, path.country, path.risk_score
        );
    }

    println!("\nTop senders:");
    for sender in &summary.top_senders {
        println!("  {:<8} {:>12.2}", sender.account_id, sender.total_sent);
    }

    Ok(())
}
