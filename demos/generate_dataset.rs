//! Dataset generation example
//!
//! Generates the default fraud analytics dataset, writes it to a temporary
//! directory, validates it and prints the dashboard metrics.

use transaction_datagen::{
    fingerprint_file, read_transactions, write_transactions, DatasetValidator, GeneratorConfig,
    NetworkSummary, TransactionGenerator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Synthetic Transaction Dataset ===\n");

    let config = GeneratorConfig {
        output_path: std::env::temp_dir()
            .join("transaction-datagen")
            .join("transactions.csv"),
        ..Default::default()
    };

    // 1. Generate and write
    let mut generator = TransactionGenerator::new(config.clone())?;
    let transactions = generator.generate()?;
    write_transactions(&config.output_path, &transactions)?;

    println!("1. Generated {} transactions", transactions.len());
    println!("   Path:   {}", config.output_path.display());
    println!("   SHA256: {}", fingerprint_file(&config.output_path)?);
    println!(
        "   Elevated transfers: {}",
        transactions.iter().filter(|tx| tx.elevated).count()
    );
    println!();

    println!("2. First rows");
    for tx in transactions.iter().take(5) {
        println!(
            "   {} -> {}  {:>9.2}  {}  {:<15} {:<14} {:<4} {}",
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
    println!();

    // 3. Read back and validate
    let read = read_transactions(&config.output_path)?;
    let report = DatasetValidator::new(&config)?.validate_with_count(&read);
    println!("3. Validation");
    println!("   Records checked: {}", report.records_checked);
    println!("   Valid: {}", report.is_valid());
    println!();

    // 4. Dashboard metrics
    let summary = NetworkSummary::from_transactions(&read);
    println!("4. Network Summary");
    println!("   Accounts: {}", summary.account_count);
    println!("   Transactions: {}", summary.transfer_count);
    println!("   Countries: {}", summary.country_count);
    for country in &summary.high_risk_countries {
        println!("   High-risk: {} ({})", country.name, country.risk_score);
    }
    for sender in summary.top_senders.iter().take(3) {
        println!("   Top sender: {} {:.2}", sender.account_id, sender.total_sent);
    }

    Ok(())
}
