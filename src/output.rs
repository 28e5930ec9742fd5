//! CSV persistence for generated datasets

use crate::{Result, Transaction};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

/// Column order of the transaction file
pub const CSV_HEADER: [&str; 8] = [
    "from_account",
    "to_account",
    "amount",
    "device_id",
    "ip_address",
    "country",
    "risk_score",
    "timestamp",
];

/// Write transactions to `path`, creating parent directories and replacing any existing file.
///
/// The header row is always written, including for an empty dataset.
pub fn write_transactions(path: impl AsRef<Path>, transactions: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(file));

    // Serde only emits headers alongside the first record
    writer.write_record(CSV_HEADER)?;
    for tx in transactions {
        writer.serialize(tx)?;
    }
    writer.flush()?;

    info!(
        count = transactions.len(),
        path = %path.display(),
        "Wrote transactions"
    );
    Ok(())
}

/// Read a transaction file written by [`write_transactions`]
pub fn read_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let transactions = reader
        .deserialize()
        .collect::<std::result::Result<Vec<Transaction>, csv::Error>>()?;

    debug!(count = transactions.len(), path = %path.display(), "Read transactions");
    Ok(transactions)
}

/// SHA-256 digest of a file as lowercase hex
pub fn fingerprint_file(path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;

    Ok(format!("{:x}", hasher.finalize()))
}
