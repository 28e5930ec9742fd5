//! Transfer network summary for generated datasets
//!
//! Builds an in-memory account/device/country graph from a dataset and computes
//! the fixed metrics shown on the fraud analytics dashboard.

use crate::country_catalog::{Country, DASHBOARD_RISK_THRESHOLD};
use crate::{Result, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

const TOP_SHARED_DEVICES: usize = 10;
const TOP_SENDERS: usize = 10;
const MAX_HIGH_RISK_PATHS: usize = 20;

/// Device used by several sending accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedDevice {
    pub device_id: String,
    pub account_count: usize,
    /// Ordered pairs of distinct accounts sharing the device
    pub connections: usize,
}

/// Transfer into a high-risk jurisdiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPath {
    pub sender: String,
    pub receiver: String,
    pub country: String,
    pub risk_score: f64,
}

/// Total amount sent by one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderTotal {
    pub account_id: String,
    pub total_sent: f64,
    pub transfer_count: usize,
}

/// Account node in the graph
#[derive(Debug, Clone, Default)]
struct AccountNode {
    total_sent: f64,
    total_received: f64,
    sent_count: usize,
    outgoing_accounts: HashSet<String>,
    incoming_accounts: HashSet<String>,
}

/// Transfer graph built from a dataset
#[derive(Debug, Clone, Default)]
pub struct TransferGraph {
    nodes: HashMap<String, AccountNode>,
    device_users: HashMap<String, HashSet<String>>,
    countries: BTreeMap<String, f64>,
    transfer_count: usize,
    risky_transfers: Vec<TransferPath>,
}

impl TransferGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a dataset
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut graph = Self::new();
        for tx in transactions {
            graph.add_transaction(tx);
        }
        graph
    }

    /// Add a transfer edge and its device and country links
    pub fn add_transaction(&mut self, tx: &Transaction) {
        let sender = self.nodes.entry(tx.from_account.clone()).or_default();
        sender.total_sent += tx.amount;
        sender.sent_count += 1;
        sender.outgoing_accounts.insert(tx.to_account.clone());

        let receiver = self.nodes.entry(tx.to_account.clone()).or_default();
        receiver.total_received += tx.amount;
        receiver.incoming_accounts.insert(tx.from_account.clone());

        self.device_users
            .entry(tx.device_id.clone())
            .or_default()
            .insert(tx.from_account.clone());

        self.countries.insert(tx.country.clone(), tx.risk_score);
        self.transfer_count += 1;

        if tx.is_high_risk() {
            self.risky_transfers.push(TransferPath {
                sender: tx.from_account.clone(),
                receiver: tx.to_account.clone(),
                country: tx.country.clone(),
                risk_score: tx.risk_score,
            });
        }
    }

    pub fn account_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfer_count
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Countries in the dataset above the risk threshold, highest risk first
    pub fn high_risk_countries(&self, threshold: f64) -> Vec<Country> {
        let mut risky: Vec<Country> = self
            .countries
            .iter()
            .filter(|(_, &risk)| risk > threshold)
            .map(|(name, &risk)| Country::new(name.clone(), risk))
            .collect();
        risky.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        risky
    }

    /// Devices used by two or more distinct sending accounts, most connected first
    pub fn shared_devices(&self, limit: usize) -> Vec<SharedDevice> {
        let mut shared: Vec<SharedDevice> = self
            .device_users
            .iter()
            .filter(|(_, users)| users.len() >= 2)
            .map(|(device_id, users)| SharedDevice {
                device_id: device_id.clone(),
                account_count: users.len(),
                connections: users.len() * (users.len() - 1),
            })
            .collect();
        shared.sort_by(|a, b| {
            b.connections
                .cmp(&a.connections)
                .then_with(|| a.device_id.cmp(&b.device_id))
        });
        shared.truncate(limit);
        shared
    }

    /// First transfers into high-risk countries, in dataset order
    pub fn high_risk_paths(&self, limit: usize) -> Vec<TransferPath> {
        self.risky_transfers.iter().take(limit).cloned().collect()
    }

    /// Accounts ranked by total amount sent
    pub fn top_senders(&self, limit: usize) -> Vec<SenderTotal> {
        let mut senders: Vec<SenderTotal> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.sent_count > 0)
            .map(|(account_id, node)| SenderTotal {
                account_id: account_id.clone(),
                total_sent: node.total_sent,
                transfer_count: node.sent_count,
            })
            .collect();
        senders.sort_by(|a, b| {
            b.total_sent
                .partial_cmp(&a.total_sent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });
        senders.truncate(limit);
        senders
    }

    /// Total amount received by an account
    pub fn total_received(&self, account_id: &str) -> Option<f64> {
        self.nodes.get(account_id).map(|n| n.total_received)
    }

    /// Number of distinct counterparties an account sent to and received from
    pub fn counterparties(&self, account_id: &str) -> Option<(usize, usize)> {
        self.nodes
            .get(account_id)
            .map(|n| (n.outgoing_accounts.len(), n.incoming_accounts.len()))
    }

    /// Compute the dashboard summary
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            account_count: self.account_count(),
            transfer_count: self.transfer_count(),
            country_count: self.country_count(),
            high_risk_countries: self.high_risk_countries(DASHBOARD_RISK_THRESHOLD),
            shared_devices: self.shared_devices(TOP_SHARED_DEVICES),
            high_risk_paths: self.high_risk_paths(MAX_HIGH_RISK_PATHS),
            top_senders: self.top_senders(TOP_SENDERS),
        }
    }
}

/// Dashboard metrics for a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub account_count: usize,
    pub transfer_count: usize,
    pub country_count: usize,
    pub high_risk_countries: Vec<Country>,
    pub shared_devices: Vec<SharedDevice>,
    pub high_risk_paths: Vec<TransferPath>,
    pub top_senders: Vec<SenderTotal>,
}

impl NetworkSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        TransferGraph::from_transactions(transactions).summary()
    }

    /// Export as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
