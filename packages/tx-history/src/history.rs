use std::collections::BTreeMap;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::transaction::Transaction;

/// Shared log of transactions sent from this client
pub trait TransactionLog: Send + Sync {
    fn add_transactions(&self, chain_id: &str, address: &str, transactions: Vec<Transaction>);
}

/// Receives the most recent successful transaction, e.g. to show a success popup
pub trait TxNotifier: Send + Sync {
    fn set_tx_and_hash(&self, tx: Transaction, hash: String);
}

/// In-memory history keyed by (chain id, address), oldest first
#[derive(Debug, Default)]
pub struct TransactionHistory {
    entries: RwLock<BTreeMap<(String, String), Vec<Transaction>>>,
}

impl TransactionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self, chain_id: &str, address: &str) -> Vec<Transaction> {
        self.entries
            .read()
            .get(&(chain_id.to_string(), address.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Transactions on every chain for the address, oldest first
    pub fn all_transactions(&self, address: &str) -> Vec<Transaction> {
        let mut all: Vec<Transaction> = self
            .entries
            .read()
            .iter()
            .filter(|((_, a), _)| a == address)
            .flat_map(|(_, txs)| txs.iter().cloned())
            .collect();
        all.sort_by_key(|tx| tx.timestamp);
        all
    }

    pub fn len(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransactionLog for TransactionHistory {
    fn add_transactions(&self, chain_id: &str, address: &str, transactions: Vec<Transaction>) {
        self.entries
            .write()
            .entry((chain_id.to_string(), address.to_string()))
            .or_default()
            .extend(transactions);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LatestTxEntry {
    pub tx: Transaction,
    pub hash: String,
}

/// Holds the latest transaction and wakes anyone subscribed to it
#[derive(Debug)]
pub struct LatestTx {
    sender: watch::Sender<Option<LatestTxEntry>>,
}

impl Default for LatestTx {
    fn default() -> Self {
        let (sender, _) = watch::channel(None);
        LatestTx { sender }
    }
}

impl LatestTx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<LatestTxEntry> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LatestTxEntry>> {
        self.sender.subscribe()
    }

    /// Dismisses the current transaction
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }
}

impl TxNotifier for LatestTx {
    fn set_tx_and_hash(&self, tx: Transaction, hash: String) {
        self.sender.send_replace(Some(LatestTxEntry { tx, hash }));
    }
}
