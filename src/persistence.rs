//! File persistence: the whole market state lives in one JSON file.
//!
//! [`FileStorage::lock`] loads the file, [`FileStorage::unlock`] writes it back
//! and drops the in-memory copy, so every session starts from what the
//! previous session committed, including sessions run by other instances
//! pointed at the same path. Writes go to a temporary sibling that is renamed
//! over the target.

use crate::error::StorageError;
use crate::storage::{MarketSnapshot, MarketStorage, MemoryStorage};
use crate::types::{Bid, BidId, Offer, OfferId, Symbol, Transaction, TransactionId};
use log::debug;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// JSON-file backed storage. Data operations fail with
/// [`StorageError::NotLocked`] outside a session.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    session: Option<MemoryStorage>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            session: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot from disk. A missing file is an empty market.
    pub fn load(&self) -> Result<MarketSnapshot, StorageError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MarketSnapshot::default())
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the snapshot, replacing the file atomically.
    pub fn save(&self, snapshot: &MarketSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn state(&self) -> Result<&MemoryStorage, StorageError> {
        self.session.as_ref().ok_or(StorageError::NotLocked)
    }

    fn state_mut(&mut self) -> Result<&mut MemoryStorage, StorageError> {
        self.session.as_mut().ok_or(StorageError::NotLocked)
    }
}

impl MarketStorage for FileStorage {
    fn lock(&mut self) -> Result<(), StorageError> {
        if self.session.is_some() {
            return Err(StorageError::AlreadyLocked);
        }
        let snapshot = self.load()?;
        debug!(
            "state loaded path={} offers={} bids={} transactions={}",
            self.path.display(),
            snapshot.offers.len(),
            snapshot.bids.len(),
            snapshot.transactions.len()
        );
        self.session = Some(MemoryStorage::from_snapshot(snapshot));
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), StorageError> {
        let state = self.session.take().ok_or(StorageError::NotLocked)?;
        let snapshot = state.snapshot();
        self.save(&snapshot)?;
        debug!(
            "state saved path={} offers={} bids={} transactions={}",
            self.path.display(),
            snapshot.offers.len(),
            snapshot.bids.len(),
            snapshot.transactions.len()
        );
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        self.session.take().ok_or(StorageError::NotLocked)?;
        debug!("session discarded path={}", self.path.display());
        Ok(())
    }

    fn add_offer(&mut self, offer: Offer) -> Result<OfferId, StorageError> {
        self.state_mut()?.add_offer(offer)
    }

    fn best_offer(&self, symbol: &Symbol) -> Result<Option<Offer>, StorageError> {
        self.state()?.best_offer(symbol)
    }

    fn update_offer(&mut self, offer: &Offer) -> Result<(), StorageError> {
        self.state_mut()?.update_offer(offer)
    }

    fn add_bid(&mut self, bid: Bid) -> Result<BidId, StorageError> {
        self.state_mut()?.add_bid(bid)
    }

    fn update_bid(&mut self, bid: &Bid) -> Result<(), StorageError> {
        self.state_mut()?.update_bid(bid)
    }

    fn get_bid(&self, id: BidId) -> Result<Bid, StorageError> {
        self.state()?.get_bid(id)
    }

    fn new_transaction(&mut self, transaction: Transaction) -> Result<TransactionId, StorageError> {
        self.state_mut()?.new_transaction(transaction)
    }

    fn last_price(&self, symbol: &Symbol) -> Result<i64, StorageError> {
        self.state()?.last_price(symbol)
    }

    fn set_last_price(&mut self, symbol: &Symbol, price: i64) -> Result<(), StorageError> {
        self.state_mut()?.set_last_price(symbol, price)
    }

    fn all_symbols(&self) -> Result<BTreeSet<Symbol>, StorageError> {
        self.state()?.all_symbols()
    }

    fn offers(&self, symbol: &Symbol) -> Result<Vec<Offer>, StorageError> {
        self.state()?.offers(symbol)
    }

    fn transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        self.state()?.transactions()
    }

    fn transactions_for_bid(&self, id: BidId) -> Result<Vec<Transaction>, StorageError> {
        self.state()?.transactions_for_bid(id)
    }
}
