//! In-process storage backend.

use super::MarketStorage;
use crate::error::StorageError;
use crate::offer_book::OfferBook;
use crate::types::{
    Bid, BidId, Offer, OfferId, Symbol, Transaction, TransactionId, DEFAULT_LAST_PRICE,
};
use std::collections::{BTreeMap, BTreeSet};

/// Serializable image of the whole market state. Used by file persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarketSnapshot {
    pub offers: Vec<Offer>,
    pub bids: Vec<Bid>,
    pub transactions: Vec<Transaction>,
    pub last_prices: BTreeMap<Symbol, i64>,
    pub last_bid_id: u64,
}

/// Market state held in memory. Sessions are tracked only to reject nested
/// locking; writes are visible immediately.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    book: OfferBook,
    bids: BTreeMap<BidId, Bid>,
    transactions: Vec<Transaction>,
    last_prices: BTreeMap<Symbol, i64>,
    last_bid_id: u64,
    locked: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore state from a snapshot. The bid counter resumes past every
    /// stored bid even if the snapshot's counter lags behind.
    pub fn from_snapshot(snapshot: MarketSnapshot) -> Self {
        let highest_bid = snapshot.bids.iter().map(|b| b.id.0).max().unwrap_or(0);
        Self {
            book: OfferBook::from_offers(snapshot.offers),
            bids: snapshot.bids.into_iter().map(|b| (b.id, b)).collect(),
            transactions: snapshot.transactions,
            last_prices: snapshot.last_prices,
            last_bid_id: snapshot.last_bid_id.max(highest_bid),
            locked: false,
        }
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            offers: self.book.snapshot(),
            bids: self.bids.values().cloned().collect(),
            transactions: self.transactions.clone(),
            last_prices: self.last_prices.clone(),
            last_bid_id: self.last_bid_id,
        }
    }
}

impl MarketStorage for MemoryStorage {
    fn lock(&mut self) -> Result<(), StorageError> {
        if self.locked {
            return Err(StorageError::AlreadyLocked);
        }
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), StorageError> {
        if !self.locked {
            return Err(StorageError::NotLocked);
        }
        self.locked = false;
        Ok(())
    }

    fn add_offer(&mut self, mut offer: Offer) -> Result<OfferId, StorageError> {
        if offer.amount < 1 {
            return Err(StorageError::EmptyOffer(offer.amount));
        }
        offer.id = OfferId::generate();
        let id = offer.id;
        self.book.insert(offer);
        Ok(id)
    }

    fn best_offer(&self, symbol: &Symbol) -> Result<Option<Offer>, StorageError> {
        Ok(self.book.best(symbol).cloned())
    }

    fn update_offer(&mut self, offer: &Offer) -> Result<(), StorageError> {
        self.book.update(offer)
    }

    fn add_bid(&mut self, mut bid: Bid) -> Result<BidId, StorageError> {
        self.last_bid_id += 1;
        bid.id = BidId(self.last_bid_id);
        let id = bid.id;
        self.bids.insert(id, bid);
        Ok(id)
    }

    fn update_bid(&mut self, bid: &Bid) -> Result<(), StorageError> {
        match self.bids.get_mut(&bid.id) {
            Some(stored) => {
                *stored = bid.clone();
                Ok(())
            }
            None => Err(StorageError::BidNotFound(bid.id)),
        }
    }

    fn get_bid(&self, id: BidId) -> Result<Bid, StorageError> {
        self.bids
            .get(&id)
            .cloned()
            .ok_or(StorageError::BidNotFound(id))
    }

    fn new_transaction(&mut self, mut transaction: Transaction) -> Result<TransactionId, StorageError> {
        transaction.id = TransactionId::generate();
        let id = transaction.id;
        self.transactions.push(transaction);
        Ok(id)
    }

    fn last_price(&self, symbol: &Symbol) -> Result<i64, StorageError> {
        Ok(self
            .last_prices
            .get(symbol)
            .copied()
            .unwrap_or(DEFAULT_LAST_PRICE))
    }

    fn set_last_price(&mut self, symbol: &Symbol, price: i64) -> Result<(), StorageError> {
        self.last_prices.insert(symbol.clone(), price);
        Ok(())
    }

    fn all_symbols(&self) -> Result<BTreeSet<Symbol>, StorageError> {
        Ok(self
            .book
            .symbols()
            .chain(self.last_prices.keys())
            .cloned()
            .collect())
    }

    fn offers(&self, symbol: &Symbol) -> Result<Vec<Offer>, StorageError> {
        Ok(self.book.offers_for(symbol))
    }

    fn transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.transactions.clone())
    }

    fn transactions_for_bid(&self, id: BidId) -> Result<Vec<Transaction>, StorageError> {
        Ok(self
            .transactions
            .iter()
            .filter(|tx| tx.bid_id == id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, BidStatus};

    #[test]
    fn bid_ids_start_at_one_and_increase() {
        let mut storage = MemoryStorage::new();
        let a = storage.add_bid(Bid::new(AccountId(1), "ACME", 0, 1)).unwrap();
        let b = storage.add_bid(Bid::new(AccountId(1), "ACME", 0, 1)).unwrap();
        assert_eq!(a, BidId(1));
        assert_eq!(b, BidId(2));
    }

    #[test]
    fn get_bid_returns_requested_bid() {
        let mut storage = MemoryStorage::new();
        let first = storage.add_bid(Bid::new(AccountId(1), "ACME", 0, 3)).unwrap();
        storage.add_bid(Bid::new(AccountId(2), "ACME", 0, 9)).unwrap();
        let bid = storage.get_bid(first).unwrap();
        assert_eq!(bid.id, first);
        assert_eq!(bid.amount, 3);
    }

    #[test]
    fn get_unknown_bid_returns_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.get_bid(BidId(42)),
            Err(StorageError::BidNotFound(BidId(42)))
        ));
    }

    #[test]
    fn update_bid_overwrites_state() {
        let mut storage = MemoryStorage::new();
        let id = storage.add_bid(Bid::new(AccountId(1), "ACME", 0, 3)).unwrap();
        let mut bid = storage.get_bid(id).unwrap();
        bid.amount = 0;
        bid.status = BidStatus::Filled;
        storage.update_bid(&bid).unwrap();
        assert_eq!(storage.get_bid(id).unwrap(), bid);
    }

    #[test]
    fn last_price_defaults_to_one() {
        let mut storage = MemoryStorage::new();
        let sym = Symbol::from("ACME");
        assert_eq!(storage.last_price(&sym).unwrap(), DEFAULT_LAST_PRICE);
        storage.set_last_price(&sym, 42).unwrap();
        assert_eq!(storage.last_price(&sym).unwrap(), 42);
    }

    #[test]
    fn all_symbols_covers_book_and_prices() {
        let mut storage = MemoryStorage::new();
        storage.add_offer(Offer::new(AccountId(1), "ACME", 5, 1)).unwrap();
        storage.set_last_price(&"GLOBEX".into(), 3).unwrap();
        let symbols: Vec<_> = storage.all_symbols().unwrap().into_iter().collect();
        assert_eq!(symbols, vec![Symbol::from("ACME"), Symbol::from("GLOBEX")]);
    }

    #[test]
    fn add_offer_assigns_fresh_ids() {
        let mut storage = MemoryStorage::new();
        let a = storage.add_offer(Offer::new(AccountId(1), "ACME", 5, 1)).unwrap();
        let b = storage.add_offer(Offer::new(AccountId(1), "ACME", 5, 1)).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, OfferId::UNASSIGNED);
    }

    #[test]
    fn add_offer_rejects_empty_offers() {
        let mut storage = MemoryStorage::new();
        for amount in [0, -3] {
            let result = storage.add_offer(Offer::new(AccountId(1), "ACME", 5, amount));
            assert!(matches!(result, Err(StorageError::EmptyOffer(a)) if a == amount));
        }
        assert!(storage.best_offer(&"ACME".into()).unwrap().is_none());
        assert!(storage.all_symbols().unwrap().is_empty());
    }

    #[test]
    fn nested_lock_is_rejected() {
        let mut storage = MemoryStorage::new();
        storage.lock().unwrap();
        assert!(matches!(storage.lock(), Err(StorageError::AlreadyLocked)));
        storage.unlock().unwrap();
        assert!(matches!(storage.unlock(), Err(StorageError::NotLocked)));
    }

    #[test]
    fn snapshot_restores_state_and_bid_counter() {
        let mut storage = MemoryStorage::new();
        storage.add_offer(Offer::new(AccountId(1), "ACME", 5, 4)).unwrap();
        storage.add_bid(Bid::new(AccountId(2), "ACME", 0, 1)).unwrap();
        storage.set_last_price(&"ACME".into(), 5).unwrap();

        let mut snapshot = storage.snapshot();
        snapshot.last_bid_id = 0;
        let mut restored = MemoryStorage::from_snapshot(snapshot);
        assert_eq!(restored.offers(&"ACME".into()).unwrap().len(), 1);
        assert_eq!(restored.last_price(&"ACME".into()).unwrap(), 5);
        let next = restored.add_bid(Bid::new(AccountId(2), "ACME", 0, 1)).unwrap();
        assert_eq!(next, BidId(2));
    }
}
