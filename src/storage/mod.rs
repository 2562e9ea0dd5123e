//! Storage contract the market depends on.
//!
//! A backend holds the offer book, bid ledger, transaction ledger and
//! last-price table. The engine brackets every public operation with
//! [`MarketStorage::lock`] and [`MarketStorage::unlock`] and never nests them;
//! everything written in between becomes visible to the next session on
//! `unlock`.
//!
//! Two backends ship with the crate: [`MemoryStorage`] and
//! [`crate::persistence::FileStorage`].

mod memory;

pub use memory::{MarketSnapshot, MemoryStorage};

use crate::error::StorageError;
use crate::types::{Bid, BidId, Offer, OfferId, Symbol, Transaction, TransactionId};
use std::collections::BTreeSet;

pub trait MarketStorage {
    /// Start an exclusive session. State read afterwards reflects every
    /// earlier committed session.
    fn lock(&mut self) -> Result<(), StorageError>;

    /// Commit the session's writes and end it.
    fn unlock(&mut self) -> Result<(), StorageError>;

    /// End the session after a failed operation. Backends that can discard
    /// uncommitted writes do so; the default commits like [`Self::unlock`].
    fn rollback(&mut self) -> Result<(), StorageError> {
        self.unlock()
    }

    /// Insert an offer under a freshly assigned id. An offer with amount < 1
    /// fails with [`StorageError::EmptyOffer`].
    fn add_offer(&mut self, offer: Offer) -> Result<OfferId, StorageError>;

    /// Lowest-priced resting offer for the symbol. Never returns an offer
    /// with amount <= 0.
    fn best_offer(&self, symbol: &Symbol) -> Result<Option<Offer>, StorageError>;

    /// Persist a mutated offer; amount <= 0 removes it from the book.
    fn update_offer(&mut self, offer: &Offer) -> Result<(), StorageError>;

    /// Record a new bid under the next bid id.
    fn add_bid(&mut self, bid: Bid) -> Result<BidId, StorageError>;

    fn update_bid(&mut self, bid: &Bid) -> Result<(), StorageError>;

    /// Current state of the bid. Unknown ids are [`StorageError::BidNotFound`].
    fn get_bid(&self, id: BidId) -> Result<Bid, StorageError>;

    /// Append a settlement under a freshly assigned id.
    fn new_transaction(&mut self, transaction: Transaction) -> Result<TransactionId, StorageError>;

    /// Most recent execution price, or [`crate::types::DEFAULT_LAST_PRICE`].
    fn last_price(&self, symbol: &Symbol) -> Result<i64, StorageError>;

    fn set_last_price(&mut self, symbol: &Symbol, price: i64) -> Result<(), StorageError>;

    /// Every symbol with resting offers or a recorded price.
    fn all_symbols(&self) -> Result<BTreeSet<Symbol>, StorageError>;

    /// Resting offers for the symbol, best first.
    fn offers(&self, symbol: &Symbol) -> Result<Vec<Offer>, StorageError>;

    /// The transaction ledger in append order.
    fn transactions(&self) -> Result<Vec<Transaction>, StorageError>;

    /// Settlements against one bid, in append order.
    fn transactions_for_bid(&self, id: BidId) -> Result<Vec<Transaction>, StorageError> {
        Ok(self
            .transactions()?
            .into_iter()
            .filter(|tx| tx.bid_id == id)
            .collect())
    }
}
