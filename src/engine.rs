//! Market facade.
//!
//! [`Market`] owns the storage and the strategy table. Every public operation
//! runs inside one critical section: the storage mutex is taken, the backend
//! session is opened, the work (including a complete matching run) is done,
//! and the session is committed, or rolled back if the work failed, before
//! the mutex is released.

use crate::error::MarketError;
use crate::execution::BidSummary;
use crate::matching::ProcessorTable;
use crate::storage::MarketStorage;
use crate::types::{Bid, BidId, Offer, OfferId, OrderType, Symbol, Transaction};
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Storage handle the market owns.
pub type BoxedStorage = Box<dyn MarketStorage + Send>;

/// Offer/bid matching engine.
///
/// `Market` is `Send + Sync`; share it behind an `Arc` and call it from any
/// thread. Operations are serialized end to end. If a strategy panics while
/// holding the lock, the next operation rolls back the interrupted storage
/// session and carries on; writes a non-transactional backend already applied
/// are kept.
pub struct Market {
    storage: Mutex<BoxedStorage>,
    processors: ProcessorTable,
}

impl Market {
    /// Market over the given storage with the built-in strategies.
    pub fn new(storage: BoxedStorage) -> Self {
        Self::with_processors(storage, ProcessorTable::standard())
    }

    pub fn with_processors(storage: BoxedStorage, processors: ProcessorTable) -> Self {
        Self {
            storage: Mutex::new(storage),
            processors,
        }
    }

    /// Adds a resting offer to the book. Does not trigger matching.
    pub fn offer(&self, offer: Offer) -> Result<OfferId, MarketError> {
        if offer.amount < 1 {
            warn!(
                "offer rejected symbol={} amount={}: amount must be positive",
                offer.symbol, offer.amount
            );
            return Err(MarketError::InvalidOffer(format!(
                "amount must be positive, got {}",
                offer.amount
            )));
        }
        if offer.price < 0 {
            warn!(
                "offer rejected symbol={} price={}: price must not be negative",
                offer.symbol, offer.price
            );
            return Err(MarketError::InvalidOffer(format!(
                "price must not be negative, got {}",
                offer.price
            )));
        }
        self.locked(|storage, _| {
            let symbol = offer.symbol.clone();
            let (price, amount) = (offer.price, offer.amount);
            let id = storage.add_offer(offer)?;
            info!(
                "offer accepted offer_id={} symbol={} price={} amount={}",
                id, symbol, price, amount
            );
            Ok(id)
        })
    }

    /// Records the bid and matches it to completion with the strategy
    /// registered for its type. Returns the assigned id.
    ///
    /// A bid type with no strategy fails with [`MarketError::NoProcessor`]
    /// before anything is stored.
    pub fn bid(&self, bid: Bid) -> Result<BidId, MarketError> {
        self.locked(|storage, processors| {
            let processor = processors.get(bid.bid_type)?;
            let mut bid = bid;
            bid.id = storage.add_bid(bid.clone())?;
            info!(
                "bid submitted bid_id={} type={:?} symbol={} amount={}",
                bid.id, bid.bid_type, bid.symbol, bid.amount
            );
            let id = bid.id;
            let done = processor.try_fill_bid(storage, processors, bid)?;
            info!(
                "bid processed bid_id={} status={:?} remaining={}",
                done.id, done.status, done.amount
            );
            Ok(id)
        })
    }

    /// Current state of a bid.
    pub fn get_bid(&self, id: BidId) -> Result<Bid, MarketError> {
        self.locked(|storage, _| Ok(storage.get_bid(id)?))
    }

    /// Most recent execution price for the symbol.
    pub fn last_price(&self, symbol: &Symbol) -> Result<i64, MarketError> {
        self.locked(|storage, _| Ok(storage.last_price(symbol)?))
    }

    /// Reference price for the offer, as the strategy for `order_type` sees it.
    pub fn asking_price(&self, order_type: OrderType, offer: &Offer) -> Result<i64, MarketError> {
        self.locked(|storage, processors| processors.get(order_type)?.asking_price(storage, offer))
    }

    pub fn best_offer(&self, symbol: &Symbol) -> Result<Option<Offer>, MarketError> {
        self.locked(|storage, _| Ok(storage.best_offer(symbol)?))
    }

    /// Resting offers for the symbol, best first.
    pub fn offers(&self, symbol: &Symbol) -> Result<Vec<Offer>, MarketError> {
        self.locked(|storage, _| Ok(storage.offers(symbol)?))
    }

    /// Every symbol with resting offers or a trade.
    pub fn symbols(&self) -> Result<BTreeSet<Symbol>, MarketError> {
        self.locked(|storage, _| Ok(storage.all_symbols()?))
    }

    pub fn transactions_for_bid(&self, id: BidId) -> Result<Vec<Transaction>, MarketError> {
        self.locked(|storage, _| {
            storage.get_bid(id)?;
            Ok(storage.transactions_for_bid(id)?)
        })
    }

    /// The bid together with what it executed.
    pub fn bid_summary(&self, id: BidId) -> Result<BidSummary, MarketError> {
        self.locked(|storage, _| {
            let bid = storage.get_bid(id)?;
            let transactions = storage.transactions_for_bid(id)?;
            Ok(BidSummary::new(bid, &transactions))
        })
    }

    fn locked<T>(
        &self,
        op: impl FnOnce(&mut dyn MarketStorage, &ProcessorTable) -> Result<T, MarketError>,
    ) -> Result<T, MarketError> {
        let mut guard = match self.storage.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("market lock poisoned by a panicked operation; rolling back its session");
                let mut guard = poisoned.into_inner();
                if let Err(err) = guard.rollback() {
                    warn!("rollback of interrupted session failed: {}", err);
                }
                self.storage.clear_poison();
                guard
            }
        };
        let storage: &mut dyn MarketStorage = &mut **guard;
        storage.lock()?;
        match op(&mut *storage, &self.processors) {
            Ok(value) => {
                storage.unlock()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(release) = storage.rollback() {
                    warn!("storage rollback failed: {}", release);
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Market")
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}
