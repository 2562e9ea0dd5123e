//! Matching strategies.
//!
//! An [`OrderProcessor`] resolves one bid against the resting book while the
//! caller holds the storage lock. Strategies are registered per bid
//! [`OrderType`] in a [`ProcessorTable`]; the table is handed to every strategy
//! so one order type can delegate to another.

use crate::error::{MarketError, StorageError};
use crate::storage::MarketStorage;
use crate::types::{Bid, BidStatus, Offer, OrderType, Transaction};
use log::{info, warn};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Matching behaviour for one bid order type.
pub trait OrderProcessor: Send + Sync {
    /// Match the bid until it is exhausted or the book runs dry, persisting
    /// every offer, transaction and price change along the way. The bid is
    /// persisted once, on exit, and its final state returned.
    fn try_fill_bid(
        &self,
        storage: &mut dyn MarketStorage,
        processors: &ProcessorTable,
        bid: Bid,
    ) -> Result<Bid, MarketError>;

    /// Reference price for the offer's symbol. Read-only.
    fn asking_price(&self, storage: &dyn MarketStorage, offer: &Offer) -> Result<i64, MarketError>;
}

/// Strategies keyed by bid order type.
#[derive(Default)]
pub struct ProcessorTable {
    processors: HashMap<OrderType, Box<dyn OrderProcessor>>,
}

impl ProcessorTable {
    /// Empty table. Bids of every type fail dispatch until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in strategies.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(OrderType::MarketBid, MarketOrderProcessor::new());
        table
    }

    /// Register (or replace) the strategy for an order type.
    pub fn register(&mut self, order_type: OrderType, processor: impl OrderProcessor + 'static) {
        self.processors.insert(order_type, Box::new(processor));
    }

    /// Strategy for the order type, or [`MarketError::NoProcessor`].
    pub fn get(&self, order_type: OrderType) -> Result<&dyn OrderProcessor, MarketError> {
        self.processors
            .get(&order_type)
            .map(|p| p.as_ref())
            .ok_or(MarketError::NoProcessor(order_type))
    }

    pub fn contains(&self, order_type: OrderType) -> bool {
        self.processors.contains_key(&order_type)
    }
}

impl std::fmt::Debug for ProcessorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.processors.keys()).finish()
    }
}

/// Wall-clock Unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Market-style bid: take the cheapest offers at their own prices until the
/// bid is filled. Whatever the book cannot cover is left on the bid and
/// abandoned; there is no resting bid book.
#[derive(Clone, Copy, Debug)]
pub struct MarketOrderProcessor {
    now: fn() -> u64,
}

impl MarketOrderProcessor {
    pub fn new() -> Self {
        Self { now: now_millis }
    }

    /// Processor stamping transactions with the given clock.
    pub fn with_clock(now: fn() -> u64) -> Self {
        Self { now }
    }
}

impl Default for MarketOrderProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderProcessor for MarketOrderProcessor {
    fn try_fill_bid(
        &self,
        storage: &mut dyn MarketStorage,
        _processors: &ProcessorTable,
        mut bid: Bid,
    ) -> Result<Bid, MarketError> {
        loop {
            if bid.amount < 1 {
                bid.amount = bid.amount.max(0);
                bid.status = BidStatus::Filled;
                storage.update_bid(&bid)?;
                info!("bid filled bid_id={} symbol={}", bid.id, bid.symbol);
                return Ok(bid);
            }
            let Some(mut offer) = storage.best_offer(&bid.symbol)? else {
                storage.update_bid(&bid)?;
                warn!(
                    "no liquidity, remainder abandoned bid_id={} symbol={} remaining={}",
                    bid.id, bid.symbol, bid.amount
                );
                return Ok(bid);
            };
            if offer.amount < 1 {
                return Err(StorageError::EmptyOffer(offer.amount).into());
            }

            let amount = bid.amount.min(offer.amount);
            let tx_id = storage.new_transaction(Transaction::new(
                bid.id,
                offer.id,
                offer.price,
                amount,
                (self.now)(),
            ))?;
            info!(
                "transaction tx_id={} bid_id={} offer_id={} symbol={} price={} amount={}",
                tx_id, bid.id, offer.id, offer.symbol, offer.price, amount
            );
            bid.amount -= amount;
            offer.amount -= amount;
            storage.update_offer(&offer)?;
            storage.set_last_price(&offer.symbol, offer.price)?;
        }
    }

    fn asking_price(&self, storage: &dyn MarketStorage, offer: &Offer) -> Result<i64, MarketError> {
        Ok(storage.last_price(&offer.symbol)?)
    }
}
