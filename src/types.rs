//! Core types and IDs for the market (offers, bids, transactions).
//!
//! All identifiers are newtype wrappers. Prices and amounts are integers in the
//! smallest currency/quantity unit so matching never accumulates rounding drift.

use std::fmt;
use uuid::Uuid;

/// Price a symbol reports before its first trade.
pub const DEFAULT_LAST_PRICE: i64 = 1;

/// Tradable instrument identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Offer identifier, assigned by storage on insertion.
///
/// UUID v7 values sort by creation time, so ordering by id is insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct OfferId(pub Uuid);

impl OfferId {
    /// Placeholder carried by offers that have not been stored yet.
    pub const UNASSIGNED: OfferId = OfferId(Uuid::nil());

    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Bid identifier. Storage hands these out from 1 upward, never reusing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct BidId(pub u64);

impl BidId {
    pub const UNASSIGNED: BidId = BidId(0);
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Transaction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub const UNASSIGNED: TransactionId = TransactionId(Uuid::nil());

    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Account the order belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(pub u64);

/// Order type. Bids are dispatched to the matching strategy registered for
/// their type; offers carry their kind for the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    /// Fill immediately against the best offers, at the offers' prices.
    MarketBid,
    /// Rest in the book at a fixed price until consumed.
    LimitOffer,
}

/// Bid lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BidStatus {
    Open,
    Filled,
}

/// Standing sell order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub offer_type: OrderType,
    pub account: AccountId,
    pub symbol: Symbol,
    pub price: i64,
    /// Remaining amount. The offer leaves the book when this reaches zero.
    pub amount: i64,
}

impl Offer {
    /// Unstored limit offer; storage assigns the id.
    pub fn new(account: AccountId, symbol: impl Into<Symbol>, price: i64, amount: i64) -> Self {
        Self {
            id: OfferId::UNASSIGNED,
            offer_type: OrderType::LimitOffer,
            account,
            symbol: symbol.into(),
            price,
            amount,
        }
    }
}

/// Incoming buy order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub bid_type: OrderType,
    pub account: AccountId,
    pub symbol: Symbol,
    /// Advisory only: market bids fill at the resting offer's price.
    pub price: i64,
    /// Remaining amount.
    pub amount: i64,
    pub status: BidStatus,
}

impl Bid {
    /// Unstored open market bid; storage assigns the id.
    pub fn new(account: AccountId, symbol: impl Into<Symbol>, price: i64, amount: i64) -> Self {
        Self {
            id: BidId::UNASSIGNED,
            bid_type: OrderType::MarketBid,
            account,
            symbol: symbol.into(),
            price,
            amount,
            status: BidStatus::Open,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.status, BidStatus::Filled)
    }
}

/// Settlement of one bid against one offer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub bid_id: BidId,
    pub offer_id: OfferId,
    /// Execution price: always the offer's price.
    pub price: i64,
    pub amount: i64,
    /// Unix milliseconds at match time.
    pub timestamp: u64,
}

impl Transaction {
    pub fn new(bid_id: BidId, offer_id: OfferId, price: i64, amount: i64, timestamp: u64) -> Self {
        Self {
            id: TransactionId::UNASSIGNED,
            bid_id,
            offer_id,
            price,
            amount,
            timestamp,
        }
    }
}
