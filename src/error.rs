//! Error types for the market and its storage collaborators.

use thiserror::Error;

use crate::types::{BidId, OfferId, OrderType};

/// Failure reported by a [`crate::storage::MarketStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bid {0} not found")]
    BidNotFound(BidId),

    #[error("offer {0} not found")]
    OfferNotFound(OfferId),

    /// An offer with nothing left to sell was handed to the book.
    #[error("offer amount must be positive, got {0}")]
    EmptyOffer(i64),

    /// A data operation was attempted outside a lock/unlock session.
    #[error("storage is not locked")]
    NotLocked,

    #[error("storage is already locked")]
    AlreadyLocked,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure surfaced to callers of [`crate::Market`].
#[derive(Debug, Error)]
pub enum MarketError {
    /// Lookup of an unknown bid id.
    #[error("bid {0} not found")]
    BidNotFound(BidId),

    /// A bid was submitted with an order type that has no matching strategy.
    #[error("no order processor registered for {0:?}")]
    NoProcessor(OrderType),

    #[error("invalid offer: {0}")]
    InvalidOffer(String),

    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for MarketError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BidNotFound(id) => MarketError::BidNotFound(id),
            empty @ StorageError::EmptyOffer(_) => MarketError::InvalidOffer(empty.to_string()),
            other => MarketError::Storage(other),
        }
    }
}
