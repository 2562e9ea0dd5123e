//! # Market Engine
//!
//! Offer/bid matching engine: sellers rest priced offers in a per-symbol book,
//! buyers submit bids that are filled immediately against the cheapest offers,
//! and every fill is recorded as a transaction.
//!
//! ## Entry point
//!
//! Use [`Market`] as the single entry point: create it over a storage backend
//! with [`Market::new`], then call [`Market::offer`], [`Market::bid`] and
//! [`Market::get_bid`]. Storage backends implement [`MarketStorage`];
//! [`MemoryStorage`] and [`FileStorage`] ship with the crate.
//!
//! ## Example
//!
//! ```rust
//! use market_engine::{AccountId, Bid, Market, MemoryStorage, Offer};
//!
//! let market = Market::new(Box::new(MemoryStorage::new()));
//! market.offer(Offer::new(AccountId(1), "ACME", 7, 10)).unwrap();
//! let id = market.bid(Bid::new(AccountId(2), "ACME", 0, 4)).unwrap();
//! let bid = market.get_bid(id).unwrap();
//! assert!(bid.is_filled());
//! assert_eq!(market.last_price(&"ACME".into()).unwrap(), 7);
//! ```
//!
//! ## Lower-level API
//!
//! Matching strategies implement [`OrderProcessor`] and can be registered per
//! bid [`OrderType`] in a [`ProcessorTable`] passed to [`Market::with_processors`].

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod market_data_gen;
pub mod matching;
pub mod offer_book;
pub mod persistence;
pub mod storage;
pub mod types;

pub use config::MarketConfig;
pub use engine::{BoxedStorage, Market};
pub use error::{MarketError, StorageError};
pub use execution::BidSummary;
pub use market_data_gen::{replay_into_market, Generator, GeneratorConfig, MarketEvent};
pub use matching::{MarketOrderProcessor, OrderProcessor, ProcessorTable};
pub use offer_book::OfferBook;
pub use persistence::FileStorage;
pub use storage::{MarketSnapshot, MarketStorage, MemoryStorage};
pub use types::{
    AccountId, Bid, BidId, BidStatus, Offer, OfferId, OrderType, Symbol, Transaction, TransactionId,
    DEFAULT_LAST_PRICE,
};
