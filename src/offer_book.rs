//! Resting offers for every symbol, ordered by price.
//!
//! Each symbol keeps an ordered index of `(price, OfferId)`; the first entry is
//! the best offer. Equal prices fall back to id order, which for UUID v7 ids is
//! insertion order.

use crate::error::StorageError;
use crate::types::{Offer, OfferId, Symbol};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Price index for one symbol.
type PriceIndex = BTreeSet<(i64, OfferId)>;

/// Offer book across all symbols.
#[derive(Debug, Default, Clone)]
pub struct OfferBook {
    levels: BTreeMap<Symbol, PriceIndex>,
    /// Offers by id for update/lookup.
    offers: HashMap<OfferId, Offer>,
}

impl OfferBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book from a list of offers (e.g. a persisted snapshot).
    /// Offers with no remaining amount are dropped.
    pub fn from_offers(offers: impl IntoIterator<Item = Offer>) -> Self {
        let mut book = Self::new();
        for offer in offers {
            if offer.amount > 0 {
                book.insert(offer);
            }
        }
        book
    }

    /// Add an offer under its current id. Caller assigns the id.
    pub fn insert(&mut self, offer: Offer) {
        self.levels
            .entry(offer.symbol.clone())
            .or_default()
            .insert((offer.price, offer.id));
        self.offers.insert(offer.id, offer);
    }

    /// Lowest-priced offer for the symbol, if any.
    pub fn best(&self, symbol: &Symbol) -> Option<&Offer> {
        let (_, id) = self.levels.get(symbol)?.first()?;
        self.offers.get(id)
    }

    /// Replace a stored offer, or remove it when its amount is used up.
    pub fn update(&mut self, offer: &Offer) -> Result<(), StorageError> {
        let Some(previous) = self.offers.remove(&offer.id) else {
            return Err(StorageError::OfferNotFound(offer.id));
        };
        self.unindex(&previous);
        if offer.amount > 0 {
            self.insert(offer.clone());
        }
        Ok(())
    }

    pub fn get(&self, id: OfferId) -> Option<&Offer> {
        self.offers.get(&id)
    }

    /// Resting offers for the symbol, best first.
    pub fn offers_for(&self, symbol: &Symbol) -> Vec<Offer> {
        let Some(index) = self.levels.get(symbol) else {
            return Vec::new();
        };
        index
            .iter()
            .filter_map(|(_, id)| self.offers.get(id).cloned())
            .collect()
    }

    /// Symbols with at least one resting offer.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.levels.keys()
    }

    /// All resting offers, grouped by symbol and price-ordered within a symbol.
    pub fn snapshot(&self) -> Vec<Offer> {
        self.levels
            .values()
            .flat_map(|index| index.iter())
            .filter_map(|(_, id)| self.offers.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    fn unindex(&mut self, offer: &Offer) {
        if let Some(index) = self.levels.get_mut(&offer.symbol) {
            index.remove(&(offer.price, offer.id));
            if index.is_empty() {
                self.levels.remove(&offer.symbol);
            }
        }
    }
}
