//! Synthetic order flow.
//!
//! Deterministic, configurable stream of offers and bids for replay tests,
//! demos, and benchmarks. Same seed ⇒ same sequence of events.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::Market;
use crate::error::MarketError;
use crate::types::{AccountId, Bid, BidId, Offer, Symbol};

/// Configuration for the generator. All ranges are inclusive.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed ⇒ same stream.
    pub seed: u64,
    /// Symbols events are spread across, chosen uniformly.
    pub symbols: Vec<Symbol>,
    /// Number of events to generate when collecting.
    pub num_events: usize,
    /// Probability of an offer (0.0..=1.0). Bid otherwise.
    pub offer_ratio: f64,
    pub price_min: i64,
    pub price_max: i64,
    /// Offer amounts are clamped to at least 1; bids may use the full range,
    /// so a minimum of 0 exercises zero-amount bids.
    pub amount_min: i64,
    pub amount_max: i64,
    /// Number of distinct accounts (1..=num_accounts).
    pub num_accounts: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            symbols: vec![Symbol::from("ACME")],
            num_events: 1000,
            offer_ratio: 0.6,
            price_min: 95,
            price_max: 105,
            amount_min: 1,
            amount_max: 100,
            num_accounts: 5,
        }
    }
}

/// One submission to the market.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarketEvent {
    Offer(Offer),
    Bid(Bid),
}

/// Deterministic event stream. Iterate, or call [`Generator::all_events`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { rng, config }
    }

    /// Next event. Advances the RNG.
    pub fn next_event(&mut self) -> MarketEvent {
        let symbol = if self.config.symbols.is_empty() {
            Symbol::from("ACME")
        } else {
            let i = self.rng.gen_range(0..self.config.symbols.len());
            self.config.symbols[i].clone()
        };
        let account = AccountId(self.rng.gen_range(1..=self.config.num_accounts.max(1)));
        let price = self
            .rng
            .gen_range(self.config.price_min..=self.config.price_max.max(self.config.price_min));
        let amount = self
            .rng
            .gen_range(self.config.amount_min..=self.config.amount_max.max(self.config.amount_min));
        if self.rng.gen::<f64>() < self.config.offer_ratio {
            MarketEvent::Offer(Offer::new(account, symbol, price, amount.max(1)))
        } else {
            MarketEvent::Bid(Bid::new(account, symbol, price, amount))
        }
    }

    /// Generate `config.num_events` events.
    pub fn all_events(mut self) -> Vec<MarketEvent> {
        let n = self.config.num_events;
        (0..n).map(|_| self.next_event()).collect()
    }
}

impl Iterator for Generator {
    type Item = MarketEvent;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_event())
    }
}

/// Submit events in order. Returns the ids of the submitted bids.
pub fn replay_into_market(
    market: &Market,
    events: impl IntoIterator<Item = MarketEvent>,
) -> Result<Vec<BidId>, MarketError> {
    let mut bid_ids = Vec::new();
    for event in events {
        match event {
            MarketEvent::Offer(offer) => {
                market.offer(offer)?;
            }
            MarketEvent::Bid(bid) => bid_ids.push(market.bid(bid)?),
        }
    }
    Ok(bid_ids)
}
