//! Property-based and deterministic invariant tests.
//!
//! Uses proptest to generate (seed, num_events); replays synthetic offers and
//! bids into a market and asserts: offer and bid conservation, fills at offer
//! prices, status consistency, last-price propagation.
//! Deterministic replay: same config ⇒ same outcome.

use market_engine::{
    BidId, BidStatus, Generator, GeneratorConfig, Market, MarketEvent, MemoryStorage, OfferId, Symbol,
    Transaction, DEFAULT_LAST_PRICE,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// What was submitted, keyed by assigned id.
#[derive(Default)]
struct Submitted {
    offers: HashMap<OfferId, (Symbol, i64, i64)>,
    bids: Vec<(BidId, i64)>,
}

fn replay(market: &Market, events: Vec<MarketEvent>) -> Submitted {
    let mut submitted = Submitted::default();
    for event in events {
        match event {
            MarketEvent::Offer(offer) => {
                let key = (offer.symbol.clone(), offer.price, offer.amount);
                let id = market.offer(offer).unwrap();
                submitted.offers.insert(id, key);
            }
            MarketEvent::Bid(bid) => {
                let amount = bid.amount;
                let id = market.bid(bid).unwrap();
                submitted.bids.push((id, amount));
            }
        }
    }
    submitted
}

fn all_transactions(market: &Market, submitted: &Submitted) -> Vec<Transaction> {
    submitted
        .bids
        .iter()
        .flat_map(|(id, _)| market.transactions_for_bid(*id).unwrap())
        .collect()
}

fn config(seed: u64, num_events: usize) -> GeneratorConfig {
    GeneratorConfig {
        seed,
        symbols: vec!["ACME".into(), "GLOBEX".into(), "INITECH".into()],
        num_events,
        amount_min: 0,
        amount_max: 40,
        price_min: 1,
        price_max: 20,
        ..Default::default()
    }
}

fn assert_invariants(market: &Market, submitted: &Submitted) {
    let transactions = all_transactions(market, submitted);

    // Bid conservation and status.
    for (id, original) in &submitted.bids {
        let summary = market.bid_summary(*id).unwrap();
        let bid = &summary.bid;
        assert!(bid.amount >= 0, "bid {} went negative", id);
        assert_eq!(summary.filled_amount + bid.amount, (*original).max(0), "bid {} conservation", id);
        assert_eq!(
            bid.status == BidStatus::Filled,
            bid.amount < 1,
            "bid {} status {:?} with remaining {}",
            id,
            bid.status,
            bid.amount
        );
    }

    // Offer conservation and execution at the offer's price.
    let mut consumed: HashMap<OfferId, i64> = HashMap::new();
    for tx in &transactions {
        assert!(tx.amount > 0, "transaction amount must be positive");
        let (_, price, _) = submitted.offers.get(&tx.offer_id).expect("transaction for unknown offer");
        assert_eq!(tx.price, *price, "fill at offer price");
        *consumed.entry(tx.offer_id).or_default() += tx.amount;
    }
    let mut resting: HashMap<OfferId, i64> = HashMap::new();
    for symbol in market.symbols().unwrap() {
        let offers = market.offers(&symbol).unwrap();
        assert!(offers.windows(2).all(|w| w[0].price <= w[1].price), "book ordered by price");
        for offer in offers {
            assert!(offer.amount > 0, "empty offer left in book");
            resting.insert(offer.id, offer.amount);
        }
    }
    for (id, (_, _, original)) in &submitted.offers {
        let left = resting.get(id).copied().unwrap_or(0);
        let used = consumed.get(id).copied().unwrap_or(0);
        assert_eq!(left + used, *original, "offer {} conservation", id);
    }

    // Last price is the price of the latest fill per symbol.
    let mut expected: BTreeMap<Symbol, i64> = BTreeMap::new();
    for tx in &transactions {
        let (symbol, _, _) = &submitted.offers[&tx.offer_id];
        expected.insert(symbol.clone(), tx.price);
    }
    for symbol in ["ACME", "GLOBEX", "INITECH"] {
        let symbol = Symbol::from(symbol);
        let want = expected.get(&symbol).copied().unwrap_or(DEFAULT_LAST_PRICE);
        assert_eq!(market.last_price(&symbol).unwrap(), want, "last price for {}", symbol);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// For any (seed, num_events) in range, every invariant holds after replay.
    #[test]
    fn prop_invariants_hold_after_replay(seed in 0u64..100_000u64, num_events in 10usize..150usize) {
        let events = Generator::new(config(seed, num_events)).all_events();
        let market = Market::new(Box::new(MemoryStorage::new()));
        let submitted = replay(&market, events);
        assert_invariants(&market, &submitted);
    }

    /// Bid ids are distinct and strictly increasing in submission order.
    #[test]
    fn prop_bid_ids_strictly_increase(seed in 0u64..10_000u64) {
        let events = Generator::new(config(seed, 80)).all_events();
        let market = Market::new(Box::new(MemoryStorage::new()));
        let submitted = replay(&market, events);
        let ids: Vec<BidId> = submitted.bids.iter().map(|(id, _)| *id).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}

/// Deterministic replay: same config ⇒ same fills, bid for bid.
#[test]
fn deterministic_replay_same_seed_same_outcome() {
    let run = || {
        let market = Market::new(Box::new(MemoryStorage::new()));
        let submitted = replay(&market, Generator::new(config(999, 120)).all_events());
        submitted
            .bids
            .iter()
            .map(|(id, _)| {
                let s = market.bid_summary(*id).unwrap();
                (s.filled_amount, s.transaction_count, s.average_price)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

/// Offers priced 10, 7, 12: the first match takes 7.
#[test]
fn best_price_selected_first() {
    let market = Market::new(Box::new(MemoryStorage::new()));
    for price in [10, 7, 12] {
        market
            .offer(market_engine::Offer::new(market_engine::AccountId(1), "ACME", price, 5))
            .unwrap();
    }
    let id = market
        .bid(market_engine::Bid::new(market_engine::AccountId(2), "ACME", 0, 1))
        .unwrap();
    let txs = market.transactions_for_bid(id).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].price, 7);
}
