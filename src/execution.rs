//! Execution reporting for bids.
//!
//! [`BidSummary`] pairs a bid with what it executed. The average price is a
//! volume-weighted [`Decimal`] so integer prices do not truncate. A notional
//! outside `Decimal`'s range leaves the average unset.

use crate::types::{Bid, Transaction};
use rust_decimal::Decimal;

/// A bid's current state plus its fills.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BidSummary {
    pub bid: Bid,
    pub filled_amount: i64,
    pub transaction_count: usize,
    /// `None` when nothing was filled or the notional does not fit a `Decimal`.
    pub average_price: Option<Decimal>,
}

impl BidSummary {
    /// Build from the bid and the transactions settled against it.
    pub fn new(bid: Bid, transactions: &[Transaction]) -> Self {
        let filled: i64 = transactions.iter().map(|tx| tx.amount).sum();
        let notional = transactions.iter().try_fold(Decimal::ZERO, |acc, tx| {
            Decimal::from(tx.price)
                .checked_mul(Decimal::from(tx.amount))
                .and_then(|value| acc.checked_add(value))
        });
        let average_price = match notional {
            Some(notional) if filled > 0 => notional.checked_div(Decimal::from(filled)),
            _ => None,
        };
        Self {
            bid,
            filled_amount: filled,
            transaction_count: transactions.len(),
            average_price,
        }
    }

    /// Amount the bid asked for when submitted.
    pub fn original_amount(&self) -> i64 {
        self.filled_amount + self.bid.amount
    }
}
