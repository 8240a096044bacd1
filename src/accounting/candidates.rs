//! A read-only view over the acquired-lot vector up to some index, paired
//! with the engine's partial-amount bookkeeping map. Grounded on the
//! teacher's `PoolAsset`/`splittable_take_while` partial-consumption
//! pattern, but generalized to never mutate the lot itself: the remaining
//! amount lives in a side map the engine owns, keeping lots immutable
//! value types throughout their lifetime.
use crate::accounting::LotOrder;
use crate::decimal::Decimal;
use crate::model::transaction::InTransaction;
use std::collections::HashMap;

pub struct Candidates<'a> {
    lots: &'a [InTransaction],
    partial_amounts: &'a HashMap<u64, Decimal>,
}

impl<'a> Candidates<'a> {
    pub fn new(lots: &'a [InTransaction], partial_amounts: &'a HashMap<u64, Decimal>) -> Self {
        Self {
            lots,
            partial_amounts,
        }
    }

    /// Number of lots visible to this view (indices `0..len()`).
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn lot_at(&self, index: usize) -> &'a InTransaction {
        &self.lots[index]
    }

    /// The crypto amount still available in the lot at `index`: its full
    /// `crypto_in` if untouched, or the stored remainder if partially
    /// consumed.
    pub fn available_amount(&self, index: usize) -> Decimal {
        let lot = &self.lots[index];
        self.partial_amounts
            .get(&lot.id())
            .copied()
            .unwrap_or_else(|| lot.crypto_balance_change())
    }

    pub fn is_exhausted(&self, index: usize) -> bool {
        self.available_amount(index).is_zero_within_crypto_precision()
    }

    pub fn indices(&self, order: LotOrder) -> Box<dyn DoubleEndedIterator<Item = usize>> {
        let range = 0..self.lots.len();
        match order {
            LotOrder::OlderToNewer => Box::new(range),
            LotOrder::NewerToOlder => Box::new(range.rev()),
        }
    }
}
