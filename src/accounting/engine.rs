//! Coordinates the AVL-indexed vector of acquired lots against whichever
//! accounting method is active for a given year. The taxable-event side of
//! the pairing loop lives in [`crate::tax_engine`]; this engine only
//! answers "which lot (and how much of it) covers this event", leaving the
//! event iterator's advancement to the driver that already owns it.
use crate::accounting::{AccountingMethod, Candidates};
use crate::avl::OrderedIndex;
use crate::decimal::Decimal;
use crate::error::{AccountingError, Result};
use crate::model::transaction::{InTransaction, Transaction};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

pub struct AccountingEngine {
    asset: String,
    lots: Vec<InTransaction>,
    index: OrderedIndex<(DateTime<Utc>, u64), usize>,
    partial_amounts: HashMap<u64, Decimal>,
    years_to_methods: BTreeMap<i32, Box<dyn AccountingMethod>>,
}

impl AccountingEngine {
    pub fn new(
        asset: impl Into<String>,
        acquired_lots: impl IntoIterator<Item = InTransaction>,
        years_to_methods: BTreeMap<i32, Box<dyn AccountingMethod>>,
    ) -> Result<Self> {
        let mut lots = Vec::new();
        let mut index = OrderedIndex::new();

        for lot in acquired_lots {
            let key = (lot.timestamp, lot.id());
            let position = lots.len();
            lots.push(lot);
            index.insert(key, position);
        }

        if lots.is_empty() {
            return Err(AccountingError::NoAcquiredLots.into());
        }

        Ok(Self {
            asset: asset.into(),
            lots,
            index,
            partial_amounts: HashMap::new(),
            years_to_methods,
        })
    }

    fn method_for_year(&self, year: i32) -> Result<&dyn AccountingMethod> {
        self.years_to_methods
            .range(..=year)
            .next_back()
            .map(|(_, method)| method.as_ref())
            .ok_or_else(|| AccountingError::NoMethodForYear(year).into())
    }

    /// Finds the lot the active method picks for `event`, along with the
    /// crypto amount still available in it. Does not mutate any
    /// bookkeeping; call [`Self::consume`] once the caller decides how
    /// much of that amount to actually use.
    pub fn get_acquired_lot_for_taxable_event(
        &self,
        event: &Transaction,
    ) -> Result<(&InTransaction, Decimal)> {
        use chrono::Datelike;
        let method = self.method_for_year(event.timestamp().year())?;

        let key = (event.timestamp(), u64::MAX);
        let to_index = match self.index.find_max_value_with_key_less_than_or_equal(&key) {
            Some(&i) => i,
            None => {
                return Err(AccountingError::AcquiredLotsExhausted {
                    asset: self.asset.clone(),
                }
                .into())
            }
        };

        let candidates = Candidates::new(&self.lots[0..=to_index], &self.partial_amounts);
        method
            .seek_non_exhausted_acquired_lot(&candidates, event.id())
            .ok_or_else(|| {
                AccountingError::AcquiredLotsExhausted {
                    asset: self.asset.clone(),
                }
                .into()
            })
    }

    /// Records that `amount_consumed` of `lot_available` from lot
    /// `lot_id` has now been applied to a gain/loss record.
    pub fn consume(&mut self, lot_id: u64, lot_available: Decimal, amount_consumed: Decimal) {
        let remaining = lot_available - amount_consumed;
        self.partial_amounts.insert(lot_id, remaining);
    }

    pub fn active_method_name(&self, year: i32) -> Result<&'static str> {
        self.method_for_year(year).map(|m| m.name())
    }

    pub fn validates_lot_ancestry_for_year(&self, year: i32) -> Result<bool> {
        self.method_for_year(year).map(|m| m.validates_lot_ancestry())
    }
}
