use crate::accounting::{AccountingMethod, Candidates, LotOrder};
use crate::decimal::Decimal;
use crate::model::transaction::InTransaction;
use std::cell::Cell;

/// Oldest non-exhausted lot first. Maintains an amortized cursor: once a
/// lot at some index is known exhausted, every later seek can skip past
/// it, since FIFO only ever walks forward.
#[derive(Debug, Default)]
pub struct Fifo {
    from_index: Cell<usize>,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountingMethod for Fifo {
    fn seek_non_exhausted_acquired_lot<'a>(
        &self,
        candidates: &Candidates<'a>,
        _event_id: u64,
    ) -> Option<(&'a InTransaction, Decimal)> {
        let mut index = self.from_index.get();

        while index < candidates.len() {
            if !candidates.is_exhausted(index) {
                self.from_index.set(index);
                return Some((candidates.lot_at(index), candidates.available_amount(index)));
            }
            index += 1;
        }

        self.from_index.set(index);
        None
    }

    fn lot_candidates_order(&self) -> LotOrder {
        LotOrder::OlderToNewer
    }

    fn validates_lot_ancestry(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "FIFO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::account::Account;
    use crate::model::transaction::{InKind, InTransaction};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lot(year: i32, price: i64) -> InTransaction {
        InTransaction::new(
            "BTC",
            Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
            Account::new("kraken", "alice"),
            InKind::Buy,
            Decimal::from(price),
            Decimal::from(dec!(1)),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn seeks_oldest_first_and_skips_exhausted() {
        let lots = vec![lot(2019, 9000), lot(2020, 10000), lot(2021, 11000)];
        let mut partial = HashMap::new();
        partial.insert(lots[0].id(), Decimal::ZERO);

        let candidates = Candidates::new(&lots, &partial);
        let method = Fifo::new();

        let (picked, amount) = method.seek_non_exhausted_acquired_lot(&candidates, 0).unwrap();
        assert_eq!(picked.id(), lots[1].id());
        assert_eq!(amount, Decimal::from(dec!(1)));
    }
}
