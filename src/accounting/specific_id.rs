use crate::accounting::{AccountingMethod, Candidates, LotOrder};
use crate::decimal::Decimal;
use crate::model::transaction::InTransaction;
use std::collections::HashMap;

/// A caller-supplied pin from taxable-event id to the acquired-lot id it
/// should be charged against. Events without a pin, or whose pinned lot
/// is out of range or already exhausted, fall back to another method
/// (FIFO by default).
pub struct SpecificId {
    pins: HashMap<u64, u64>,
    fallback: Box<dyn AccountingMethod>,
}

impl SpecificId {
    pub fn new(pins: HashMap<u64, u64>) -> Self {
        Self {
            pins,
            fallback: Box::new(super::Fifo::new()),
        }
    }

    pub fn with_fallback(pins: HashMap<u64, u64>, fallback: Box<dyn AccountingMethod>) -> Self {
        Self { pins, fallback }
    }
}

impl AccountingMethod for SpecificId {
    fn seek_non_exhausted_acquired_lot<'a>(
        &self,
        candidates: &Candidates<'a>,
        event_id: u64,
    ) -> Option<(&'a InTransaction, Decimal)> {
        if let Some(&lot_id) = self.pins.get(&event_id) {
            for index in candidates.indices(LotOrder::OlderToNewer) {
                let lot = candidates.lot_at(index);
                if lot.id() == lot_id && !candidates.is_exhausted(index) {
                    return Some((lot, candidates.available_amount(index)));
                }
            }
        }

        self.fallback.seek_non_exhausted_acquired_lot(candidates, event_id)
    }

    fn lot_candidates_order(&self) -> LotOrder {
        LotOrder::OlderToNewer
    }

    fn validates_lot_ancestry(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "SPEC_ID"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::account::Account;
    use crate::model::transaction::InKind;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn lot(year: i32) -> InTransaction {
        InTransaction::new(
            "BTC",
            Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
            Account::new("kraken", "alice"),
            InKind::Buy,
            Decimal::from(10000),
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
    fn honors_pin_when_present() {
        let lots = vec![lot(2019), lot(2020), lot(2021)];
        let partial = HashMap::new();
        let candidates = Candidates::new(&lots, &partial);

        let mut pins = HashMap::new();
        pins.insert(42, lots[2].id());
        let method = SpecificId::new(pins);

        let (picked, _) = method.seek_non_exhausted_acquired_lot(&candidates, 42).unwrap();
        assert_eq!(picked.id(), lots[2].id());
    }

    #[test]
    fn falls_back_when_unpinned() {
        let lots = vec![lot(2019), lot(2020)];
        let partial = HashMap::new();
        let candidates = Candidates::new(&lots, &partial);

        let method = SpecificId::new(HashMap::new());
        let (picked, _) = method.seek_non_exhausted_acquired_lot(&candidates, 7).unwrap();
        assert_eq!(picked.id(), lots[0].id());
    }
}
