use crate::accounting::{AccountingMethod, Candidates, LotOrder};
use crate::decimal::Decimal;
use crate::model::transaction::InTransaction;

/// Highest-spot-price non-exhausted lot first; ties broken by earlier
/// timestamp, then lower internal identity, so selection is deterministic.
#[derive(Debug, Default)]
pub struct Hifo;

impl Hifo {
    pub fn new() -> Self {
        Self
    }
}

impl AccountingMethod for Hifo {
    fn seek_non_exhausted_acquired_lot<'a>(
        &self,
        candidates: &Candidates<'a>,
        _event_id: u64,
    ) -> Option<(&'a InTransaction, Decimal)> {
        let mut best: Option<(usize, &'a InTransaction)> = None;

        for index in candidates.indices(LotOrder::OlderToNewer) {
            if candidates.is_exhausted(index) {
                continue;
            }

            let candidate = candidates.lot_at(index);
            best = Some(match best {
                None => (index, candidate),
                Some((current_index, current)) => {
                    let wins = match candidate.spot_price.cmp(&current.spot_price) {
                        std::cmp::Ordering::Greater => true,
                        std::cmp::Ordering::Less => false,
                        std::cmp::Ordering::Equal => match candidate.timestamp.cmp(&current.timestamp) {
                            std::cmp::Ordering::Less => true,
                            std::cmp::Ordering::Greater => false,
                            std::cmp::Ordering::Equal => candidate.id() < current.id(),
                        },
                    };
                    if wins {
                        (index, candidate)
                    } else {
                        (current_index, current)
                    }
                }
            });
        }

        best.map(|(index, lot)| (lot, candidates.available_amount(index)))
    }

    fn lot_candidates_order(&self) -> LotOrder {
        LotOrder::OlderToNewer
    }

    fn validates_lot_ancestry(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "HIFO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::account::Account;
    use crate::model::transaction::InKind;
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
    fn picks_highest_spot_price() {
        let lots = vec![lot(2019, 9000), lot(2020, 11000), lot(2021, 10000)];
        let partial = HashMap::new();
        let candidates = Candidates::new(&lots, &partial);
        let (picked, _) = Hifo::new()
            .seek_non_exhausted_acquired_lot(&candidates, 0)
            .unwrap();
        assert_eq!(picked.id(), lots[1].id());
    }
}
