use crate::accounting::{AccountingMethod, Candidates, LotOrder};
use crate::decimal::Decimal;
use crate::model::transaction::InTransaction;

/// Newest non-exhausted lot first. Because later taxable events can add
/// lots the engine had already skipped past, LIFO rescans every call
/// rather than caching a cursor the way [`super::fifo::Fifo`] does.
#[derive(Debug, Default)]
pub struct Lifo;

impl Lifo {
    pub fn new() -> Self {
        Self
    }
}

impl AccountingMethod for Lifo {
    fn seek_non_exhausted_acquired_lot<'a>(
        &self,
        candidates: &Candidates<'a>,
        _event_id: u64,
    ) -> Option<(&'a InTransaction, Decimal)> {
        for index in candidates.indices(LotOrder::NewerToOlder) {
            if !candidates.is_exhausted(index) {
                return Some((candidates.lot_at(index), candidates.available_amount(index)));
            }
        }
        None
    }

    fn lot_candidates_order(&self) -> LotOrder {
        LotOrder::NewerToOlder
    }

    fn validates_lot_ancestry(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "LIFO"
    }
}
