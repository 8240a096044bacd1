//! Ordered collection of gain/loss records. Sorts itself chronologically
//! and computes per-event/per-lot fraction counters the first time it is
//! read, mirroring [`crate::model::transaction_set::TransactionSet`]'s
//! finalize-on-read discipline.
use crate::error::{Error, Result};
use crate::gain_loss::GainLossRecord;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct GainLossSet {
    records: Vec<GainLossRecord>,
    finalized: bool,
}

impl GainLossSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: GainLossRecord) {
        debug_assert!(!self.finalized, "GainLossSet mutated after finalize");
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorts by taxable-event timestamp, then assigns fraction indices per
    /// event and per lot. `validates_ancestry` should return `false` for a
    /// record's originating method when lots may legitimately be selected
    /// out of chronological order (LIFO, HIFO, LOFO, specific-ID).
    pub fn finalize(&mut self, validates_ancestry: impl Fn(&GainLossRecord) -> bool) -> Result<()> {
        if self.finalized {
            return Ok(());
        }

        self.records
            .sort_by_key(|r| (r.taxable_event_timestamp, r.taxable_event_id));

        let mut event_counts: HashMap<u64, usize> = HashMap::new();
        let mut lot_counts: HashMap<u64, usize> = HashMap::new();
        for record in &self.records {
            *event_counts.entry(record.taxable_event_id).or_default() += 1;
            if let Some(lot_id) = record.acquired_lot_id {
                *lot_counts.entry(lot_id).or_default() += 1;
            }
        }

        let mut event_seen: HashMap<u64, usize> = HashMap::new();
        let mut lot_seen: HashMap<u64, usize> = HashMap::new();
        let mut last_lot_timestamp_by_ancestry_chain = None;

        for record in &mut self.records {
            let event_fraction = event_seen.entry(record.taxable_event_id).or_default();
            record.taxable_event_fraction = *event_fraction;
            record.taxable_event_number_of_fractions = event_counts[&record.taxable_event_id];
            *event_fraction += 1;

            if let Some(lot_id) = record.acquired_lot_id {
                let lot_fraction = lot_seen.entry(lot_id).or_default();
                record.acquired_lot_fraction = *lot_fraction;
                record.acquired_lot_number_of_fractions = lot_counts[&lot_id];
                *lot_fraction += 1;

                if validates_ancestry(record) {
                    if let Some(previous) = last_lot_timestamp_by_ancestry_chain {
                        if record.acquired_lot_timestamp.unwrap() < previous {
                            return Err(Error::Internal(format!(
                                "lot ancestry chain went backwards at record for event {}",
                                record.taxable_event_id
                            )));
                        }
                    }
                    last_lot_timestamp_by_ancestry_chain = record.acquired_lot_timestamp;
                }
            }
        }

        self.finalized = true;
        Ok(())
    }

    pub fn records(&self) -> &[GainLossRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;
    use crate::model::account::Account;
    use crate::model::transaction::{InKind, InTransaction, OutKind, OutTransaction, Transaction};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn lot(year: i32, month: u32) -> InTransaction {
        InTransaction::new(
            "BTC",
            chrono::Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap(),
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

    fn sell(year: i32, month: u32, amount: Decimal) -> Transaction {
        Transaction::Out(
            OutTransaction::new(
                "BTC",
                chrono::Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap(),
                Account::new("kraken", "alice"),
                OutKind::Sell,
                Decimal::from(12000),
                amount,
                Decimal::ZERO,
                None,
                None,
                None,
                None,
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn assigns_fractions_per_event_and_lot() {
        let lot1 = lot(2020, 1);
        let lot2 = lot(2020, 2);

        let event = sell(2020, 6, Decimal::from(dec!(1.2)));

        let r1 = GainLossRecord::new(&event, Some(&lot1), Decimal::from(dec!(1)), 365).unwrap();
        let r2 = GainLossRecord::new(&event, Some(&lot2), Decimal::from(dec!(0.2)), 365).unwrap();

        let mut set = GainLossSet::new();
        set.add(r1);
        set.add(r2);
        set.finalize(|_| true).unwrap();

        let records = set.records();
        assert_eq!(records[0].taxable_event_fraction, 0);
        assert_eq!(records[0].taxable_event_number_of_fractions, 2);
        assert_eq!(records[1].taxable_event_fraction, 1);
    }

    #[test]
    fn ancestry_violation_detected_when_validated() {
        let newer_lot = lot(2020, 6);
        let older_lot = lot(2020, 1);

        let event1 = sell(2020, 7, Decimal::from(dec!(1)));
        let event2 = sell(2020, 8, Decimal::from(dec!(1)));

        let r1 = GainLossRecord::new(&event1, Some(&newer_lot), Decimal::from(dec!(1)), 365).unwrap();
        let r2 = GainLossRecord::new(&event2, Some(&older_lot), Decimal::from(dec!(1)), 365).unwrap();

        let mut set = GainLossSet::new();
        set.add(r1);
        set.add(r2);

        assert!(set.finalize(|_| true).is_err());
    }

    #[test]
    fn ancestry_violation_ignored_when_method_opts_out() {
        let newer_lot = lot(2020, 6);
        let older_lot = lot(2020, 1);

        let event1 = sell(2020, 7, Decimal::from(dec!(1)));
        let event2 = sell(2020, 8, Decimal::from(dec!(1)));

        let r1 = GainLossRecord::new(&event1, Some(&newer_lot), Decimal::from(dec!(1)), 365).unwrap();
        let r2 = GainLossRecord::new(&event2, Some(&older_lot), Decimal::from(dec!(1)), 365).unwrap();

        let mut set = GainLossSet::new();
        set.add(r1);
        set.add(r2);

        assert!(set.finalize(|_| false).is_ok());
    }
}
