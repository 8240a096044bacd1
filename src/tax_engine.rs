//! Main driver: builds the taxable-event set for an asset, walks the
//! accounting engine to pair each disposal with cost basis, and emits a
//! finalized [`GainLossSet`].
use crate::accounting::AccountingEngine;
use crate::accounting::AccountingMethod;
use crate::config::Country;
use crate::decimal::Decimal;
use crate::error::{AccountingError, Result};
use crate::gain_loss::GainLossRecord;
use crate::gain_loss_set::GainLossSet;
use crate::model::input_data::InputData;
use crate::model::transaction::{InTransaction, Transaction};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Collects every taxable event across an asset's IN, OUT, and INTRA sets,
/// sorted chronologically. Shared by [`run`] and
/// [`crate::computed_data::ComputedData::build`], which needs the same set
/// to report alongside the gain/loss set it drives off of.
pub fn collect_taxable_events(input_data: &mut InputData) -> Vec<Transaction> {
    let mut taxable_events: Vec<Transaction> = Vec::new();

    for t in input_data.in_transactions.iter() {
        if t.is_taxable() {
            taxable_events.push(t.clone());
        }
    }
    for t in input_data.out_transactions.iter() {
        taxable_events.push(t.clone());
    }
    for t in input_data.intra_transactions.iter() {
        if t.is_taxable() {
            taxable_events.push(t.clone());
        }
    }

    taxable_events.sort_by_key(|t| (t.timestamp(), t.id()));
    taxable_events
}

/// Drives the pairing of taxable events against acquired lots for one
/// asset and returns the finalized gain/loss set.
pub fn run(
    input_data: &mut InputData,
    country: &Country,
    accounting_methods: BTreeMap<i32, Box<dyn AccountingMethod>>,
) -> Result<GainLossSet> {
    let taxable_events = collect_taxable_events(input_data);

    let mut gain_loss_set = GainLossSet::new();

    if taxable_events.is_empty() {
        return Ok(gain_loss_set);
    }

    let lots: Vec<InTransaction> = input_data
        .in_transactions
        .iter()
        .filter_map(|t| t.as_in().cloned())
        .collect();

    let asset = input_data.asset.clone();
    let mut engine = AccountingEngine::new(asset.clone(), lots, accounting_methods)?;

    for event in &taxable_events {
        if event.is_earn() {
            let amount = event.crypto_balance_change();
            gain_loss_set.add(GainLossRecord::new(
                event,
                None,
                amount,
                country.long_term_period_days,
            )?);
            continue;
        }

        let mut remaining = event.crypto_balance_change();

        if remaining.is_zero_within_crypto_precision() {
            // Fee-kind OUT transactions (or any other zero-amount taxable
            // event) have nothing to pair against a lot.
            continue;
        }

        while !remaining.is_zero_within_crypto_precision() {
            let (lot, available) = engine.get_acquired_lot_for_taxable_event(event)?;
            let lot_id = lot.id();
            let amount = remaining.min(available);

            gain_loss_set.add(GainLossRecord::new(
                event,
                Some(lot),
                amount,
                country.long_term_period_days,
            )?);

            engine.consume(lot_id, available, amount);
            remaining -= amount;
        }
    }

    gain_loss_set.finalize(|record| {
        let year = record.taxable_event_timestamp.year();
        engine
            .validates_lot_ancestry_for_year(year)
            .unwrap_or(false)
    })?;

    Ok(gain_loss_set)
}
