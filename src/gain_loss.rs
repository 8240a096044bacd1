//! A single gain/loss record: one pairing of a taxable-event fraction with
//! an acquired-lot fraction (or none, for earn-typed income).
use crate::decimal::Decimal;
use crate::error::{AccountingError, Result};
use crate::model::transaction::{InTransaction, Transaction, TransactionKind};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct GainLossRecord {
    pub taxable_event_id: u64,
    pub taxable_event_timestamp: DateTime<Utc>,
    pub taxable_event_kind: TransactionKind,
    pub taxable_event_is_earn: bool,
    pub acquired_lot_id: Option<u64>,
    pub acquired_lot_timestamp: Option<DateTime<Utc>>,
    pub crypto_amount: Decimal,
    pub taxable_event_fiat_amount_with_fee_fraction: Decimal,
    pub acquired_lot_fiat_amount_with_fee_fraction: Decimal,
    pub fiat_cost_basis: Decimal,
    pub fiat_gain: Decimal,
    pub is_long_term: bool,

    /// Filled in by the owning [`crate::gain_loss_set::GainLossSet`] on
    /// its first sort-and-bookkeeping pass.
    pub taxable_event_fraction: usize,
    pub taxable_event_number_of_fractions: usize,
    pub acquired_lot_fraction: usize,
    pub acquired_lot_number_of_fractions: usize,
}

impl GainLossRecord {
    /// Builds a record pairing `event` with `lot` for `crypto_amount`, or
    /// with no lot for an earn-typed `event`.
    pub fn new(
        event: &Transaction,
        lot: Option<&InTransaction>,
        crypto_amount: Decimal,
        long_term_period_days: i64,
    ) -> Result<Self> {
        if !event.is_taxable() {
            return Err(AccountingError::EventNotTaxable(event.id()).into());
        }

        if event.is_earn() {
            if lot.is_some() {
                return Err(AccountingError::EarnEventWithLot(event.id()).into());
            }

            let taxable_event_fiat_amount_with_fee_fraction = event.fiat_taxable_amount();

            return Ok(Self {
                taxable_event_id: event.id(),
                taxable_event_timestamp: event.timestamp(),
                taxable_event_kind: event.kind(),
                taxable_event_is_earn: true,
                acquired_lot_id: None,
                acquired_lot_timestamp: None,
                crypto_amount,
                taxable_event_fiat_amount_with_fee_fraction,
                acquired_lot_fiat_amount_with_fee_fraction: Decimal::ZERO,
                fiat_cost_basis: Decimal::ZERO,
                fiat_gain: taxable_event_fiat_amount_with_fee_fraction,
                is_long_term: false,
                taxable_event_fraction: 0,
                taxable_event_number_of_fractions: 0,
                acquired_lot_fraction: 0,
                acquired_lot_number_of_fractions: 0,
            });
        }

        let lot = lot.ok_or(AccountingError::MissingAcquiredLot(event.id()))?;

        if lot.timestamp > event.timestamp() {
            return Err(AccountingError::LotAfterEvent {
                lot: lot.id(),
                lot_time: lot.timestamp,
                event: event.id(),
                event_time: event.timestamp(),
            }
            .into());
        }

        let taxable_event_fiat_amount_with_fee_fraction =
            (event.fiat_taxable_amount() * crypto_amount) / event.crypto_balance_change();
        let acquired_lot_fiat_amount_with_fee_fraction =
            (lot.fiat_in_with_fee() * crypto_amount) / lot.crypto_balance_change();

        let fiat_cost_basis = acquired_lot_fiat_amount_with_fee_fraction;
        let fiat_gain = taxable_event_fiat_amount_with_fee_fraction - fiat_cost_basis;

        let held_days = (event.timestamp() - lot.timestamp).num_days();
        let is_long_term = held_days >= long_term_period_days;

        Ok(Self {
            taxable_event_id: event.id(),
            taxable_event_timestamp: event.timestamp(),
            taxable_event_kind: event.kind(),
            taxable_event_is_earn: false,
            acquired_lot_id: Some(lot.id()),
            acquired_lot_timestamp: Some(lot.timestamp),
            crypto_amount,
            taxable_event_fiat_amount_with_fee_fraction,
            acquired_lot_fiat_amount_with_fee_fraction,
            fiat_cost_basis,
            fiat_gain,
            is_long_term,
            taxable_event_fraction: 0,
            taxable_event_number_of_fractions: 0,
            acquired_lot_fraction: 0,
            acquired_lot_number_of_fractions: 0,
        })
    }
}
