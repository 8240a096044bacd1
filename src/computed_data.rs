//! The frozen output bundle for one asset: its taxable-event set, gain/loss
//! set, balance set, a yearly aggregation for reporting, and a weighted
//! average unit price.
use crate::balance::BalanceSet;
use crate::decimal::Decimal;
use crate::error::Result;
use crate::gain_loss_set::GainLossSet;
use crate::model::input_data::InputData;
use crate::model::transaction::TransactionKind;
use crate::model::transaction_set::TransactionSet;
use crate::tax_engine;
use std::collections::BTreeMap;

/// Groups yearly aggregation rows the way the original `YearlyGainLoss`
/// does: by year, asset, transaction type, and long/short-term split.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct YearlyGroupKey {
    pub year: i32,
    pub asset: String,
    pub transaction_kind: TransactionKind,
    pub is_long_term: bool,
}

#[derive(Clone, Debug, Default)]
pub struct YearlyAggregate {
    pub crypto_amount: Decimal,
    pub fiat_taxable_amount: Decimal,
    pub fiat_cost_basis: Decimal,
    pub fiat_gain: Decimal,
}

pub struct ComputedData {
    pub asset: String,
    pub taxable_event_set: TransactionSet,
    pub gain_loss_set: GainLossSet,
    pub balance_set: BalanceSet,
    pub yearly_aggregation: Vec<(YearlyGroupKey, YearlyAggregate)>,
    pub average_unit_price: Decimal,
}

impl ComputedData {
    /// Builds the final bundle for `asset` from an already-finalized
    /// gain/loss set and an input data whose IN/OUT/INTRA sets have not
    /// yet been read (the balance set replay finalizes them).
    pub fn build(
        asset: impl Into<String>,
        gain_loss_set: GainLossSet,
        input_data: &mut InputData,
        allow_negative_balances: bool,
        from_year: i32,
        to_year: i32,
    ) -> Result<Self> {
        let asset = asset.into();

        let mut taxable_event_set = TransactionSet::new();
        for event in tax_engine::collect_taxable_events(input_data) {
            taxable_event_set.add(event)?;
        }

        let balance_set = BalanceSet::replay(input_data, allow_negative_balances)?;

        let mut groups: BTreeMap<YearlyGroupKey, YearlyAggregate> = BTreeMap::new();
        for record in gain_loss_set.records() {
            use chrono::Datelike;
            let year = record.taxable_event_timestamp.year();
            if !(from_year..=to_year).contains(&year) {
                continue;
            }

            let key = YearlyGroupKey {
                year,
                asset: asset.clone(),
                transaction_kind: record.taxable_event_kind,
                is_long_term: record.is_long_term,
            };
            let aggregate = groups.entry(key).or_default();
            aggregate.crypto_amount += record.crypto_amount;
            aggregate.fiat_taxable_amount += record.taxable_event_fiat_amount_with_fee_fraction;
            aggregate.fiat_cost_basis += record.fiat_cost_basis;
            aggregate.fiat_gain += record.fiat_gain;
        }

        let mut yearly_aggregation: Vec<_> = groups.into_iter().collect();
        yearly_aggregation.sort_by(|a, b| b.0.year.cmp(&a.0.year));

        let average_unit_price = Self::weighted_average_unit_price(input_data, to_year);

        Ok(Self {
            asset,
            taxable_event_set,
            gain_loss_set,
            balance_set,
            yearly_aggregation,
            average_unit_price,
        })
    }

    fn weighted_average_unit_price(input_data: &mut InputData, to_year: i32) -> Decimal {
        use chrono::Datelike;

        let mut total_fiat = Decimal::ZERO;
        let mut total_crypto = Decimal::ZERO;

        for t in input_data.in_transactions.iter() {
            if t.timestamp().year() > to_year {
                continue;
            }
            if let Some(in_tx) = t.as_in() {
                total_fiat += in_tx.fiat_in_with_fee();
                total_crypto += in_tx.crypto_in;
            }
        }

        if total_crypto.is_zero_within_crypto_precision() {
            Decimal::ZERO
        } else {
            total_fiat / total_crypto
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::AccountingMethod;
    use crate::accounting::Fifo;
    use crate::config::{AccountingMethodKind, Country};
    use crate::model::account::Account;
    use crate::model::transaction::{
        InKind, InTransaction, OutKind as OK, OutTransaction, Transaction,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[test]
    fn aggregates_by_year_term_and_kind() {
        let mut data = InputData::new("BTC");
        data.add(Transaction::In(
            InTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
                Account::new("kraken", "alice"),
                InKind::Buy,
                Decimal::from(8000),
                Decimal::from(dec!(1)),
                None,
                None,
                None,
                None,
                None,
            )
            .unwrap(),
        ))
        .unwrap();

        data.add(Transaction::Out(
            OutTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap(),
                Account::new("kraken", "alice"),
                OK::Sell,
                Decimal::from(12000),
                Decimal::from(dec!(1)),
                Decimal::ZERO,
                None,
                None,
                None,
                None,
                None,
            )
            .unwrap(),
        ))
        .unwrap();

        let country = Country::new(
            "US",
            "USD",
            365,
            AccountingMethodKind::Fifo,
            [AccountingMethodKind::Fifo].into_iter().collect(),
        )
        .unwrap();

        let mut methods: BTreeMap<i32, Box<dyn AccountingMethod>> = BTreeMap::new();
        methods.insert(2000, Box::new(Fifo::new()));

        let gain_loss_set = tax_engine::run(&mut data, &country, methods).unwrap();

        let mut data_for_balance = data.clone();
        let computed =
            ComputedData::build("BTC", gain_loss_set, &mut data_for_balance, false, 2020, 2020)
                .unwrap();

        assert_eq!(computed.yearly_aggregation.len(), 1);
        let (key, aggregate) = &computed.yearly_aggregation[0];
        assert_eq!(key.year, 2020);
        assert_eq!(key.asset, "BTC");
        assert!(key.is_long_term);
        assert_eq!(key.transaction_kind, TransactionKind::Out(OK::Sell));
        assert_eq!(aggregate.fiat_gain, Decimal::from(dec!(4000)));

        let mut taxable_event_set = computed.taxable_event_set;
        assert_eq!(taxable_event_set.len(), 1);
        assert_eq!(taxable_event_set.iter().count(), 1);
    }
}
