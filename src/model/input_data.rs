//! Per-asset bundle of the three transaction sets a tax-engine run drives
//! off of. Grounded on the teacher's per-asset `BasisLookup` bundling
//! pattern, generalized from a single FIFO-of-buys to the three typed
//! sets this engine's data model requires.
use crate::error::Result;
use crate::model::transaction::Transaction;
use crate::model::transaction_set::TransactionSet;

#[derive(Clone, Debug, Default)]
pub struct InputData {
    pub asset: String,
    pub in_transactions: TransactionSet,
    pub out_transactions: TransactionSet,
    pub intra_transactions: TransactionSet,
}

impl InputData {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, transaction: Transaction) -> Result<()> {
        match &transaction {
            Transaction::In(_) => self.in_transactions.add(transaction),
            Transaction::Out(_) => self.out_transactions.add(transaction),
            Transaction::Intra(_) => self.intra_transactions.add(transaction),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.in_transactions.is_empty()
            && self.out_transactions.is_empty()
            && self.intra_transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;
    use crate::model::account::Account;
    use crate::model::transaction::{InKind, InTransaction, OutKind, OutTransaction};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn routes_transactions_by_kind() {
        let mut data = InputData::new("BTC");

        data.add(Transaction::In(
            InTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                Account::new("kraken", "alice"),
                InKind::Buy,
                Decimal::from(dec!(10000)),
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
                OutKind::Sell,
                Decimal::from(dec!(12000)),
                Decimal::from(dec!(0.5)),
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

        assert_eq!(data.in_transactions.len(), 1);
        assert_eq!(data.out_transactions.len(), 1);
        assert!(data.intra_transactions.is_empty());
    }
}
