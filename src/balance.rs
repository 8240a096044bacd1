//! Reconstructs final per-account balances by replaying every unfiltered
//! transaction for an asset in chronological order (ties broken IN, then
//! INTRA, then OUT), enforcing non-negativity as it goes.
use crate::decimal::Decimal;
use crate::error::{BalanceError, Result};
use crate::model::account::Account;
use crate::model::input_data::InputData;
use crate::model::transaction::Transaction;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default)]
pub struct AccountBalance {
    pub acquired: Decimal,
    pub sent: Decimal,
    pub received: Decimal,
    pub final_balance: Decimal,
}

#[derive(Clone, Debug, Default)]
pub struct BalanceSet {
    balances: BTreeMap<Account, AccountBalance>,
}

impl BalanceSet {
    /// Replays `input_data`'s IN, INTRA, and OUT sets interleaved by
    /// `(timestamp, kind_rank)`, with kind_rank ordering IN < INTRA < OUT
    /// among same-timestamp transactions.
    pub fn replay(input_data: &mut InputData, allow_negative_balances: bool) -> Result<Self> {
        let mut items: Vec<(&Transaction, u8)> = Vec::new();
        for t in input_data.in_transactions.iter() {
            items.push((t, 0));
        }
        for t in input_data.intra_transactions.iter() {
            items.push((t, 1));
        }
        for t in input_data.out_transactions.iter() {
            items.push((t, 2));
        }
        items.sort_by_key(|(t, kind_rank)| (t.timestamp(), *kind_rank));

        let mut balances: BTreeMap<Account, AccountBalance> = BTreeMap::new();

        for (transaction, _) in items {
            match transaction {
                Transaction::In(tx) => {
                    let balance = balances.entry(tx.account.clone()).or_default();
                    balance.acquired += tx.crypto_in;
                    balance.final_balance += tx.crypto_in;
                }
                Transaction::Out(tx) => {
                    let spent = tx.crypto_out_no_fee + tx.crypto_fee;
                    let balance = balances.entry(tx.account.clone()).or_default();
                    balance.sent += spent;
                    balance.final_balance -= spent;

                    Self::check_non_negative(
                        &tx.account,
                        balance,
                        tx.id(),
                        tx.timestamp,
                        allow_negative_balances,
                    )?;
                }
                Transaction::Intra(tx) => {
                    let from_balance = balances.entry(tx.from_account.clone()).or_default();
                    from_balance.sent += tx.crypto_sent;
                    from_balance.final_balance -= tx.crypto_sent;

                    Self::check_non_negative(
                        &tx.from_account,
                        from_balance,
                        tx.id(),
                        tx.timestamp,
                        allow_negative_balances,
                    )?;

                    let to_balance = balances.entry(tx.to_account.clone()).or_default();
                    to_balance.received += tx.crypto_received;
                    to_balance.final_balance += tx.crypto_received;
                }
            }
        }

        Ok(Self { balances })
    }

    fn check_non_negative(
        account: &Account,
        balance: &AccountBalance,
        transaction_id: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
        allow_negative_balances: bool,
    ) -> Result<()> {
        if !allow_negative_balances
            && balance.final_balance.is_sign_negative()
            && !balance.final_balance.is_zero_within_crypto_precision()
        {
            return Err(BalanceError::NegativeBalance {
                account: account.clone(),
                balance: balance.final_balance.display_crypto(),
                transaction_id,
                timestamp,
            }
            .into());
        }
        Ok(())
    }

    /// Accounts sorted lexicographically by `"exchange_holder"`.
    pub fn accounts_sorted(&self) -> Vec<(&Account, &AccountBalance)> {
        let mut entries: Vec<_> = self.balances.iter().collect();
        entries.sort_by_key(|(account, _)| account.sort_key());
        entries
    }

    pub fn get(&self, account: &Account) -> Option<&AccountBalance> {
        self.balances.get(account)
    }

    pub fn total_final(&self) -> Decimal {
        self.balances.values().map(|b| b.final_balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::transaction::{InKind, InTransaction, IntraTransaction, OutKind, OutTransaction};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn conserves_crypto_across_accounts() {
        let mut data = InputData::new("BTC");
        data.add(Transaction::In(
            InTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
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
            .unwrap(),
        ))
        .unwrap();

        data.add(Transaction::Intra(
            IntraTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(),
                Account::new("kraken", "alice"),
                Account::new("ledger", "alice"),
                Decimal::from(10000),
                Decimal::from(dec!(0.4)),
                Decimal::from(dec!(0.39)),
                None,
                None,
            )
            .unwrap(),
        ))
        .unwrap();

        let balances = BalanceSet::replay(&mut data, false).unwrap();

        let kraken = balances.get(&Account::new("kraken", "alice")).unwrap();
        assert_eq!(kraken.final_balance, Decimal::from(dec!(0.6)));

        let ledger = balances.get(&Account::new("ledger", "alice")).unwrap();
        assert_eq!(ledger.final_balance, Decimal::from(dec!(0.39)));

        assert_eq!(balances.total_final(), Decimal::from(dec!(0.99)));
    }

    #[test]
    fn negative_balance_is_rejected_by_default() {
        let mut data = InputData::new("BTC");
        data.add(Transaction::In(
            InTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
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
            .unwrap(),
        ))
        .unwrap();

        data.add(Transaction::Out(
            OutTransaction::new(
                "BTC",
                Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap(),
                Account::new("kraken", "alice"),
                OutKind::Sell,
                Decimal::from(10000),
                Decimal::from(dec!(2)),
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

        let err = BalanceSet::replay(&mut data, false).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Balance(BalanceError::NegativeBalance { .. })
        ));
    }
}
