//! An ordered, append-only collection of transactions of one kind, for one
//! asset. Mirrors the FIFO-backed collections elsewhere in this crate; the
//! set sorts itself into chronological order the first time it is read,
//! after which further `add()` calls are rejected (see
//! [`crate::error::TransactionError::SetFinalized`]) rather than silently
//! resorting behind the caller's back.
use crate::error::{Result, TransactionError};
use crate::model::transaction::Transaction;
use crate::util::fifo::FIFO;
use crate::util::year_ext::GetYear;
use std::collections::{BTreeSet, HashSet};

impl GetYear for Transaction {
    fn get_year(&self) -> i32 {
        use chrono::Datelike;
        self.timestamp().year()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionSet {
    items: FIFO<Transaction>,
    ids: HashSet<u64>,
    asset: Option<String>,
    finalized: bool,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transaction, rejecting duplicate ids, mixed assets, and any
    /// add attempted after the set has already been read once.
    pub fn add(&mut self, transaction: Transaction) -> Result<()> {
        if self.finalized {
            return Err(TransactionError::SetFinalized.into());
        }

        if !self.ids.insert(transaction.id()) {
            return Err(TransactionError::DuplicateId(transaction.id()).into());
        }

        match &self.asset {
            None => self.asset = Some(transaction.asset().to_string()),
            Some(asset) if asset != transaction.asset() => {
                return Err(TransactionError::MixedAsset(
                    asset.clone(),
                    transaction.asset().to_string(),
                )
                .into());
            }
            Some(_) => {}
        }

        self.items.append_back(transaction);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn asset(&self) -> Option<&str> {
        self.asset.as_deref()
    }

    fn ensure_sorted(&mut self) {
        if self.finalized {
            return;
        }

        let mut sorted: Vec<Transaction> = self.items.drain(..).collect();
        sorted.sort_by_key(|t| t.timestamp());
        self.items = sorted.into_iter().collect();
        self.finalized = true;
    }

    /// Iterates in chronological order, finalizing the set on first call.
    pub fn iter(&mut self) -> impl Iterator<Item = &Transaction> {
        self.ensure_sorted();
        self.items.iter()
    }

    /// A read-only view restricted to transactions whose timestamp falls
    /// within `[from_year, to_year]` inclusive. Never mutates the set.
    pub fn year_range<'a>(
        &'a mut self,
        from_year: i32,
        to_year: i32,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.ensure_sorted();
        self.items
            .iter()
            .filter(move |t| (from_year..=to_year).contains(&t.get_year()))
    }

    /// The distinct years present among this set's transactions.
    pub fn years(&mut self) -> BTreeSet<i32> {
        self.ensure_sorted();
        self.items.iter().map(|t| t.get_year()).collect()
    }
}
