//! The transaction model. Where the original design used an inheritance
//! hierarchy (abstract entry/transaction, with IN/OUT/INTRA subclasses),
//! this is a tagged union: one shared identity/asset/timestamp header and
//! a per-kind payload, with "virtual" methods becoming match arms.
use crate::decimal::{Decimal, FIAT_MASK};
use crate::error::{Result, TransactionError};
use crate::model::account::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Assigns a process-stable identity to a transaction that wasn't given an
/// explicit one. Equality and hashing of transactions is always by id.
fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub enum InKind {
    Buy,
    Gift,
    Donate,
    Airdrop,
    Hardfork,
    Income,
    Interest,
    Mining,
    Staking,
    Wages,
}

impl InKind {
    /// Earn-like acquisitions are immediately taxable as income at receipt.
    pub fn is_earn(&self) -> bool {
        matches!(
            self,
            Self::Airdrop
                | Self::Hardfork
                | Self::Income
                | Self::Interest
                | Self::Mining
                | Self::Staking
                | Self::Wages
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub enum OutKind {
    Sell,
    Gift,
    Donate,
    Fee,
}

/// Unifies `InKind`/`OutKind`/the implicit INTRA transfer kind into one type
/// a caller can group by, independent of which transaction variant it came
/// from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub enum TransactionKind {
    In(InKind),
    Out(OutKind),
    Intra,
}

/// An IN transaction's fee is given in exactly one denomination.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub enum Fee {
    Crypto(Decimal),
    Fiat(Decimal),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InTransaction {
    id: u64,
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub account: Account,
    pub kind: InKind,
    pub spot_price: Decimal,
    pub crypto_in: Decimal,
    pub fee: Option<Fee>,
    fiat_in_no_fee: Decimal,
    fiat_in_with_fee: Decimal,
    pub unique_id: Option<String>,
    pub notes: Option<String>,
}

impl InTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        asset: impl Into<String>,
        timestamp: DateTime<Utc>,
        account: Account,
        kind: InKind,
        spot_price: Decimal,
        crypto_in: Decimal,
        fee: Option<Fee>,
        fiat_in_no_fee_override: Option<Decimal>,
        fiat_in_with_fee_override: Option<Decimal>,
        unique_id: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        let asset = asset.into();

        if spot_price <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveSpotPrice {
                asset,
                spot_price: spot_price.to_string(),
            }
            .into());
        }

        if crypto_in <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveCryptoIn {
                asset,
                timestamp,
                amount: crypto_in.to_string(),
            }
            .into());
        }

        let fiat_fee_amount = match fee {
            Some(Fee::Fiat(f)) => f,
            Some(Fee::Crypto(c)) => c * spot_price,
            None => Decimal::ZERO,
        };

        let computed_fiat_in_no_fee = crypto_in * spot_price;
        let fiat_in_no_fee = fiat_in_no_fee_override.unwrap_or(computed_fiat_in_no_fee);
        if fiat_in_no_fee_override.is_some()
            && !fiat_in_no_fee.is_equal_within_precision(&computed_fiat_in_no_fee, FIAT_MASK)
        {
            tracing::warn!(
                asset = %asset,
                timestamp = %timestamp,
                provided = %fiat_in_no_fee,
                computed = %computed_fiat_in_no_fee,
                "fiat_in_no_fee provided by exchange disagrees with crypto_in * spot_price",
            );
        }

        let computed_fiat_in_with_fee = fiat_in_no_fee + fiat_fee_amount;
        let fiat_in_with_fee = fiat_in_with_fee_override.unwrap_or(computed_fiat_in_with_fee);
        if fiat_in_with_fee_override.is_some()
            && !fiat_in_with_fee.is_equal_within_precision(&computed_fiat_in_with_fee, FIAT_MASK)
        {
            tracing::warn!(
                asset = %asset,
                timestamp = %timestamp,
                provided = %fiat_in_with_fee,
                computed = %computed_fiat_in_with_fee,
                "fiat_in_with_fee provided by exchange disagrees with fiat_in_no_fee + fee",
            );
        }

        Ok(Self {
            id: next_id(),
            asset,
            timestamp,
            account,
            kind,
            spot_price,
            crypto_in,
            fee,
            fiat_in_no_fee,
            fiat_in_with_fee,
            unique_id,
            notes,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn fiat_in_no_fee(&self) -> Decimal {
        self.fiat_in_no_fee
    }

    pub fn fiat_in_with_fee(&self) -> Decimal {
        self.fiat_in_with_fee
    }

    pub fn is_taxable(&self) -> bool {
        self.kind.is_earn()
    }

    /// The full crypto quantity this lot can supply as cost basis, or the
    /// full amount of income recognized if earn-typed.
    pub fn crypto_balance_change(&self) -> Decimal {
        self.crypto_in
    }

    pub fn fiat_taxable_amount(&self) -> Decimal {
        self.fiat_in_with_fee
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutTransaction {
    id: u64,
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub account: Account,
    pub kind: OutKind,
    pub spot_price: Decimal,
    pub crypto_out_no_fee: Decimal,
    pub crypto_fee: Decimal,
    crypto_out_with_fee: Decimal,
    fiat_out_no_fee: Decimal,
    fiat_fee: Decimal,
    pub unique_id: Option<String>,
    pub notes: Option<String>,
}

impl OutTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        asset: impl Into<String>,
        timestamp: DateTime<Utc>,
        account: Account,
        kind: OutKind,
        spot_price: Decimal,
        crypto_out_no_fee: Decimal,
        crypto_fee: Decimal,
        crypto_out_with_fee_override: Option<Decimal>,
        fiat_out_no_fee_override: Option<Decimal>,
        fiat_fee_override: Option<Decimal>,
        unique_id: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        let asset = asset.into();
        let is_fee_only = matches!(kind, OutKind::Fee);

        if !is_fee_only && spot_price <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveSpotPrice {
                asset,
                spot_price: spot_price.to_string(),
            }
            .into());
        }

        if is_fee_only && crypto_out_no_fee != Decimal::ZERO {
            return Err(TransactionError::FeeTransactionWithDisposal { asset, timestamp }.into());
        }

        if !is_fee_only && crypto_out_no_fee <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveCryptoIn {
                asset,
                timestamp,
                amount: crypto_out_no_fee.to_string(),
            }
            .into());
        }

        if crypto_fee < Decimal::ZERO {
            return Err(TransactionError::NegativeCryptoFee {
                asset,
                timestamp,
                amount: crypto_fee.to_string(),
            }
            .into());
        }

        if is_fee_only && crypto_fee <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveFeeForFeeTransaction {
                asset,
                timestamp,
                amount: crypto_fee.to_string(),
            }
            .into());
        }

        let computed_crypto_out_with_fee = crypto_out_no_fee + crypto_fee;
        let crypto_out_with_fee =
            crypto_out_with_fee_override.unwrap_or(computed_crypto_out_with_fee);
        if crypto_out_with_fee_override.is_some()
            && !crypto_out_with_fee
                .is_equal_within_precision(&computed_crypto_out_with_fee, FIAT_MASK)
        {
            tracing::warn!(
                asset = %asset,
                timestamp = %timestamp,
                provided = %crypto_out_with_fee,
                computed = %computed_crypto_out_with_fee,
                "crypto_out_with_fee provided by exchange disagrees with crypto_out_no_fee + crypto_fee",
            );
        }

        let computed_fiat_out_no_fee = crypto_out_no_fee * spot_price;
        let fiat_out_no_fee = fiat_out_no_fee_override.unwrap_or(computed_fiat_out_no_fee);
        if fiat_out_no_fee_override.is_some()
            && !fiat_out_no_fee.is_equal_within_precision(&computed_fiat_out_no_fee, FIAT_MASK)
        {
            tracing::warn!(
                asset = %asset,
                timestamp = %timestamp,
                provided = %fiat_out_no_fee,
                computed = %computed_fiat_out_no_fee,
                "fiat_out_no_fee provided by exchange disagrees with crypto_out_no_fee * spot_price",
            );
        }

        let computed_fiat_fee = crypto_fee * spot_price;
        let fiat_fee = fiat_fee_override.unwrap_or(computed_fiat_fee);
        if fiat_fee_override.is_some()
            && !fiat_fee.is_equal_within_precision(&computed_fiat_fee, FIAT_MASK)
        {
            tracing::warn!(
                asset = %asset,
                timestamp = %timestamp,
                provided = %fiat_fee,
                computed = %computed_fiat_fee,
                "fiat_fee provided by exchange disagrees with crypto_fee * spot_price",
            );
        }

        Ok(Self {
            id: next_id(),
            asset,
            timestamp,
            account,
            kind,
            spot_price,
            crypto_out_no_fee,
            crypto_fee,
            crypto_out_with_fee,
            fiat_out_no_fee,
            fiat_fee,
            unique_id,
            notes,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn crypto_out_with_fee(&self) -> Decimal {
        self.crypto_out_with_fee
    }

    pub fn fiat_out_no_fee(&self) -> Decimal {
        self.fiat_out_no_fee
    }

    pub fn fiat_fee(&self) -> Decimal {
        self.fiat_fee
    }

    pub fn is_taxable(&self) -> bool {
        true
    }

    pub fn crypto_balance_change(&self) -> Decimal {
        self.crypto_out_no_fee
    }

    pub fn fiat_taxable_amount(&self) -> Decimal {
        self.fiat_out_no_fee
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IntraTransaction {
    id: u64,
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub from_account: Account,
    pub to_account: Account,
    pub spot_price: Decimal,
    pub crypto_sent: Decimal,
    pub crypto_received: Decimal,
    crypto_fee: Decimal,
    fiat_fee: Decimal,
    pub unique_id: Option<String>,
    pub notes: Option<String>,
}

impl IntraTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        asset: impl Into<String>,
        timestamp: DateTime<Utc>,
        from_account: Account,
        to_account: Account,
        spot_price: Decimal,
        crypto_sent: Decimal,
        crypto_received: Decimal,
        unique_id: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        let asset = asset.into();

        if crypto_sent <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveCryptoIn {
                asset,
                timestamp,
                amount: crypto_sent.to_string(),
            }
            .into());
        }

        if crypto_received < Decimal::ZERO {
            return Err(TransactionError::NegativeCryptoReceived {
                asset,
                timestamp,
                amount: crypto_received.to_string(),
            }
            .into());
        }

        if crypto_received > crypto_sent {
            return Err(TransactionError::IntraReceivedExceedsSent {
                asset,
                timestamp,
                sent: crypto_sent.to_string(),
                received: crypto_received.to_string(),
            }
            .into());
        }

        let crypto_fee = crypto_sent - crypto_received;

        if spot_price <= Decimal::ZERO && !crypto_fee.is_zero_within_crypto_precision() {
            return Err(TransactionError::NonPositiveSpotPrice {
                asset,
                spot_price: spot_price.to_string(),
            }
            .into());
        }

        let fiat_fee = crypto_fee * spot_price;

        Ok(Self {
            id: next_id(),
            asset,
            timestamp,
            from_account,
            to_account,
            spot_price,
            crypto_sent,
            crypto_received,
            crypto_fee,
            fiat_fee,
            unique_id,
            notes,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn crypto_fee(&self) -> Decimal {
        self.crypto_fee
    }

    pub fn fiat_fee(&self) -> Decimal {
        self.fiat_fee
    }

    pub fn is_taxable(&self) -> bool {
        self.fiat_fee > Decimal::ZERO
    }

    pub fn crypto_balance_change(&self) -> Decimal {
        self.crypto_fee
    }

    pub fn fiat_taxable_amount(&self) -> Decimal {
        self.fiat_fee
    }
}

/// A single transaction, tagged by kind. Transactions are immutable value
/// types once constructed; sets own them, records only reference their
/// identity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Transaction {
    In(InTransaction),
    Out(OutTransaction),
    Intra(IntraTransaction),
}

impl Transaction {
    pub fn id(&self) -> u64 {
        match self {
            Self::In(t) => t.id(),
            Self::Out(t) => t.id(),
            Self::Intra(t) => t.id(),
        }
    }

    pub fn asset(&self) -> &str {
        match self {
            Self::In(t) => &t.asset,
            Self::Out(t) => &t.asset,
            Self::Intra(t) => &t.asset,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::In(t) => t.timestamp,
            Self::Out(t) => t.timestamp,
            Self::Intra(t) => t.timestamp,
        }
    }

    pub fn is_taxable(&self) -> bool {
        match self {
            Self::In(t) => t.is_taxable(),
            Self::Out(t) => t.is_taxable(),
            Self::Intra(t) => t.is_taxable(),
        }
    }

    pub fn is_earn(&self) -> bool {
        matches!(self, Self::In(t) if t.kind.is_earn())
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::In(t) => TransactionKind::In(t.kind),
            Self::Out(t) => TransactionKind::Out(t.kind),
            Self::Intra(_) => TransactionKind::Intra,
        }
    }

    pub fn crypto_balance_change(&self) -> Decimal {
        match self {
            Self::In(t) => t.crypto_balance_change(),
            Self::Out(t) => t.crypto_balance_change(),
            Self::Intra(t) => t.crypto_balance_change(),
        }
    }

    pub fn fiat_taxable_amount(&self) -> Decimal {
        match self {
            Self::In(t) => t.fiat_taxable_amount(),
            Self::Out(t) => t.fiat_taxable_amount(),
            Self::Intra(t) => t.fiat_taxable_amount(),
        }
    }

    pub fn as_in(&self) -> Option<&InTransaction> {
        match self {
            Self::In(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Transaction {}

impl std::hash::Hash for Transaction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
