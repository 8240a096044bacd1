//! Error taxonomy for the core engine, grouped by kind rather than by origin.
use crate::model::account::Account;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top level error, grouping the engine's fallible layers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    #[error("transaction error")]
    Transaction(#[from] TransactionError),

    #[error("accounting error")]
    Accounting(#[from] AccountingError),

    #[error("balance error")]
    Balance(#[from] BalanceError),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl error_iter::ErrorIter for Error {}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unrecognized asset {0:?}")]
    UnknownAsset(String),

    #[error("long-term holding period must be non-negative, got {0}")]
    NegativeLongTermPeriod(i64),

    #[error("accepted accounting methods must be non-empty")]
    EmptyAcceptedMethods,

    #[error("default accounting method {0:?} is not among the accepted methods {1:?}")]
    DefaultMethodNotAccepted(String, Vec<String>),

    #[error("no accounting method configured for year {0} or earlier")]
    NoMethodForYear(i32),
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("{asset}: spot price must be positive, got {spot_price}")]
    NonPositiveSpotPrice { asset: String, spot_price: String },

    #[error("{asset} at {timestamp}: crypto-in must be positive, got {amount}")]
    NonPositiveCryptoIn {
        asset: String,
        timestamp: DateTime<Utc>,
        amount: String,
    },

    #[error(
        "{asset} at {timestamp}: crypto-received ({received}) exceeds crypto-sent ({sent})"
    )]
    IntraReceivedExceedsSent {
        asset: String,
        timestamp: DateTime<Utc>,
        sent: String,
        received: String,
    },

    #[error("{asset} at {timestamp}: fee-type OUT transaction must carry zero crypto-out-no-fee")]
    FeeTransactionWithDisposal {
        asset: String,
        timestamp: DateTime<Utc>,
    },

    #[error("{asset} at {timestamp}: crypto-fee must be non-negative, got {amount}")]
    NegativeCryptoFee {
        asset: String,
        timestamp: DateTime<Utc>,
        amount: String,
    },

    #[error("{asset} at {timestamp}: fee-type OUT transaction must carry a positive crypto-fee, got {amount}")]
    NonPositiveFeeForFeeTransaction {
        asset: String,
        timestamp: DateTime<Utc>,
        amount: String,
    },

    #[error("{asset} at {timestamp}: crypto-received must be non-negative, got {amount}")]
    NegativeCryptoReceived {
        asset: String,
        timestamp: DateTime<Utc>,
        amount: String,
    },

    #[error("duplicate transaction id {0} inserted into a transaction set")]
    DuplicateId(u64),

    #[error("transaction set mixes assets {0:?} and {1:?}")]
    MixedAsset(String, String),

    #[error("cannot add to a transaction set that has already been read")]
    SetFinalized,
}

#[derive(Debug, Error)]
pub enum AccountingError {
    #[error("taxable event {0} is not marked taxable")]
    EventNotTaxable(u64),

    #[error("earn-typed taxable event {0} was paired with an acquired lot")]
    EarnEventWithLot(u64),

    #[error("non-earn taxable event {0} has no acquired lot")]
    MissingAcquiredLot(u64),

    #[error("acquired lot {lot} timestamp {lot_time} is after taxable event {event} timestamp {event_time}")]
    LotAfterEvent {
        lot: u64,
        lot_time: DateTime<Utc>,
        event: u64,
        event_time: DateTime<Utc>,
    },

    #[error("accounting engine initialized with no acquired lots")]
    NoAcquiredLots,

    #[error("acquired lots exhausted: insufficient cost basis to cover taxable dispositions for asset {asset}")]
    AcquiredLotsExhausted { asset: String },
}

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error(
        "account {account:?} balance went negative ({balance}) after transaction {transaction_id} at {timestamp}"
    )]
    NegativeBalance {
        account: Account,
        balance: String,
        transaction_id: u64,
        timestamp: DateTime<Utc>,
    },
}
