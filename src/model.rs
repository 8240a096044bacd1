pub mod account;
pub mod input_data;
pub mod transaction;
pub mod transaction_set;

pub use account::Account;
pub use input_data::InputData;
pub use transaction::{Fee, InKind, InTransaction, IntraTransaction, OutKind, OutTransaction, Transaction};
pub use transaction_set::TransactionSet;
