use serde::{Deserialize, Serialize};

/// An (exchange, holder) pair. Transactions move crypto between accounts;
/// the balance set (see [`crate::balance`]) is keyed by this type.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Account {
    pub exchange: String,
    pub holder: String,
}

impl Account {
    pub fn new(exchange: impl Into<String>, holder: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            holder: holder.into(),
        }
    }

    /// Sort key used when rendering the balance set: `"exchange_holder"`.
    pub fn sort_key(&self) -> String {
        format!("{}_{}", self.exchange, self.holder)
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.exchange, self.holder)
    }
}
