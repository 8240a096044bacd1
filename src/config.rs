//! Caller-constructed, already-validated configuration. The core never
//! parses a configuration file itself; that is a collaborator's job
//! (spreadsheet schema validation, CLI argument parsing). What lives here
//! is the shape of the validated value the engine is parameterized by.
use crate::error::{ConfigurationError, Result};
use std::collections::BTreeSet;

/// The accounting method used to select which acquired lot covers a
/// taxable disposal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AccountingMethodKind {
    Fifo,
    Lifo,
    Hifo,
    Lofo,
    SpecificId,
}

impl AccountingMethodKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lifo => "LIFO",
            Self::Hifo => "HIFO",
            Self::Lofo => "LOFO",
            Self::SpecificId => "SPEC_ID",
        }
    }
}

/// The jurisdiction-specific parameters a country plugin injects into the
/// tax engine: how long an asset must be held to qualify for long-term
/// treatment, and which accounting methods that jurisdiction permits.
#[derive(Clone, Debug)]
pub struct Country {
    pub country_code: String,
    pub fiat_currency_code: String,
    pub long_term_period_days: i64,
    pub default_accounting_method: AccountingMethodKind,
    pub accepted_accounting_methods: BTreeSet<AccountingMethodKind>,
}

impl AccountingMethodKind {
    fn ord_key(&self) -> u8 {
        match self {
            Self::Fifo => 0,
            Self::Lifo => 1,
            Self::Hifo => 2,
            Self::Lofo => 3,
            Self::SpecificId => 4,
        }
    }
}

impl PartialOrd for AccountingMethodKind {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccountingMethodKind {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ord_key().cmp(&other.ord_key())
    }
}

impl Country {
    pub fn new(
        country_code: impl Into<String>,
        fiat_currency_code: impl Into<String>,
        long_term_period_days: i64,
        default_accounting_method: AccountingMethodKind,
        accepted_accounting_methods: BTreeSet<AccountingMethodKind>,
    ) -> Result<Self> {
        if long_term_period_days < 0 {
            return Err(ConfigurationError::NegativeLongTermPeriod(long_term_period_days).into());
        }

        if accepted_accounting_methods.is_empty() {
            return Err(ConfigurationError::EmptyAcceptedMethods.into());
        }

        if !accepted_accounting_methods.contains(&default_accounting_method) {
            return Err(ConfigurationError::DefaultMethodNotAccepted(
                default_accounting_method.name().to_string(),
                accepted_accounting_methods
                    .iter()
                    .map(|m| m.name().to_string())
                    .collect(),
            )
            .into());
        }

        Ok(Self {
            country_code: country_code.into(),
            fiat_currency_code: fiat_currency_code.into(),
            long_term_period_days,
            default_accounting_method,
            accepted_accounting_methods,
        })
    }
}

/// Run-wide configuration, already validated by the caller.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub recognized_assets: BTreeSet<String>,
    pub country: Country,
    /// If `false` (the default), a balance set that would go negative for
    /// any account aborts the run with a [`crate::error::BalanceError`].
    pub allow_negative_balances: bool,
}

impl Configuration {
    pub fn new(recognized_assets: BTreeSet<String>, country: Country) -> Self {
        Self {
            recognized_assets,
            country,
            allow_negative_balances: false,
        }
    }

    pub fn with_allow_negative_balances(mut self, allow: bool) -> Self {
        self.allow_negative_balances = allow;
        self
    }

    pub fn check_asset_known(&self, asset: &str) -> Result<()> {
        if self.recognized_assets.contains(asset) {
            Ok(())
        } else {
            Err(ConfigurationError::UnknownAsset(asset.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods(kinds: &[AccountingMethodKind]) -> BTreeSet<AccountingMethodKind> {
        kinds.iter().copied().collect()
    }

    #[test]
    fn rejects_negative_holding_period() {
        let err = Country::new(
            "US",
            "USD",
            -1,
            AccountingMethodKind::Fifo,
            methods(&[AccountingMethodKind::Fifo]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Configuration(ConfigurationError::NegativeLongTermPeriod(-1))
        ));
    }

    #[test]
    fn rejects_default_method_not_in_accepted_set() {
        let err = Country::new(
            "US",
            "USD",
            365,
            AccountingMethodKind::Lifo,
            methods(&[AccountingMethodKind::Fifo]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Configuration(ConfigurationError::DefaultMethodNotAccepted(..))
        ));
    }

    #[test]
    fn accepts_valid_country() {
        let country = Country::new(
            "US",
            "USD",
            365,
            AccountingMethodKind::Fifo,
            methods(&[AccountingMethodKind::Fifo, AccountingMethodKind::Hifo]),
        )
        .unwrap();
        assert_eq!(country.long_term_period_days, 365);
    }
}
