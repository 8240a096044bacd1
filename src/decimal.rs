//! Fixed-precision decimal value with quantized comparisons.
//!
//! Two [`Decimal`]s compare equal if their difference, quantized to
//! [`CRYPTO_MASK`], rounds to zero. This makes chains of multiply/divide
//! arithmetic (cost-basis fractions, weighted averages) compare sanely
//! despite trailing-digit noise, while still being exact enough to
//! distinguish a genuine one-satoshi discrepancy.
use rust_decimal::Decimal as Inner;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Quantization mask used for crypto-denominated equality checks (1e-13).
pub const CRYPTO_MASK: Inner = dec!(0.0000000000001);

/// Quantization mask used for fiat-denominated equality checks (1e-2).
pub const FIAT_MASK: Inner = dec!(0.01);

/// Display precision for amounts denominated in a cryptocurrency.
const CRYPTO_DISPLAY_DP: u32 = 8;

/// Display precision for amounts denominated in a fiat currency.
const FIAT_DISPLAY_DP: u32 = 2;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct Decimal(Inner);

impl Decimal {
    pub const ZERO: Decimal = Decimal(Inner::ZERO);

    pub fn new(inner: Inner) -> Self {
        Self(inner)
    }

    pub fn inner(&self) -> Inner {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_sign_negative(&self) -> bool {
        self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Format at crypto precision (8 decimal places).
    pub fn display_crypto(&self) -> String {
        self.0.round_dp(CRYPTO_DISPLAY_DP).normalize().to_string()
    }

    /// Format at fiat precision (2 decimal places).
    pub fn display_fiat(&self) -> String {
        self.0.round_dp(FIAT_DISPLAY_DP).to_string()
    }

    /// `true` if `self - other`, quantized to `mask`, is zero.
    pub fn is_equal_within_precision(&self, other: &Self, mask: Inner) -> bool {
        let diff = (self.0 - other.0).round_dp(mask.scale());
        diff.is_zero()
    }

    pub fn is_zero_within_crypto_precision(&self) -> bool {
        self.is_equal_within_precision(&Self::ZERO, CRYPTO_MASK)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Inner::from_str(s)?))
    }
}

impl From<Inner> for Decimal {
    fn from(inner: Inner) -> Self {
        Self(inner)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self(Inner::from(value))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident) => {
        impl $trait for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                Decimal(self.0.$method(rhs.0))
            }
        }

        impl $trait<&Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &Decimal) -> Decimal {
                Decimal(self.0.$method(rhs.0))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);

impl AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.0 -= rhs.0;
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, Add::add)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_within_precision(other, CRYPTO_MASK)
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.eq(other) {
            std::cmp::Ordering::Equal
        } else {
            self.0.cmp(&other.0)
        }
    }
}
