//! Prices in integer minor currency units.
//!
//! The shop runs a single currency, so a price is just a non-negative count
//! of the smallest unit (cents). Line totals are computed with
//! [`Price::times`] and summed with [`Price::total`]; both fail with
//! [`PriceError::Overflow`] instead of wrapping or clamping.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(i64),

    /// A line or cart total does not fit in an `i64`.
    #[error("price total is too large")]
    Overflow,
}

/// A non-negative amount in minor currency units.
///
/// ## Examples
///
/// ```
/// use corner_shop_core::{Price, Quantity};
///
/// let unit = Price::from_minor(500).unwrap();
/// let two = Quantity::new(2).unwrap();
/// assert_eq!(unit.times(two).unwrap().minor_units(), 1000);
///
/// assert!(Price::from_minor(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i64);

impl Price {
    /// A price of nothing.
    pub const ZERO: Self = Self(0);

    /// Create a price from an amount in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub const fn from_minor(amount: i64) -> Result<Self, PriceError> {
        if amount < 0 {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn times(self, quantity: Quantity) -> Result<Self, PriceError> {
        self.0
            .checked_mul(i64::from(quantity.get()))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Sum of two prices.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the sum does not fit.
    pub const fn checked_add(self, rhs: Self) -> Result<Self, PriceError> {
        match self.0.checked_add(rhs.0) {
            Some(amount) => Ok(Self(amount)),
            None => Err(PriceError::Overflow),
        }
    }

    /// Sum of `prices`, zero when empty.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the running sum does not fit.
    pub fn total<I>(prices: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = Self>,
    {
        prices.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::from_minor(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_minor(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
