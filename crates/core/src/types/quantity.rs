//! Line-item quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantities are not allowed on a line.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i32),
}

/// A positive number of units on a cart or order line.
///
/// A line with quantity zero does not exist; removing the line is the only
/// way to get rid of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single unit. Used when a request omits the quantity.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] if `n < 1`.
    pub const fn new(n: i32) -> Result<Self, QuantityError> {
        if n < 1 {
            return Err(QuantityError::NotPositive(n));
        }
        Ok(Self(n))
    }

    /// The number of units.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Merge two quantities, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Whether this many units fit within `stock`.
    ///
    /// `None` stock means the product is not stock-tracked.
    #[must_use]
    pub fn fits_within(self, stock: Option<i32>) -> bool {
        stock.is_none_or(|available| self.0 <= available)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let n = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(n)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive(-3)));
        assert_eq!(Quantity::new(1).unwrap(), Quantity::ONE);
    }

    #[test]
    fn test_checked_add() {
        let two = Quantity::new(2).unwrap();
        assert_eq!(two.checked_add(two).unwrap().get(), 4);
        assert!(Quantity::new(i32::MAX).unwrap().checked_add(two).is_none());
    }

    #[test]
    fn test_fits_within_stock() {
        let three = Quantity::new(3).unwrap();
        assert!(three.fits_within(Some(3)));
        assert!(!three.fits_within(Some(2)));
        assert!(!three.fits_within(Some(0)));
        // untracked stock is unlimited
        assert!(three.fits_within(None));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("5").unwrap().get(), 5);
    }
}
