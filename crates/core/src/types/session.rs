//! Guest session keys.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SessionKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionKeyError {
    /// The key is empty.
    #[error("session key cannot be empty")]
    Empty,
    /// The key is too long.
    #[error("session key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The key contains control characters or whitespace.
    #[error("session key must be printable ASCII without spaces")]
    InvalidCharacter,
}

/// Opaque string identifying a guest's cart across requests.
///
/// There is no authenticated identity behind a session key; whoever presents
/// it owns the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);

impl SessionKey {
    /// Maximum length of a session key.
    pub const MAX_LENGTH: usize = 128;

    /// Key used when a request does not identify its session.
    pub const DEFAULT: &'static str = "default";

    /// Parse a session key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains anything but printable ASCII.
    pub fn parse(s: &str) -> Result<Self, SessionKeyError> {
        if s.is_empty() {
            return Err(SessionKeyError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SessionKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(SessionKeyError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionKey {
    type Error = SessionKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for SessionKey {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SessionKey {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for SessionKey {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key() {
        assert_eq!(SessionKey::default().as_str(), "default");
    }

    #[test]
    fn test_parse() {
        assert!(SessionKey::parse("3f2a-cart-session").is_ok());
        assert_eq!(SessionKey::parse(""), Err(SessionKeyError::Empty));
        assert_eq!(
            SessionKey::parse("has space"),
            Err(SessionKeyError::InvalidCharacter)
        );
        assert!(matches!(
            SessionKey::parse(&"k".repeat(129)),
            Err(SessionKeyError::TooLong { max: 128 })
        ));
    }
}
