//! Offset/limit pagination.

use serde::Deserialize;

/// A page request as sent by clients (`?skip=0&limit=100`).
///
/// Out-of-range values are clamped rather than rejected: a negative `skip`
/// becomes zero and `limit` is held to `1..=Page::MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    skip: i64,
    limit: i64,
}

impl Page {
    /// Largest page a client may ask for.
    pub const MAX_LIMIT: i64 = 100;

    /// Create a page request, clamping both values.
    #[must_use]
    pub const fn new(skip: i64, limit: i64) -> Self {
        let skip = if skip < 0 { 0 } else { skip };
        let limit = if limit < 1 {
            1
        } else if limit > Self::MAX_LIMIT {
            Self::MAX_LIMIT
        } else {
            limit
        };
        Self { skip, limit }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(self) -> i64 {
        Self::new(self.skip, self.limit).skip
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(self) -> i64 {
        Self::new(self.skip, self.limit).limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::MAX_LIMIT)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::default();
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 100);
    }

    #[test]
    fn test_clamps() {
        let page = Page::new(-10, 1_000);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), Page::MAX_LIMIT);
        assert_eq!(Page::new(5, 0).limit(), 1);
    }

    #[test]
    fn test_deserialized_values_are_clamped() {
        let page: Page = serde_json::from_str(r#"{"skip": -1, "limit": 500}"#).unwrap();
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 100);

        let page: Page = serde_json::from_str(r#"{"skip": 20}"#).unwrap();
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 100);
    }
}
