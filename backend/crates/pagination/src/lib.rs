//! Offset pagination primitives shared by zone-api list endpoints.
//!
//! Clients send raw `count` and `start` query parameters. A [`PageQuery`]
//! captures them as submitted, and [`PageQuery::resolve`] clamps them against
//! operator-configured [`PageBounds`] so adapters only ever see an in-range
//! [`PageRequest`].
//!
//! ```
//! use pagination::{PageBounds, PageQuery};
//!
//! let query = PageQuery { count: Some(999), start: Some(-4) };
//! let page = query.resolve(PageBounds::default());
//! assert_eq!(page.count(), 10);
//! assert_eq!(page.start(), 0);
//! ```

use serde::{Deserialize, Serialize};

/// Page size used when the client omits `count` or sends a value below one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound applied to `count` unless the operator configures another.
pub const MAX_PAGE_SIZE: u32 = 10;

/// Errors raised when page bounds are configured inconsistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageBoundsError {
    /// The maximum page size must allow at least one item.
    #[error("maximum page size must be at least 1")]
    ZeroMaximum,
    /// The default page size must lie within `1..=max`.
    #[error("default page size {default} must be between 1 and {max}")]
    DefaultOutOfRange {
        /// Requested default page size.
        default: u32,
        /// Configured maximum page size.
        max: u32,
    },
}

/// Operator-tunable limits for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    default_count: u32,
    max_count: u32,
}

impl PageBounds {
    /// Validate and build a new set of bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PageBoundsError`] when `max_count` is zero or `default_count`
    /// falls outside `1..=max_count`.
    pub const fn new(default_count: u32, max_count: u32) -> Result<Self, PageBoundsError> {
        if max_count == 0 {
            return Err(PageBoundsError::ZeroMaximum);
        }
        if default_count == 0 || default_count > max_count {
            return Err(PageBoundsError::DefaultOutOfRange {
                default: default_count,
                max: max_count,
            });
        }
        Ok(Self {
            default_count,
            max_count,
        })
    }

    /// Page size used when the client does not supply a usable `count`.
    #[must_use]
    pub const fn default_count(&self) -> u32 {
        self.default_count
    }

    /// Largest page size a client may request.
    #[must_use]
    pub const fn max_count(&self) -> u32 {
        self.max_count
    }
}

impl Default for PageBounds {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_PAGE_SIZE,
            max_count: MAX_PAGE_SIZE,
        }
    }
}

/// Raw `count`/`start` query parameters as submitted by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// Requested number of items.
    pub count: Option<i64>,
    /// Requested zero-based offset.
    pub start: Option<i64>,
}

impl PageQuery {
    /// Clamp the submitted values into a [`PageRequest`].
    ///
    /// `count` above the maximum is clamped to the maximum; a missing or
    /// non-positive `count` falls back to the default. A missing or negative
    /// `start` becomes zero.
    #[must_use]
    pub fn resolve(self, bounds: PageBounds) -> PageRequest {
        let count = match self.count {
            Some(count) if count > i64::from(bounds.max_count) => bounds.max_count,
            Some(count) if count >= 1 => u32::try_from(count).unwrap_or(bounds.max_count),
            _ => bounds.default_count,
        };
        let start = self
            .start
            .and_then(|start| u64::try_from(start).ok())
            .unwrap_or(0);
        PageRequest { start, count }
    }
}

/// In-range offset and page size handed to persistence adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    start: u64,
    count: u32,
}

impl PageRequest {
    /// First page using the supplied bounds' default size.
    #[must_use]
    pub const fn first(bounds: PageBounds) -> Self {
        Self {
            start: 0,
            count: bounds.default_count,
        }
    }

    /// Zero-based offset of the first item.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Offset as a signed SQL `OFFSET` value, saturating on overflow.
    #[must_use]
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.start).unwrap_or(i64::MAX)
    }

    /// Page size as a signed SQL `LIMIT` value.
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.count)
    }

    /// Apply the window to an in-memory sequence.
    pub fn take_page<I>(&self, items: I) -> Vec<I::Item>
    where
        I: IntoIterator,
    {
        let skip = usize::try_from(self.start).unwrap_or(usize::MAX);
        let take = usize::try_from(self.count).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Clamping behaviour for page queries.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 10)]
    #[case(Some(0), 10)]
    #[case(Some(-3), 10)]
    #[case(Some(1), 1)]
    #[case(Some(7), 7)]
    #[case(Some(10), 10)]
    #[case(Some(11), 10)]
    #[case(Some(999), 10)]
    fn count_is_clamped(#[case] count: Option<i64>, #[case] expected: u32) {
        let page = PageQuery { count, start: None }.resolve(PageBounds::default());
        assert_eq!(page.count(), expected);
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some(-1), 0)]
    #[case(Some(0), 0)]
    #[case(Some(25), 25)]
    fn start_is_clamped(#[case] start: Option<i64>, #[case] expected: u64) {
        let page = PageQuery { count: None, start }.resolve(PageBounds::default());
        assert_eq!(page.start(), expected);
    }

    #[rstest]
    fn custom_bounds_are_honoured() {
        let bounds = PageBounds::new(5, 50).expect("valid bounds");
        let page = PageQuery {
            count: Some(80),
            start: None,
        }
        .resolve(bounds);
        assert_eq!(page.count(), 50);
        assert_eq!(PageQuery::default().resolve(bounds).count(), 5);
    }

    #[rstest]
    #[case(10, 0, PageBoundsError::ZeroMaximum)]
    #[case(0, 10, PageBoundsError::DefaultOutOfRange { default: 0, max: 10 })]
    #[case(20, 10, PageBoundsError::DefaultOutOfRange { default: 20, max: 10 })]
    fn inconsistent_bounds_are_rejected(
        #[case] default_count: u32,
        #[case] max_count: u32,
        #[case] expected: PageBoundsError,
    ) {
        assert_eq!(PageBounds::new(default_count, max_count), Err(expected));
    }

    #[rstest]
    fn take_page_windows_items() {
        let page = PageQuery {
            count: Some(2),
            start: Some(3),
        }
        .resolve(PageBounds::default());
        assert_eq!(page.take_page(0..10), vec![3, 4]);
        assert!(page.take_page(0..2).is_empty());
    }

    #[rstest]
    fn query_deserialises_from_json() {
        let query: PageQuery =
            serde_json::from_str(r#"{"count":3}"#).expect("query deserialises");
        assert_eq!(query.count, Some(3));
        assert_eq!(query.start, None);
    }
}
