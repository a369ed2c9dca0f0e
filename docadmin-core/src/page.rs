//! Offset pagination for document listings.
//!
//! [`PageParams`] describes the requested window and [`Page`] carries one window
//! of results together with the total match count.

use serde::{Deserialize, Serialize};

/// Default number of documents per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Hard upper bound on documents per listing page.
pub const MAX_PAGE_SIZE: usize = 200;

/// A single page of results.
///
/// Serializes as `{"documents": [...], "total": n, "skip": n, "limit": n}`.
///
/// # Example
///
/// ```ignore
/// use docadmin_core::page::Page;
///
/// let page = Page::builder(vec!["a", "b"])
///     .with_total(12)
///     .with_skip(0)
///     .with_limit(2)
///     .build();
///
/// assert!(page.has_more());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items contained in this page.
    #[serde(rename = "documents")]
    pub items: Vec<T>,
    /// Number of items matching the listing across all pages.
    pub total: u64,
    /// Number of items skipped before this page.
    pub skip: usize,
    /// Maximum number of items this page could hold.
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }

    /// Returns `true` if items remain after this page.
    pub fn has_more(&self) -> bool {
        ((self.skip + self.items.len()) as u64) < self.total
    }

    /// Transforms every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Builder for [`Page`] values.
pub struct PageBuilder<T> {
    page: Page<T>,
}

impl<T> PageBuilder<T> {
    pub fn new(items: Vec<T>) -> Self {
        let limit = items.len();
        Self {
            page: Page { items, total: 0, skip: 0, limit },
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.page.total = total;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.page.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.page.limit = limit;
        self
    }

    pub fn build(self) -> Page<T> {
        self.page
    }
}

/// A requested listing window.
///
/// `limit` is capped at construction, not rejected.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub skip: usize,
    pub limit: usize,
}

impl PageParams {
    /// Creates a window, capping `limit` at [`MAX_PAGE_SIZE`].
    pub fn new(skip: usize, limit: usize) -> Self {
        Self::with_max(skip, limit, MAX_PAGE_SIZE)
    }

    /// Creates a window, capping `limit` at `max`. A zero limit becomes one.
    pub fn with_max(skip: usize, limit: usize, max: usize) -> Self {
        Self {
            skip,
            limit: limit.clamp(1, max.max(1)),
        }
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(PageParams::new(0, 1000).limit, MAX_PAGE_SIZE);
        assert_eq!(PageParams::new(0, 0).limit, 1);
        assert_eq!(PageParams::with_max(5, 50, 20), PageParams { skip: 5, limit: 20 });
    }

    #[test]
    fn test_has_more() {
        let page = Page::builder(vec![1, 2]).with_total(5).with_skip(2).with_limit(2).build();
        assert!(page.has_more());

        let last = Page::builder(vec![5]).with_total(5).with_skip(4).with_limit(2).build();
        assert!(!last.has_more());
    }

    #[test]
    fn test_page_serializes_items_as_documents() {
        let page = Page::builder(vec!["a"]).with_total(1).build();
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["documents"], serde_json::json!(["a"]));
        assert_eq!(json["total"], 1);
        assert_eq!(json["limit"], 1);
    }
}
