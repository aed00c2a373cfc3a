//! Page type returned by paged collection fetches
//!
//! The paging algorithm belongs to the collaborator; this type only carries
//! the result and the metadata a client needs to walk the collection.
//!
//! # Example
//!
//! ```rust
//! use acton_rest::handlers::Page;
//!
//! let page = Page::new(vec!["a", "b"], 1, 2, 5);
//! assert_eq!(page.total_pages, 3);
//! assert!(page.has_next);
//! assert!(!page.has_prev);
//!
//! let upper = page.map(|s| s.to_uppercase());
//! assert_eq!(upper.items, vec!["A", "B"]);
//! ```

use serde::{Deserialize, Serialize};

/// One page of a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Page number (1-indexed)
    pub page: i64,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Create a page
    ///
    /// Calculates `total_pages`, `has_next`, and `has_prev`. A `per_page` of
    /// zero is treated as one.
    #[must_use]
    pub fn new(items: Vec<T>, page: i64, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = calculate_total_pages(total, per_page);

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
            has_next: page < i64::from(total_pages),
            has_prev: page > 1,
        }
    }

    /// Create a page for an empty collection
    ///
    /// ```rust
    /// use acton_rest::handlers::Page;
    ///
    /// let page: Page<String> = Page::empty(1, 20);
    /// assert!(page.items.is_empty());
    /// assert_eq!(page.total_pages, 0);
    /// assert!(!page.has_next);
    /// ```
    #[must_use]
    pub fn empty(page: i64, per_page: u32) -> Self {
        Self::new(Vec::new(), page, per_page, 0)
    }

    /// Number of items preceding this page
    ///
    /// ```rust
    /// use acton_rest::handlers::Page;
    ///
    /// assert_eq!(Page::<()>::offset_of(3, 20), 40);
    /// assert_eq!(Page::<()>::offset_of(0, 20), 0);
    /// ```
    #[must_use]
    pub fn offset_of(page: i64, per_page: u32) -> u64 {
        u64::try_from(page.saturating_sub(1))
            .unwrap_or(0)
            .saturating_mul(u64::from(per_page))
    }

    /// Map each item to a new type, keeping the metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Calculate total pages, rounding up
fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page);
    let pages = total.div_ceil(per_page);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let page = Page::new(vec![1, 2, 3], 2, 3, 9);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_last_page() {
        let page = Page::new(vec![7], 3, 3, 7);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_zero_per_page() {
        let page = Page::new(vec![1], 1, 0, 4);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn test_page_past_end() {
        let page: Page<u8> = Page::new(Vec::new(), 10, 5, 12);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        assert_eq!(Page::<()>::offset_of(i64::MAX, u32::MAX), u64::MAX);
        assert_eq!(Page::<()>::offset_of(i64::MAX, 1), (i64::MAX - 1) as u64);
        assert_eq!(Page::<()>::offset_of(i64::MIN, u32::MAX), 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 1, 2, 4).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Page::new(vec!["x"], 1, 10, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": ["x"],
                "page": 1,
                "per_page": 10,
                "total": 1,
                "total_pages": 1,
                "has_next": false,
                "has_prev": false,
            })
        );
    }
}
