//! Page-based pagination parameters and result envelopes.

use serde::{Deserialize, Serialize};

/// Maximum page size accepted from clients.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default page size when none is given.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A 1-based page request.
///
/// Invalid values are clamped rather than rejected: `page` is at least 1 and
/// `page_size` is between 1 and [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a page request, clamping out-of-range values.
    #[must_use]
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }.clamped()
    }

    /// Returns a copy with `page` and `page_size` forced into range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// 0-based page index for offset arithmetic.
    #[must_use]
    pub fn index(self) -> u64 {
        self.clamped().page - 1
    }

    /// Row offset of the first item on this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        let clamped = self.clamped();
        clamped.index() * clamped.page_size
    }
}

/// A page of results with navigation metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Total number of matching items across all pages.
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Assemble a page from fetched items and a total count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        let request = request.clamped();
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_count,
            total_pages: total_count.div_ceil(request.page_size),
        }
    }

    /// Map the items of this page, keeping the metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);

        let req = PageRequest::new(3, 500);
        assert_eq!(req.page, 3);
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        let page = Paginated::new(vec![1, 2, 3], PageRequest::new(1, 10), 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 23);

        let empty: Paginated<i32> = Paginated::new(vec![], PageRequest::new(1, 10), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Paginated::new(vec![1, 2], PageRequest::new(2, 2), 5);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.page, 2);
        assert_eq!(mapped.total_count, 5);
    }

    #[test]
    fn test_deserialize_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, DEFAULT_PAGE_SIZE);
    }
}
