//! Page-number pagination for directory listings.

use serde::Serialize;

use super::field_errors::FieldErrors;

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
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
    /// Validate raw query values, applying defaults for missing ones.
    ///
    /// # Errors
    /// Returns field errors for a zero page or an out-of-range page size.
    ///
    /// # Examples
    /// ```
    /// use kpa_backend::domain::PageRequest;
    ///
    /// let page = PageRequest::new(Some(3), None).unwrap();
    /// assert_eq!(page.offset(), 40);
    /// assert!(PageRequest::new(None, Some(500)).is_err());
    /// ```
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let page = page.unwrap_or(1);
        if page == 0 {
            errors.push("page", "Ensure this value is greater than or equal to 1.");
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            errors.push(
                "page_size",
                format!("page_size must be between 1 and {MAX_PAGE_SIZE}"),
            );
        }
        errors.into_result(Self { page, page_size })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows preceding this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

/// One page of results with the overall count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Assemble a page for `request`.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// Transform every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply() {
        let page = PageRequest::new(None, None).expect("defaults");
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), None, "page")]
    #[case(None, Some(0), "page_size")]
    #[case(None, Some(MAX_PAGE_SIZE + 1), "page_size")]
    fn rejects_out_of_range(
        #[case] page: Option<u32>,
        #[case] size: Option<u32>,
        #[case] field: &str,
    ) {
        let errors = PageRequest::new(page, size).expect_err("invalid");
        assert!(errors.contains(field));
    }

    #[rstest]
    fn map_keeps_metadata() {
        let request = PageRequest::new(Some(2), Some(5)).expect("valid");
        let page = Page::new(vec![1, 2], 7, request).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!((page.total, page.page, page.page_size), (7, 2, 5));
    }
}
