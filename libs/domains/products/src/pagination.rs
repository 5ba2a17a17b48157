//! Page/size arithmetic for search results.

use serde::Deserialize;

use crate::error::{ProductError, ProductResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_SIZE: u64 = 10;

/// A 1-based page request. Both fields are positive once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    size: u64,
}

impl Pagination {
    pub fn new(page: u64, size: u64) -> ProductResult<Self> {
        if page == 0 {
            return Err(ProductError::Validation("page must be positive".to_string()));
        }
        if size == 0 {
            return Err(ProductError::Validation("size must be positive".to_string()));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.size)
    }

    pub fn has_more(&self, total_count: u64) -> bool {
        self.page.saturating_mul(self.size) < total_count
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
        }
    }
}

/// `?search=&page=&size=` as received over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl SearchQuery {
    /// Missing values fall back to page 1, size 10. Explicit zeros are rejected.
    pub fn pagination(&self) -> ProductResult<Pagination> {
        Pagination::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.size.unwrap_or(DEFAULT_SIZE),
        )
    }
}
