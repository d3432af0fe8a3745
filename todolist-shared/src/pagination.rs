/// Offset/limit pagination
///
/// Query parameters are parsed leniently: anything that is not a usable
/// number falls back to the default instead of failing the request.
///
/// - `page`: 1-based, default 1
/// - `pageSize`: 1..=100, default 10

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Creates a page request, replacing out-of-range values with defaults
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: if page >= 1 { page } else { DEFAULT_PAGE },
            page_size: if (1..=MAX_PAGE_SIZE).contains(&page_size) {
                page_size
            } else {
                DEFAULT_PAGE_SIZE
            },
        }
    }

    /// Parses raw query-string values
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0);
        Self::new(parse(page), parse(page_size))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    /// Rows to return
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Builds the response metadata for `total` matching rows
    pub fn paginate(&self, total: i64) -> Pagination {
        let page_size = i64::from(self.page_size);
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: (total + page_size - 1) / page_size,
        }
    }
}

/// Pagination metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}
