//! Pagination bookkeeping for list views

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A requested page; page numbers start at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_no: u32,
    pub page_size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page_no: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Build a page, clamping zero values to the first page / one row
    pub fn new(page_no: u32, page_size: u32) -> Self {
        Self {
            page_no: page_no.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Total number of pages for `total_count` rows
    pub const fn page_count(&self, total_count: u64) -> u64 {
        let page_size = if self.page_size == 0 { 1 } else { self.page_size };
        total_count.div_ceil(page_size as u64)
    }

    pub const fn has_next(&self, total_count: u64) -> bool {
        (self.page_no as u64) < self.page_count(total_count)
    }

    pub const fn next(&self) -> Self {
        Self {
            page_no: self.page_no.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

/// One page of rows plus the collection's total size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub total_count: u64,
}

impl<T> Paginated<T> {
    pub const fn new(rows: Vec<T>, total_count: u64) -> Self {
        Self { rows, total_count }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            rows: self.rows.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}
