//! Pagination parameters and paged results.

use serde::Serialize;

/// Largest page the API hands out in one response.
pub const MAX_LIMIT: u32 = 100;

/// 1-based page window (`page`, `limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamp `page` to at least 1 and `limit` to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Number of items skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Convert into an offset window.
    #[must_use]
    pub fn window(&self) -> Window {
        Window {
            offset: self.offset(),
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// Offset-based window (`offset`, `limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u32,
    pub limit: u32,
}

impl Window {
    /// Clamp `limit` to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Slice an in-memory list down to this window.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    /// Whether items exist beyond this page.
    #[must_use]
    pub fn has_next(&self, window: Window) -> bool {
        u64::from(window.offset) + (self.items.len() as u64) < self.total_count
    }
}
