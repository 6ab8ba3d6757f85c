//! Page bookkeeping for WooCommerce collection endpoints.
//!
//! WooCommerce reports totals in the `X-WP-Total` and `X-WP-TotalPages`
//! response headers; pages are 1-based.

use serde::{Deserialize, Serialize};

/// Position within a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-based).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Pagination {
    /// Build from reported totals. Page 0 is treated as page 1.
    #[must_use]
    pub fn new(page: u32, per_page: u32, total_items: u64, total_pages: u32) -> Self {
        Self {
            page: page.max(1),
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Build from an item count, computing the page count.
    #[must_use]
    pub fn from_total(page: u32, per_page: u32, total_items: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            u32::try_from(total_items.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };
        Self::new(page, per_page, total_items, total_pages)
    }

    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether this is the final page (or the listing is empty).
    #[must_use]
    pub const fn is_last(&self) -> bool {
        !self.has_more()
    }

    /// The next page number, if any.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.has_more() {
            Some(self.page + 1)
        } else {
            None
        }
    }

    /// The previous page number, if any.
    #[must_use]
    pub const fn prev_page(&self) -> Option<u32> {
        if self.page > 1 {
            Some(self.page - 1)
        } else {
            None
        }
    }
}
