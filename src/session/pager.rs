use std::ops::Range;

use crate::config::{DEFAULT_PAGE_SIZE, PAGE_SIZES};

/// Page cursor over a result list of externally known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self { page: 0, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl Pager {
    /// Unsupported sizes fall back to the default
    pub fn new(page_size: usize) -> Self {
        let page_size = if PAGE_SIZES.contains(&page_size) { page_size } else { DEFAULT_PAGE_SIZE };
        Self { page: 0, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(total / page_size)`
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Change the page size; returns to the first page. Unsupported sizes are ignored.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if !PAGE_SIZES.contains(&page_size) {
            return false;
        }
        self.page_size = page_size;
        self.page = 0;
        true
    }

    /// Advance to the next supported page size, wrapping around
    pub fn cycle_page_size(&mut self) {
        let idx = PAGE_SIZES.iter().position(|s| *s == self.page_size).unwrap_or(0);
        let next = PAGE_SIZES[(idx + 1) % PAGE_SIZES.len()];
        self.set_page_size(next);
    }

    /// Jump to `page`, clamped into the valid range for `total` rows
    pub fn go_to(&mut self, page: usize, total: usize) {
        self.page = page;
        self.clamp(total);
    }

    /// Clamp the page index into `[0, total_pages - 1]` (0 when empty)
    pub fn clamp(&mut self, total: usize) {
        let last = self.total_pages(total).saturating_sub(1);
        self.page = self.page.min(last);
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page + 1 < self.total_pages(total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Move forward one page; no-op on the last page
    pub fn next(&mut self, total: usize) -> bool {
        if self.has_next(total) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page; no-op on the first page
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Row indices shown on the current page
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    /// "Page 2 of 3" style label; "Page 0 of 0" when there is nothing to show
    pub fn label(&self, total: usize) -> String {
        let pages = self.total_pages(total);
        if pages == 0 {
            return "Page 0 of 0".to_string();
        }
        format!("Page {} of {}", self.page + 1, pages)
    }
}
