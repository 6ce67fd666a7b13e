//! src/model/pagination.rs
//! ============================================================================
//! # Pagination: fixed-size pages over the current derived list
//!
//! Holds only `current_page` and `items_per_page`; every query takes the
//! size of the collection it is paging so the slice is always computed
//! against the latest filtered/sorted result. Requests out of range clamp.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    items_per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Pagination {
    /// A page size of zero is treated as one.
    #[must_use]
    pub const fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: if items_per_page == 0 { 1 } else { items_per_page },
        }
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Changes the page size without touching `current_page`.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page.max(1);
    }

    /// `ceil(total / items_per_page)`, never less than 1.
    #[must_use]
    pub const fn total_pages(&self, total_items: usize) -> usize {
        let pages = total_items.div_ceil(self.items_per_page);
        if pages == 0 { 1 } else { pages }
    }

    /// Jump to `page`, clamped into `[1, total_pages]`. Returns the new page.
    pub fn go_to_page(&mut self, page: i64, total_items: usize) -> usize {
        let last = self.total_pages(total_items);
        self.current_page = if page < 1 {
            1
        } else {
            usize::try_from(page).map_or(last, |p| p.min(last))
        };
        self.current_page
    }

    pub fn next_page(&mut self, total_items: usize) -> usize {
        self.go_to_page(self.page_as_i64().saturating_add(1), total_items)
    }

    pub fn prev_page(&mut self, total_items: usize) -> usize {
        self.go_to_page(self.page_as_i64().saturating_sub(1), total_items)
    }

    pub fn first_page(&mut self) -> usize {
        self.reset();
        self.current_page
    }

    pub fn last_page(&mut self, total_items: usize) -> usize {
        self.current_page = self.total_pages(total_items);
        self.current_page
    }

    pub const fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Pull `current_page` back into range after the collection shrank.
    pub fn clamp(&mut self, total_items: usize) -> usize {
        self.current_page = self.current_page.clamp(1, self.total_pages(total_items));
        self.current_page
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next(&self, total_items: usize) -> bool {
        self.current_page < self.total_pages(total_items)
    }

    /// Index range of the current page within a collection of `total_items`.
    /// Empty when the page lies past the end.
    #[must_use]
    pub fn index_range(&self, total_items: usize) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.items_per_page)
            .min(total_items);
        let end = start.saturating_add(self.items_per_page).min(total_items);
        start..end
    }

    /// The current page's slice of `items`.
    #[must_use]
    pub fn current_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.index_range(items.len())]
    }

    /// 1-based "showing X–Y" bounds; `None` for an empty page.
    #[must_use]
    pub fn display_range(&self, total_items: usize) -> Option<(usize, usize)> {
        let range = self.index_range(total_items);
        (!range.is_empty()).then(|| (range.start + 1, range.end))
    }

    fn page_as_i64(&self) -> i64 {
        i64::try_from(self.current_page).unwrap_or(i64::MAX)
    }
}
