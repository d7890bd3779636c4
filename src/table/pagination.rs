//! Server-side pagination state
//!
//! The table never slices rows; it only uses this state to number rows and to
//! drive the pagination control. Containers read it to build list queries.

/// Page sizes offered by the rows-per-page control
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_index: usize,
    page_size: usize,
    total: usize,
}

impl Pagination {
    /// A zero page size is bumped to 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pages; at least 1 so an empty list still has page 0
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// 1-based number shown for the `k`-th row of the current page
    pub fn row_number(&self, k: usize) -> usize {
        self.page_index * self.page_size + k + 1
    }

    /// Record the server's total after a fetch
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Move to `page`. Returns true if the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == self.page_index {
            return false;
        }
        self.page_index = page;
        true
    }

    /// Change the page size, resetting to the first page in the same update
    ///
    /// Returns true if anything changed.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let page_size = page_size.max(1);
        let changed = page_size != self.page_size || self.page_index != 0;
        self.page_size = page_size;
        self.page_index = 0;
        changed
    }

    /// Reset to the first page (e.g. after a filter change)
    pub fn reset(&mut self) -> bool {
        self.set_page(0)
    }

    pub fn next_page(&self) -> Option<usize> {
        let next = self.page_index + 1;
        (next < self.page_count()).then_some(next)
    }

    pub fn prev_page(&self) -> Option<usize> {
        self.page_index.checked_sub(1)
    }

    /// Next (or previous) entry in [`PAGE_SIZE_OPTIONS`] relative to the current size
    pub fn cycle_page_size(&self, forward: bool) -> usize {
        let found = if forward {
            PAGE_SIZE_OPTIONS.iter().copied().find(|&s| s > self.page_size)
        } else {
            PAGE_SIZE_OPTIONS
                .iter()
                .rev()
                .copied()
                .find(|&s| s < self.page_size)
        };
        found.unwrap_or(self.page_size)
    }

    /// `first–last` range of the current page, 1-based; `0–0` when empty
    pub fn visible_range(&self) -> (usize, usize) {
        if self.total == 0 {
            return (0, 0);
        }
        let first = (self.page_index * self.page_size + 1).min(self.total);
        let last = ((self.page_index + 1) * self.page_size).min(self.total);
        (first, last)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}
