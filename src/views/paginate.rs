//! Fixed-size pagination with clamped navigation

/// One page of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    /// 1-based page number
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Current page position over a collection of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
}

impl Paginator {
    /// Starts on page 1; a zero page size is treated as 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// ceil(total_rows / page_size)
    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size)
    }

    /// Moves to `page`, clamped to the valid range
    pub fn set_page(&mut self, page: usize, total_rows: usize) {
        let last = self.total_pages(total_rows).max(1);
        self.page = page.clamp(1, last);
    }

    pub fn next(&mut self, total_rows: usize) {
        self.set_page(self.page.saturating_add(1), total_rows);
    }

    pub fn previous(&mut self, total_rows: usize) {
        self.set_page(self.page.saturating_sub(1), total_rows);
    }

    /// Back to page 1
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// The rows of the current page
    ///
    /// A position left beyond the end by a shrinking collection is clamped
    /// to the last page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
        let total_pages = self.total_pages(items.len());
        let page = self.page.clamp(1, total_pages.max(1));
        let start = ((page - 1) * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());

        Page {
            rows: &items[start..end],
            page,
            total_pages,
            total_rows: items.len(),
        }
    }
}
