//! Pagination window math for page-selector controls.
//!
//! A pager shows the first page, the last page and a small cluster of pages
//! around the current one, with ellipses standing in for the gaps.

use serde::Serialize;

/// Page numbers shown by a default pager, first and last page included
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// One slot of a rendered pager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "snake_case")]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl PageItem {
    pub const fn page(self) -> Option<u32> {
        match self {
            Self::Page(n) => Some(n),
            Self::Ellipsis => None,
        }
    }
}

/// Compute the number of pages for a paginated list.
pub fn total_pages(item_count: u64, per_page: u64) -> u32 {
    u32::try_from(item_count.div_ceil(per_page.max(1))).unwrap_or(u32::MAX)
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

/// Window calculator with a fixed budget of visible page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationWindow {
    max_pages: u32,
}

impl Default for PaginationWindow {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PaginationWindow {
    /// `max_pages` below the default is raised to it; the first and last
    /// page plus a three page cluster is the smallest useful pager.
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages: max_pages.max(DEFAULT_MAX_PAGES),
        }
    }

    pub const fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Ordered pager slots for `current_page` out of `total_pages`.
    ///
    /// An out-of-range `current_page` is clamped first.
    pub fn compute(&self, current_page: u32, total_pages: u32) -> Vec<PageItem> {
        if total_pages == 0 {
            return Vec::new();
        }
        if total_pages <= self.max_pages {
            return (1..=total_pages).map(PageItem::Page).collect();
        }

        let current = clamp_page(current_page, total_pages);
        let cluster = self.max_pages - 2;
        let last_interior = total_pages - 1;

        // Centre the cluster, then shift it back inside [2, total - 1]
        // so it keeps its width at either edge.
        let mut start = current.saturating_sub((cluster - 1) / 2).max(2);
        let mut end = start.saturating_add(cluster - 1);
        if end > last_interior {
            end = last_interior;
            start = end + 1 - cluster;
        }

        let mut items = Vec::with_capacity((end - start) as usize + 5);
        items.push(PageItem::Page(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
        items.extend((start..=end).map(PageItem::Page));
        if end < last_interior {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total_pages));
        items
    }
}

/// [`PaginationWindow::compute`] with the default five page budget.
pub fn compute_window(current_page: u32, total_pages: u32) -> Vec<PageItem> {
    PaginationWindow::default().compute(current_page, total_pages)
}

/// Something the user did on the pager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Previous,
    Next,
    Select(PageItem),
}

/// Current position of a pager over `total_pages` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    total_pages: u32,
    window: PaginationWindow,
}

impl Pagination {
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        Self {
            current_page: clamp_page(current_page, total_pages),
            total_pages,
            window: PaginationWindow::default(),
        }
    }

    #[must_use]
    pub const fn with_window(mut self, window: PaginationWindow) -> Self {
        self.window = window;
        self
    }

    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn items(&self) -> Vec<PageItem> {
        self.window.compute(self.current_page, self.total_pages)
    }

    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Target of the Previous control, `None` while it is disabled
    pub const fn previous(&self) -> Option<u32> {
        if self.has_previous() {
            Some(self.current_page - 1)
        } else {
            None
        }
    }

    /// Target of the Next control, `None` while it is disabled
    pub const fn next(&self) -> Option<u32> {
        if self.has_next() {
            Some(self.current_page + 1)
        } else {
            None
        }
    }

    /// Page an item leads to. Ellipses are not interactive.
    pub const fn select(&self, item: PageItem) -> Option<u32> {
        match item {
            PageItem::Page(n) if n >= 1 && n <= self.total_pages => Some(n),
            _ => None,
        }
    }

    pub const fn target(&self, action: PageAction) -> Option<u32> {
        match action {
            PageAction::Previous => self.previous(),
            PageAction::Next => self.next(),
            PageAction::Select(item) => self.select(item),
        }
    }

    /// Invoke `on_page_change` with the action's target page.
    ///
    /// Returns `false` without calling back when the action is disabled.
    pub fn dispatch<F: FnOnce(u32)>(&self, action: PageAction, on_page_change: F) -> bool {
        match self.target(action) {
            Some(page) => {
                on_page_change(page);
                true
            }
            None => false,
        }
    }

    /// Same pager moved to `page`
    #[must_use]
    pub fn go_to(self, page: u32) -> Self {
        Self {
            current_page: clamp_page(page, self.total_pages),
            ..self
        }
    }
}
