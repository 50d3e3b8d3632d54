//! Page-by-page coordination over execution results.

use serde::Serialize;
use tracing::debug;

use crate::cms::LocaleResult;
use crate::TARGET_DISCOVERY;

/// Widths at or below this use the narrow layout.
pub const NARROW_VIEWPORT_MAX_PX: u32 = 768;

pub const NARROW_PAGE_SIZE: u32 = 10;
pub const WIDE_PAGE_SIZE: u32 = 20;

/// Multi-page jump distance.
pub const PAGE_JUMP: u32 = 5;

/// Page size for a viewport width.
pub fn page_size_for_width(width_px: u32) -> u32 {
    if width_px <= NARROW_VIEWPORT_MAX_PX {
        NARROW_PAGE_SIZE
    } else {
        WIDE_PAGE_SIZE
    }
}

/// Where the pager stands. `total_pages` and `total_items` are zero until
/// the first results arrive; once loaded, `current_page` stays within
/// `[1, total_pages]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// Tracks the current page and derives totals from execution results.
pub struct PaginationCoordinator {
    state: PaginationState,
}

impl PaginationCoordinator {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            state: PaginationState {
                current_page: 1,
                page_size: page_size_for_width(viewport_width),
                total_pages: 0,
                total_items: 0,
            },
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.state.page_size
    }

    /// Recompute the page size for a viewport width. A change resets to
    /// page 1, since the previous page's item range no longer holds.
    pub fn set_viewport_width(&mut self, width_px: u32) -> bool {
        let next = page_size_for_width(width_px);
        if next == self.state.page_size {
            return false;
        }
        debug!(
            target: TARGET_DISCOVERY,
            "Page size {} -> {}, resetting to page 1", self.state.page_size, next
        );
        self.state.page_size = next;
        self.state.current_page = 1;
        true
    }

    /// Derive totals: the store's own metadata for a single response,
    /// summed per-language counts across a fan-out. The fanned-out story
    /// list is the union of each language's page, never re-sliced
    /// locally; only the counts are guaranteed.
    pub fn apply_results(&mut self, results: &[LocaleResult]) {
        match results {
            [] => {
                self.state.total_items = 0;
                self.state.total_pages = 0;
            }
            [single] => {
                self.state.total_items = single.meta.total;
                self.state.total_pages = if single.meta.page_count > 0 {
                    single.meta.page_count
                } else {
                    ceil_div(single.meta.total, self.state.page_size)
                };
            }
            many => {
                let total: u64 = many.iter().map(|result| result.meta.total).sum();
                self.state.total_items = total;
                self.state.total_pages = ceil_div(total, self.state.page_size);
            }
        }

        if self.state.total_pages == 0 {
            self.state.current_page = 1;
        } else if self.state.current_page > self.state.total_pages {
            self.state.current_page = self.state.total_pages;
        }
    }

    /// Move to a page, clamped to the known range once totals are loaded.
    pub fn go_to(&mut self, page: u32) {
        let mut target = page.max(1);
        if self.state.total_pages > 0 {
            target = target.min(self.state.total_pages);
        }
        self.state.current_page = target;
    }

    pub fn step_forward(&mut self) {
        self.go_to(self.state.current_page.saturating_add(1));
    }

    pub fn step_back(&mut self) {
        self.go_to(self.state.current_page.saturating_sub(1));
    }

    pub fn jump_forward(&mut self) {
        self.go_to(self.state.current_page.saturating_add(PAGE_JUMP));
    }

    pub fn jump_back(&mut self) {
        self.go_to(self.state.current_page.saturating_sub(PAGE_JUMP));
    }

    pub fn reset(&mut self) {
        self.state.current_page = 1;
    }
}

fn ceil_div(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    ((total + u64::from(page_size) - 1) / u64::from(page_size)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::PageMeta;

    fn result_with_total(locale: &str, total: u64, page_count: u32) -> LocaleResult {
        LocaleResult {
            locale: locale.to_string(),
            records: Vec::new(),
            meta: PageMeta {
                page: 1,
                page_size: WIDE_PAGE_SIZE,
                page_count,
                total,
            },
            failed: false,
        }
    }

    #[test]
    fn test_single_response_uses_store_metadata() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[result_with_total("en", 44, 3)]);

        assert_eq!(pager.state().total_items, 44);
        assert_eq!(pager.state().total_pages, 3);
    }

    #[test]
    fn test_fanout_sums_per_language_counts() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[
            result_with_total("hi", 5, 1),
            result_with_total("bn", 3, 1),
        ]);

        assert_eq!(pager.state().total_items, 8);
        assert_eq!(pager.state().total_pages, 1);
    }

    #[test]
    fn test_fanout_pages_derive_from_summed_total() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[
            result_with_total("hi", 30, 2),
            result_with_total("bn", 15, 1),
        ]);

        assert_eq!(pager.state().total_items, 45);
        assert_eq!(pager.state().total_pages, 3);
    }

    #[test]
    fn test_viewport_crossing_resets_page() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[result_with_total("en", 100, 5)]);
        pager.go_to(4);

        assert!(pager.set_viewport_width(600));
        assert_eq!(pager.page_size(), NARROW_PAGE_SIZE);
        assert_eq!(pager.current_page(), 1);

        // Same side of the threshold: no change, no reset
        pager.go_to(2);
        assert!(!pager.set_viewport_width(500));
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn test_jump_is_clamped() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[result_with_total("en", 60, 3)]);

        pager.jump_forward();
        assert_eq!(pager.current_page(), 3);

        pager.jump_back();
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_current_page_clamps_when_totals_shrink() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[result_with_total("en", 100, 5)]);
        pager.go_to(5);

        pager.apply_results(&[result_with_total("en", 22, 2)]);
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn test_empty_results_zero_totals() {
        let mut pager = PaginationCoordinator::new(1280);
        pager.apply_results(&[]);
        assert_eq!(pager.state().total_items, 0);
        assert_eq!(pager.state().total_pages, 0);
        assert_eq!(pager.current_page(), 1);
    }
}
