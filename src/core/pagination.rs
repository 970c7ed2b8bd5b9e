// TalkLog - core/pagination.rs
//
// Window controller: decides which contiguous slice of the entry list is
// materialised for display.
//
// Page loads are two-step. `begin_load_more` / `jump_to` decide what to
// render and hand back a `PageRequest`; the host renders on a later tick and
// then calls `complete`. Every reset or window-replacing jump bumps the
// generation, so a request issued before it can never write into the new
// window state.

use crate::util::constants;
use std::ops::Range;

/// How a completed page is applied to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Extend the window with the next page.
    Append,
    /// Discard the window and show only this page.
    Replace,
}

/// A page load that has been decided but not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub range: Range<usize>,
    pub mode: PageMode,
}

/// Result of asking the window to show a particular entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpOutcome {
    /// The entry is already materialised; nothing to load.
    AlreadyVisible,
    /// The index is outside the entry list. The window is unchanged.
    Rejected,
    /// A replacement page containing the entry must be rendered.
    Load(PageRequest),
}

/// Windowed pagination state over an entry list of known length.
///
/// The visible window is always `start_index - visible_len .. start_index`.
/// The controller tracks only positions; the owner slices the entry list.
#[derive(Debug, Clone)]
pub struct WindowController {
    page_size: usize,
    windowing_enabled: bool,
    total: usize,
    /// One past the last materialised entry.
    start_index: usize,
    visible_len: usize,
    is_loading: bool,
    has_reached_end: bool,
    generation: u64,
}

impl WindowController {
    pub fn new(page_size: usize, windowing_enabled: bool) -> Self {
        Self {
            page_size: clamp_page_size(page_size),
            windowing_enabled,
            total: 0,
            start_index: 0,
            visible_len: 0,
            is_loading: false,
            has_reached_end: false,
            generation: 0,
        }
    }

    /// Empty the window over a list of `total` entries and invalidate any
    /// outstanding page request.
    pub fn reset_window(&mut self, total: usize) {
        self.total = total;
        self.start_index = 0;
        self.visible_len = 0;
        self.is_loading = false;
        self.has_reached_end = false;
        self.generation += 1;
        tracing::debug!(
            total,
            generation = self.generation,
            "Window reset"
        );
    }

    /// Entries per page. With windowing disabled a single page covers the
    /// whole list.
    pub fn effective_page_size(&self) -> usize {
        if self.windowing_enabled {
            self.page_size
        } else {
            self.total.max(1)
        }
    }

    /// Decide the next page to append.
    ///
    /// Returns `None` (and changes nothing) while a page is loading, once the
    /// end has been reached, or for an initial load into a window that
    /// already has content. Callers arriving while loading are dropped, not
    /// queued.
    pub fn begin_load_more(&mut self, is_initial: bool) -> Option<PageRequest> {
        if self.is_loading {
            tracing::trace!("Load more ignored: page already loading");
            return None;
        }
        if self.has_reached_end {
            return None;
        }
        if is_initial && self.visible_len > 0 {
            tracing::trace!("Initial load ignored: window already populated");
            return None;
        }

        let end = (self.start_index + self.effective_page_size()).min(self.total);
        self.is_loading = true;
        Some(PageRequest {
            generation: self.generation,
            range: self.start_index..end,
            mode: PageMode::Append,
        })
    }

    /// Apply a rendered page. Returns `false` if the request was superseded
    /// by a reset or jump issued after it.
    pub fn complete(&mut self, request: &PageRequest) -> bool {
        if request.generation != self.generation {
            tracing::debug!(
                stale = request.generation,
                current = self.generation,
                "Discarded stale page completion"
            );
            return false;
        }

        let loaded = request.range.len();
        match request.mode {
            PageMode::Append => self.visible_len += loaded,
            PageMode::Replace => self.visible_len = loaded,
        }
        self.start_index = request.range.end;
        self.has_reached_end = self.start_index >= self.total;
        self.is_loading = false;

        tracing::debug!(
            range = ?request.range,
            mode = ?request.mode,
            visible = self.visible_len,
            reached_end = self.has_reached_end,
            "Page loaded"
        );
        true
    }

    /// Bring `global_index` into the window.
    ///
    /// An entry already visible needs nothing. Any other in-range entry is
    /// reached by replacing the window with the single page-aligned page that
    /// contains it, whether it lies before or after the current window. The
    /// jump supersedes any page still loading.
    pub fn jump_to(&mut self, global_index: usize) -> JumpOutcome {
        if global_index >= self.total {
            tracing::debug!(
                global_index,
                total = self.total,
                "Jump rejected: index out of range"
            );
            return JumpOutcome::Rejected;
        }
        if self.contains(global_index) {
            return JumpOutcome::AlreadyVisible;
        }

        let page_size = self.effective_page_size();
        let page_start = (global_index / page_size) * page_size;
        let page_end = (page_start + page_size).min(self.total);

        self.generation += 1;
        self.is_loading = true;
        self.has_reached_end = false;

        tracing::debug!(
            global_index,
            page = ?(page_start..page_end),
            generation = self.generation,
            "Window relocation scheduled"
        );
        JumpOutcome::Load(PageRequest {
            generation: self.generation,
            range: page_start..page_end,
            mode: PageMode::Replace,
        })
    }

    /// Global indices currently materialised.
    pub fn visible_range(&self) -> Range<usize> {
        self.start_index - self.visible_len..self.start_index
    }

    pub fn contains(&self, global_index: usize) -> bool {
        self.visible_range().contains(&global_index)
    }

    /// Whether "load more" controls should be offered.
    pub fn shows_pagination_controls(&self) -> bool {
        self.windowing_enabled && !self.has_reached_end
    }

    /// Change the page size (clamped to the accepted range). Takes effect on
    /// the next page; owners normally reset the window afterwards.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = clamp_page_size(page_size);
    }

    pub fn set_windowing(&mut self, enabled: bool) {
        self.windowing_enabled = enabled;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn windowing_enabled(&self) -> bool {
        self.windowing_enabled
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn visible_len(&self) -> usize {
        self.visible_len
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_reached_end(&self) -> bool {
        self.has_reached_end
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(total: usize, page_size: usize) -> WindowController {
        let mut window = WindowController::new(page_size, true);
        window.reset_window(total);
        window
    }

    fn load_page(window: &mut WindowController, is_initial: bool) -> Option<PageRequest> {
        let request = window.begin_load_more(is_initial)?;
        assert!(window.complete(&request));
        Some(request)
    }

    #[test]
    fn test_initial_load_takes_first_page() {
        let mut window = controller(95, 20);
        let request = load_page(&mut window, true).expect("first page");
        assert_eq!(request.range, 0..20);
        assert_eq!(window.visible_range(), 0..20);
        assert!(!window.has_reached_end());
    }

    #[test]
    fn test_coverage_invariant_across_load_more() {
        let mut window = controller(95, 20);
        load_page(&mut window, true);
        while load_page(&mut window, false).is_some() {
            let range = window.visible_range();
            assert_eq!(range.start, 0);
            assert_eq!(range.end, window.start_index());
            assert_eq!(range.len(), window.visible_len());
        }
        assert_eq!(window.visible_range(), 0..95);
        assert!(window.has_reached_end());
        assert!(window.begin_load_more(false).is_none());
    }

    #[test]
    fn test_mutual_exclusion_drops_second_request() {
        let mut window = controller(100, 20);
        let first = window.begin_load_more(true).expect("first request");
        assert!(window.begin_load_more(false).is_none());
        assert!(window.complete(&first));
        assert_eq!(window.visible_len(), 20, "exactly one page appended");
    }

    #[test]
    fn test_initial_load_ignored_when_populated() {
        let mut window = controller(100, 20);
        load_page(&mut window, true);
        assert!(window.begin_load_more(true).is_none());
        assert!(window.begin_load_more(false).is_some());
    }

    #[test]
    fn test_reset_invalidates_pending_request() {
        let mut window = controller(100, 20);
        let stale = window.begin_load_more(true).expect("request");
        window.reset_window(50);
        assert!(!window.complete(&stale));
        assert_eq!(window.visible_len(), 0);
        assert!(!window.is_loading());
        assert_eq!(window.total(), 50);
    }

    #[test]
    fn test_jump_to_visible_entry() {
        let mut window = controller(100, 20);
        load_page(&mut window, true);
        assert_eq!(window.jump_to(7), JumpOutcome::AlreadyVisible);
    }

    #[test]
    fn test_jump_forward_replaces_with_aligned_page() {
        let mut window = controller(100, 20);
        load_page(&mut window, true);
        let JumpOutcome::Load(request) = window.jump_to(50) else {
            panic!("expected a page load");
        };
        assert_eq!(request.range, 40..60);
        assert_eq!(request.mode, PageMode::Replace);
        assert!(window.complete(&request));
        assert_eq!(window.visible_range(), 40..60);
        assert!(window.contains(50));
    }

    #[test]
    fn test_jump_backward_replaces_with_aligned_page() {
        let mut window = controller(100, 20);
        load_page(&mut window, true);
        if let JumpOutcome::Load(request) = window.jump_to(90) {
            window.complete(&request);
        }
        let JumpOutcome::Load(request) = window.jump_to(3) else {
            panic!("expected a page load");
        };
        assert_eq!(request.range, 0..20);
        window.complete(&request);
        assert_eq!(window.visible_range(), 0..20);
    }

    #[test]
    fn test_jump_last_partial_page_reaches_end() {
        let mut window = controller(95, 20);
        load_page(&mut window, true);
        if let JumpOutcome::Load(request) = window.jump_to(94) {
            assert_eq!(request.range, 80..95);
            window.complete(&request);
        }
        assert!(window.has_reached_end());
    }

    #[test]
    fn test_append_after_jump_continues_from_page() {
        let mut window = controller(100, 20);
        load_page(&mut window, true);
        if let JumpOutcome::Load(request) = window.jump_to(45) {
            window.complete(&request);
        }
        load_page(&mut window, false);
        assert_eq!(window.visible_range(), 40..80);
    }

    #[test]
    fn test_jump_supersedes_pending_append() {
        let mut window = controller(100, 20);
        load_page(&mut window, true);
        let pending = window.begin_load_more(false).expect("append");
        let JumpOutcome::Load(jump) = window.jump_to(70) else {
            panic!("expected a page load");
        };
        assert!(!window.complete(&pending));
        assert!(window.complete(&jump));
        assert_eq!(window.visible_range(), 60..80);
    }

    #[test]
    fn test_jump_out_of_range_rejected() {
        let mut window = controller(10, 20);
        load_page(&mut window, true);
        let generation = window.generation();
        assert_eq!(window.jump_to(10), JumpOutcome::Rejected);
        assert_eq!(window.generation(), generation);
        assert_eq!(window.visible_range(), 0..10);
    }

    #[test]
    fn test_non_windowed_mode_loads_everything() {
        let mut window = WindowController::new(20, false);
        window.reset_window(250);
        load_page(&mut window, true);
        assert_eq!(window.visible_range(), 0..250);
        assert!(window.has_reached_end());
        assert!(!window.shows_pagination_controls());
    }

    #[test]
    fn test_empty_list_reaches_end_after_initial_load() {
        let mut window = controller(0, 20);
        let request = load_page(&mut window, true).expect("empty page");
        assert!(request.range.is_empty());
        assert!(window.has_reached_end());
    }

    #[test]
    fn test_page_size_clamped() {
        let window = WindowController::new(1, true);
        assert_eq!(window.page_size(), constants::MIN_PAGE_SIZE);
        let window = WindowController::new(usize::MAX, true);
        assert_eq!(window.page_size(), constants::MAX_PAGE_SIZE);
    }
}
