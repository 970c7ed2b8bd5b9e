// TalkLog - core/chat.rs
//
// ChatSession: the context object that owns one loaded document's entry
// list together with its window controller and search engine, and keeps the
// two consistent.
//
// The host drives it in steps. Operations that need a page rendered only
// schedule it; `pump` completes the scheduled page on a later tick, then
// refreshes the search and applies any pending focus.

use crate::core::model::{Entry, EntryList};
use crate::core::pagination::{JumpOutcome, PageRequest, WindowController};
use crate::core::search::{Direction, MatchCounts, Navigation, SearchEngine};

#[derive(Debug)]
pub struct ChatSession {
    entries: EntryList,
    window: WindowController,
    search: SearchEngine,
    /// Page decided but not yet rendered.
    pending_page: Option<PageRequest>,
    /// Entry to focus once the pending page lands.
    pending_focus: Option<usize>,
    /// Entry the view should scroll to on its next frame.
    scroll_target: Option<usize>,
    /// A document is open, even if it parsed to no entries.
    loaded: bool,
}

impl ChatSession {
    pub fn new(page_size: usize, windowing_enabled: bool) -> Self {
        Self {
            entries: EntryList::default(),
            window: WindowController::new(page_size, windowing_enabled),
            search: SearchEngine::new(),
            pending_page: None,
            pending_focus: None,
            scroll_target: None,
            loaded: false,
        }
    }

    /// Replace the document and schedule its first page.
    pub fn load(&mut self, entries: EntryList) {
        tracing::info!(entries = entries.len(), "Chat session loaded");
        self.entries = entries;
        self.loaded = true;
        self.reset_window();
        self.load_more(true);
    }

    /// Drop the document and all derived state.
    pub fn close(&mut self) {
        self.entries = EntryList::default();
        self.loaded = false;
        self.reset_window();
    }

    /// Empty the window and clear the search, whose results are relative to
    /// the window that is going away.
    pub fn reset_window(&mut self) {
        self.window.reset_window(self.entries.len());
        self.search.clear();
        self.pending_page = None;
        self.pending_focus = None;
        self.scroll_target = None;
    }

    /// Schedule the next page. Returns `false` when the request was dropped
    /// (already loading, at the end, or an initial load into a populated
    /// window).
    pub fn load_more(&mut self, is_initial: bool) -> bool {
        match self.window.begin_load_more(is_initial) {
            Some(request) => {
                self.pending_page = Some(request);
                true
            }
            None => false,
        }
    }

    /// Complete the scheduled page, if any. Returns `true` when the window
    /// changed.
    pub fn pump(&mut self) -> bool {
        let Some(request) = self.pending_page.take() else {
            return false;
        };
        if !self.window.complete(&request) {
            return false;
        }

        if self.search.is_active() {
            let query = self.search.query().to_string();
            let visible = self.entries.slice(self.window.visible_range());
            self.search.search(&query, true, visible, &self.entries);
        }

        if let Some(target) = self.pending_focus.take() {
            self.search.focus(target);
            self.scroll_target = Some(target);
        }
        true
    }

    /// Bring `global_index` into view, relocating the window if needed.
    pub fn jump_to(&mut self, global_index: usize) -> JumpOutcome {
        let outcome = self.window.jump_to(global_index);
        match &outcome {
            JumpOutcome::AlreadyVisible => {
                self.search.focus(global_index);
                self.scroll_target = Some(global_index);
            }
            JumpOutcome::Load(request) => {
                self.pending_page = Some(request.clone());
                self.pending_focus = Some(global_index);
            }
            JumpOutcome::Rejected => {}
        }
        outcome
    }

    /// Run a new search against the current window and the full list.
    pub fn search(&mut self, query: &str) -> MatchCounts {
        let visible = self.entries.slice(self.window.visible_range());
        let counts = self.search.search(query, false, visible, &self.entries);
        if let Some(current) = self.search.current_global() {
            self.scroll_target = Some(current);
        }
        counts
    }

    /// Step to the next/previous match, relocating the window when the
    /// match is not materialised.
    pub fn navigate(&mut self, direction: Direction) -> Option<Navigation> {
        let navigation = self.search.navigate(direction)?;
        match navigation {
            Navigation::Moved { global_index } => self.scroll_target = Some(global_index),
            Navigation::Relocate { global_index } => {
                self.jump_to(global_index);
            }
        }
        Some(navigation)
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Change the page size and restart the window from the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.window.set_page_size(page_size);
        self.restart_window();
    }

    /// Switch windowed/non-windowed mode and restart the window.
    pub fn set_windowing(&mut self, enabled: bool) {
        self.window.set_windowing(enabled);
        self.restart_window();
    }

    fn restart_window(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.reset_window();
        self.load_more(true);
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn visible_entries(&self) -> &[Entry] {
        self.entries.slice(self.window.visible_range())
    }

    pub fn window(&self) -> &WindowController {
        &self.window
    }

    pub fn search_state(&self) -> &SearchEngine {
        &self.search
    }

    /// Whether a document is open. An open document may have no entries.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a page is waiting for `pump`.
    pub fn has_pending_work(&self) -> bool {
        self.pending_page.is_some()
    }

    /// Take the entry the view should scroll to, if any.
    pub fn take_scroll_target(&mut self) -> Option<usize> {
        self.scroll_target.take()
    }
}
