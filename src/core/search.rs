// TalkLog - core/search.rs
//
// Incremental message search over two scopes at once: the entries currently
// materialised in the window, and the full entry list. Matches are always
// ordered by global index.

use crate::core::model::{Entry, EntryList};
use crate::util::constants;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Direction of match navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Match counts reported after every search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchCounts {
    /// Matches among the materialised entries.
    pub window: usize,
    /// Matches across the whole entry list.
    pub global: usize,
}

impl MatchCounts {
    pub fn outside_window(&self) -> usize {
        self.global.saturating_sub(self.window)
    }
}

/// What the caller must do after a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The next match is visible and is now current.
    Moved { global_index: usize },
    /// The next match is outside the window; relocate the window to it,
    /// then re-run the search in append mode and focus it.
    Relocate { global_index: usize },
}

/// Search state. Empty (inactive) until a query of at least
/// `MIN_QUERY_CHARS` characters is submitted.
#[derive(Debug, Default)]
pub struct SearchEngine {
    query: String,
    matcher: Option<Regex>,
    /// Global indices of window matches, ascending.
    window_matches: Vec<usize>,
    /// Global indices of all matches, ascending and deduplicated.
    global_matches: Vec<usize>,
    /// Position in `window_matches`.
    current: Option<usize>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a search.
    ///
    /// `window` is the slice of entries currently materialised; `all` is the
    /// full list. A repeated identical query is a no-op unless `is_append`
    /// is set, which always rescans because the window has changed. Either
    /// way the current match restarts at the first window match.
    pub fn search(
        &mut self,
        query: &str,
        is_append: bool,
        window: &[Entry],
        all: &EntryList,
    ) -> MatchCounts {
        if query.chars().count() < constants::MIN_QUERY_CHARS {
            self.clear();
            return self.counts();
        }
        if !is_append && self.matcher.is_some() && query == self.query {
            return self.counts();
        }

        if !is_append {
            self.clear();
        }

        let Some(matcher) = build_matcher(query) else {
            self.clear();
            return self.counts();
        };

        // The window is rebuilt rather than extended so that repeated append
        // scans never duplicate handles.
        self.window_matches = window
            .iter()
            .filter(|entry| entry_matches(&matcher, entry))
            .map(|entry| entry.global_index)
            .collect();
        self.window_matches.sort_unstable();
        self.window_matches.dedup();

        let mut global: Vec<usize> = all
            .iter()
            .filter(|entry| entry_matches(&matcher, entry))
            .map(|entry| entry.global_index)
            .collect();
        global.extend_from_slice(&self.window_matches);
        global.sort_unstable();
        global.dedup();
        self.global_matches = global;

        self.current = if self.window_matches.is_empty() {
            None
        } else {
            Some(0)
        };

        self.query = query.to_string();
        self.matcher = Some(matcher);

        let counts = self.counts();
        tracing::debug!(
            query = %self.query,
            append = is_append,
            window = counts.window,
            global = counts.global,
            "Search complete"
        );
        counts
    }

    /// Step to the next or previous match in document order, wrapping.
    ///
    /// The step starts from the current match, or from before the first
    /// (after the last) match when nothing is current. Returns `None` when
    /// there are no matches at all.
    pub fn navigate(&mut self, direction: Direction) -> Option<Navigation> {
        let len = self.global_matches.len();
        if len == 0 {
            return None;
        }

        let position = match self.current_global() {
            None => match direction {
                Direction::Forward => 0,
                Direction::Backward => len - 1,
            },
            Some(current) => {
                let found = self.global_matches.binary_search(&current);
                match (found, direction) {
                    (Ok(p), Direction::Forward) => (p + 1) % len,
                    (Err(p), Direction::Forward) => p % len,
                    (Ok(p) | Err(p), Direction::Backward) => (p + len - 1) % len,
                }
            }
        };
        let global_index = self.global_matches[position];

        match self.window_position(global_index) {
            Some(window_pos) => {
                self.current = Some(window_pos);
                Some(Navigation::Moved { global_index })
            }
            None => Some(Navigation::Relocate { global_index }),
        }
    }

    /// Make the window match at `global_index` current. Returns `false` when
    /// that entry is not a window match.
    pub fn focus(&mut self, global_index: usize) -> bool {
        match self.window_position(global_index) {
            Some(position) => {
                self.current = Some(position);
                true
            }
            None => false,
        }
    }

    /// Reset both scopes and forget the query.
    pub fn clear(&mut self) {
        self.query.clear();
        self.matcher = None;
        self.window_matches.clear();
        self.global_matches.clear();
        self.current = None;
    }

    pub fn counts(&self) -> MatchCounts {
        MatchCounts {
            window: self.window_matches.len(),
            global: self.global_matches.len(),
        }
    }

    /// Whether a query is in effect.
    pub fn is_active(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn window_matches(&self) -> &[usize] {
        &self.window_matches
    }

    pub fn global_matches(&self) -> &[usize] {
        &self.global_matches
    }

    /// Position of the current match within the window matches.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Global index of the current match.
    pub fn current_global(&self) -> Option<usize> {
        self.current
            .and_then(|position| self.window_matches.get(position).copied())
    }

    pub fn is_window_match(&self, global_index: usize) -> bool {
        self.window_position(global_index).is_some()
    }

    /// Byte ranges of every occurrence of the query in `text`.
    pub fn highlight_ranges(&self, text: &str) -> Vec<Range<usize>> {
        match &self.matcher {
            Some(matcher) => matcher.find_iter(text).map(|m| m.range()).collect(),
            None => Vec::new(),
        }
    }

    /// One-line description of the current result state, or `None` while
    /// inactive.
    pub fn status_text(&self) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        let counts = self.counts();
        if counts.global == 0 {
            return Some("No matches".to_string());
        }
        let outside = counts.outside_window();
        if counts.window == 0 {
            return Some(format!("{outside} outside the loaded window"));
        }
        let current = self.current.map_or(0, |p| p + 1);
        let mut text = format!("{current}/{}", counts.window);
        if outside > 0 {
            text.push_str(&format!(" ({outside} outside the loaded window)"));
        }
        Some(text)
    }

    fn window_position(&self, global_index: usize) -> Option<usize> {
        self.window_matches.binary_search(&global_index).ok()
    }
}

/// Case-insensitive literal matcher for `query`.
fn build_matcher(query: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, "Search query could not be compiled");
            None
        }
    }
}

fn entry_matches(matcher: &Regex, entry: &Entry) -> bool {
    entry
        .message_content()
        .is_some_and(|content| matcher.is_match(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EntryKind;

    /// 100 messages; those at `hits` contain "needle".
    fn list_with_hits(hits: &[usize]) -> EntryList {
        let entries = (0..100)
            .map(|i| Entry {
                id: String::new(),
                global_index: 0,
                kind: EntryKind::Message {
                    time: "12:00".to_string(),
                    author: "A".to_string(),
                    content: if hits.contains(&i) {
                        format!("message {i} with a Needle inside")
                    } else {
                        format!("message {i}")
                    },
                    is_multi_line: false,
                },
            })
            .collect();
        EntryList::finalize(entries, false)
    }

    #[test]
    fn test_scope_reconciliation() {
        let list = list_with_hits(&[5, 50, 90]);
        let mut engine = SearchEngine::new();
        let counts = engine.search("needle", false, list.slice(0..20), &list);

        assert_eq!(engine.global_matches(), &[5, 50, 90]);
        assert_eq!(engine.window_matches(), &[5]);
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(counts, MatchCounts { window: 1, global: 3 });
        assert_eq!(counts.outside_window(), 2);
    }

    #[test]
    fn test_navigate_requests_relocation_for_off_window_match() {
        let list = list_with_hits(&[5, 50, 90]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.slice(0..20), &list);

        assert_eq!(
            engine.navigate(Direction::Forward),
            Some(Navigation::Relocate { global_index: 50 })
        );

        // Window relocated to 40..60 and rescanned.
        engine.search("needle", true, list.slice(40..60), &list);
        assert!(engine.focus(50));
        assert_eq!(engine.current_global(), Some(50));
    }

    #[test]
    fn test_navigate_wraps_in_both_directions() {
        let list = list_with_hits(&[3, 7, 12]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.as_slice(), &list);
        assert_eq!(engine.current_global(), Some(3));

        assert_eq!(
            engine.navigate(Direction::Backward),
            Some(Navigation::Moved { global_index: 12 })
        );
        assert_eq!(
            engine.navigate(Direction::Forward),
            Some(Navigation::Moved { global_index: 3 })
        );
        assert_eq!(
            engine.navigate(Direction::Forward),
            Some(Navigation::Moved { global_index: 7 })
        );
    }

    #[test]
    fn test_no_current_when_only_off_window_matches() {
        let list = list_with_hits(&[50, 90]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.slice(0..20), &list);
        assert_eq!(engine.current_index(), None);
        assert_eq!(
            engine.navigate(Direction::Backward),
            Some(Navigation::Relocate { global_index: 90 })
        );
    }

    #[test]
    fn test_minimum_query_floor() {
        let list = list_with_hits(&[1]);
        let mut engine = SearchEngine::new();
        engine.search("a", false, list.as_slice(), &list);
        assert!(engine.global_matches().is_empty());
        assert_eq!(engine.current_index(), None);
        assert!(!engine.is_active());
        assert_eq!(engine.navigate(Direction::Forward), None);
    }

    #[test]
    fn test_short_query_clears_previous_results() {
        let list = list_with_hits(&[1]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.as_slice(), &list);
        engine.search("n", false, list.as_slice(), &list);
        assert_eq!(engine.counts(), MatchCounts::default());
    }

    #[test]
    fn test_repeated_query_is_noop_without_append() {
        let list = list_with_hits(&[1, 2]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.as_slice(), &list);
        engine.navigate(Direction::Forward);
        assert_eq!(engine.current_global(), Some(2));

        engine.search("needle", false, list.as_slice(), &list);
        assert_eq!(engine.current_global(), Some(2), "state untouched");
    }

    #[test]
    fn test_append_rescan_restarts_at_first_window_match() {
        let list = list_with_hits(&[5, 25, 45]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.slice(0..40), &list);
        engine.navigate(Direction::Forward);
        assert_eq!(engine.current_global(), Some(25));

        engine.search("needle", true, list.slice(0..60), &list);
        assert_eq!(engine.window_matches(), &[5, 25, 45]);
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(engine.current_global(), Some(5));
    }

    #[test]
    fn test_append_adds_window_matches() {
        let list = list_with_hits(&[5, 25]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.slice(0..20), &list);
        assert_eq!(engine.window_matches(), &[5]);

        engine.search("needle", true, list.slice(0..40), &list);
        assert_eq!(engine.window_matches(), &[5, 25]);
        assert_eq!(engine.global_matches(), &[5, 25]);
        assert_eq!(engine.current_global(), Some(5));

        engine.search("needle", true, list.slice(0..40), &list);
        assert_eq!(engine.window_matches().len(), 2, "no duplicates");
    }

    #[test]
    fn test_case_insensitive_literal_match() {
        let list = list_with_hits(&[4]);
        let mut engine = SearchEngine::new();
        let counts = engine.search("NEEDLE", false, list.as_slice(), &list);
        assert_eq!(counts.global, 1);

        let counts = engine.search("a.b", false, list.as_slice(), &list);
        assert_eq!(counts.global, 0, "regex metacharacters are literal");
    }

    #[test]
    fn test_only_message_content_is_searched() {
        let list = EntryList::finalize(
            vec![
                Entry {
                    id: String::new(),
                    global_index: 0,
                    kind: EntryKind::DateMarker {
                        date: "needle day".to_string(),
                    },
                },
                Entry {
                    id: String::new(),
                    global_index: 0,
                    kind: EntryKind::Message {
                        time: "12:00".to_string(),
                        author: "needle".to_string(),
                        content: "hello".to_string(),
                        is_multi_line: false,
                    },
                },
            ],
            false,
        );
        let mut engine = SearchEngine::new();
        assert_eq!(engine.search("needle", false, list.as_slice(), &list).global, 0);
    }

    #[test]
    fn test_highlight_ranges() {
        let list = list_with_hits(&[]);
        let mut engine = SearchEngine::new();
        engine.search("ab", false, list.as_slice(), &list);
        assert_eq!(engine.highlight_ranges("xxABab"), vec![2..4, 4..6]);
    }

    #[test]
    fn test_status_text() {
        let list = list_with_hits(&[5, 50, 90]);
        let mut engine = SearchEngine::new();
        assert_eq!(engine.status_text(), None);

        engine.search("needle", false, list.slice(0..20), &list);
        assert_eq!(
            engine.status_text().as_deref(),
            Some("1/1 (2 outside the loaded window)")
        );

        engine.search("absent", false, list.slice(0..20), &list);
        assert_eq!(engine.status_text().as_deref(), Some("No matches"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let list = list_with_hits(&[5]);
        let mut engine = SearchEngine::new();
        engine.search("needle", false, list.as_slice(), &list);
        engine.clear();
        assert!(!engine.is_active());
        assert_eq!(engine.query(), "");
        assert_eq!(engine.counts(), MatchCounts::default());
        assert!(engine.highlight_ranges("needle").is_empty());
    }
}
