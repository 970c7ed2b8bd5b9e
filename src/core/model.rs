// TalkLog - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::LoadError;
use std::collections::HashSet;
use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Entry (normalised output of parsing)
// =============================================================================

/// A single parsed unit of a chat log.
///
/// While parsing, `id` and `global_index` are provisional (position within
/// the parse batch). [`EntryList::finalize`] replaces both with values
/// derived from the entry's position in the complete list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stable identifier; after finalisation always `entry_id(global_index)`.
    pub id: String,

    /// Position in the fully ordered entry list.
    pub global_index: usize,

    /// Variant-specific payload.
    pub kind: EntryKind,
}

/// The three kinds of line a chat export contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Day boundary, already formatted for display.
    DateMarker { date: String },

    /// Non-conversational event text (album/note activity).
    SystemNotice { time: String, content: String },

    /// A conversational turn. `content` may contain `\n` when continuation
    /// lines were attached, in which case `is_multi_line` is true.
    Message {
        time: String,
        author: String,
        content: String,
        is_multi_line: bool,
    },
}

impl Entry {
    /// Message text, or `None` for date markers and notices.
    pub fn message_content(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Message { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Author name, or `None` for non-message entries.
    pub fn author(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Message { author, .. } => Some(author),
            _ => None,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, EntryKind::Message { .. })
    }
}

/// Final identifier for the entry at `global_index`.
pub fn entry_id(global_index: usize) -> String {
    format!("msg-{global_index}")
}

// =============================================================================
// EntryList
// =============================================================================

/// The complete, final-ordered entries of one loaded document.
///
/// Immutable once built: the only way to obtain one is [`EntryList::finalize`],
/// which fixes every entry's `global_index` and `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    /// Apply the optional reversal, then assign `global_index = position`
    /// and the derived id to every entry in one pass.
    pub fn finalize(mut entries: Vec<Entry>, reverse_order: bool) -> Self {
        if reverse_order {
            entries.reverse();
        }
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.global_index = index;
            entry.id = entry_id(index);
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, global_index: usize) -> Option<&Entry> {
        self.entries.get(global_index)
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Entries in `range`, clamped to the list bounds.
    pub fn slice(&self, range: Range<usize>) -> &[Entry] {
        let end = range.end.min(self.entries.len());
        let start = range.start.min(end);
        &self.entries[start..end]
    }

    /// Distinct message authors in order of first appearance.
    pub fn authors(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter_map(Entry::author)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

// =============================================================================
// Date display format
// =============================================================================

/// Display format applied to date-marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateFormat {
    /// `2023/04/01`
    #[default]
    YearMonthDaySlash,
    /// `2023年04月01日`
    YearMonthDayKanji,
    /// `04/01/2023`
    MonthDayYearSlash,
}

impl DateFormat {
    /// All variants in display order.
    pub fn all() -> &'static [DateFormat] {
        &[
            DateFormat::YearMonthDaySlash,
            DateFormat::YearMonthDayKanji,
            DateFormat::MonthDayYearSlash,
        ]
    }

    /// Setting string as written in config files and on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            DateFormat::YearMonthDaySlash => "yyyy/MM/dd",
            DateFormat::YearMonthDayKanji => "yyyy年MM月dd日",
            DateFormat::MonthDayYearSlash => "MM/dd/yyyy",
        }
    }

    /// Parse a setting string. Returns `None` for unrecognised formats.
    pub fn parse(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.label() == value.trim())
    }

    /// Parse a setting string, falling back to `yyyy/MM/dd`.
    pub fn from_setting(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Render a date in this format.
    pub fn format(&self, year: &str, month: &str, day: &str) -> String {
        match self {
            DateFormat::YearMonthDaySlash => format!("{year}/{month}/{day}"),
            DateFormat::YearMonthDayKanji => format!("{year}年{month}月{day}日"),
            DateFormat::MonthDayYearSlash => format!("{month}/{day}/{year}"),
        }
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Statistics about a completed load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub total_lines: usize,
    pub entries: usize,
    pub messages: usize,
    pub notices: usize,
    pub date_markers: usize,
    pub authors: usize,
    pub duration: Duration,
}

impl LoadSummary {
    pub fn from_entries(entries: &EntryList, total_lines: usize, duration: Duration) -> Self {
        let mut summary = Self {
            total_lines,
            entries: entries.len(),
            messages: 0,
            notices: 0,
            date_markers: 0,
            authors: entries.authors().len(),
            duration,
        };
        for entry in entries.iter() {
            match entry.kind {
                EntryKind::DateMarker { .. } => summary.date_markers += 1,
                EntryKind::SystemNotice { .. } => summary.notices += 1,
                EntryKind::Message { .. } => summary.messages += 1,
            }
        }
        summary
    }
}

/// Progress messages emitted by the cooperative loader, one batch at a time.
#[derive(Debug)]
pub enum LoadProgress {
    /// File read and repaired; parsing is about to begin.
    Started {
        file_name: String,
        total_lines: usize,
    },

    /// One parse batch finished.
    Parsed {
        processed_lines: usize,
        total_lines: usize,
    },

    /// All batches parsed and the list finalised.
    Completed {
        path: PathBuf,
        file_name: String,
        entries: EntryList,
        summary: LoadSummary,
    },

    /// The file could not be read. Terminal for this load attempt.
    Failed { error: LoadError },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(author: &str, content: &str) -> Entry {
        Entry {
            id: String::new(),
            global_index: 0,
            kind: EntryKind::Message {
                time: "12:00".to_string(),
                author: author.to_string(),
                content: content.to_string(),
                is_multi_line: false,
            },
        }
    }

    fn date(d: &str) -> Entry {
        Entry {
            id: String::new(),
            global_index: 0,
            kind: EntryKind::DateMarker {
                date: d.to_string(),
            },
        }
    }

    #[test]
    fn test_finalize_assigns_position_and_id() {
        let list = EntryList::finalize(
            vec![date("2023/04/01"), message("A", "hi"), message("B", "yo")],
            false,
        );
        for (i, entry) in list.iter().enumerate() {
            assert_eq!(entry.global_index, i);
            assert_eq!(entry.id, entry_id(i));
        }
    }

    #[test]
    fn test_finalize_reverses_before_indexing() {
        let list = EntryList::finalize(vec![message("A", "first"), message("B", "second")], true);
        assert_eq!(list.get(0).and_then(Entry::message_content), Some("second"));
        assert_eq!(list.get(0).map(|e| e.global_index), Some(0));
        assert_eq!(list.get(1).map(|e| e.id.as_str()), Some("msg-1"));
    }

    #[test]
    fn test_slice_is_clamped() {
        let list = EntryList::finalize(vec![message("A", "1"), message("A", "2")], false);
        assert_eq!(list.slice(1..10).len(), 1);
        assert!(list.slice(5..10).is_empty());
    }

    #[test]
    fn test_authors_first_appearance_order() {
        let list = EntryList::finalize(
            vec![message("Bob", "1"), date("x"), message("Alice", "2"), message("Bob", "3")],
            false,
        );
        assert_eq!(list.authors(), vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_date_format_parse_and_fallback() {
        assert_eq!(DateFormat::parse("MM/dd/yyyy"), Some(DateFormat::MonthDayYearSlash));
        assert_eq!(DateFormat::parse("dd.MM.yyyy"), None);
        assert_eq!(DateFormat::from_setting("nonsense"), DateFormat::YearMonthDaySlash);
        assert_eq!(
            DateFormat::YearMonthDayKanji.format("2023", "04", "01"),
            "2023年04月01日"
        );
    }

    #[test]
    fn test_date_format_labels_match_config_choices() {
        let labels: Vec<_> = DateFormat::all().iter().map(DateFormat::label).collect();
        assert_eq!(labels, crate::util::constants::DATE_FORMAT_CHOICES);
    }

    #[test]
    fn test_load_summary_counts_variants() {
        let list = EntryList::finalize(
            vec![date("d"), message("A", "1"), message("B", "2")],
            false,
        );
        let summary = LoadSummary::from_entries(&list, 10, Duration::from_millis(5));
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.messages, 2);
        assert_eq!(summary.date_markers, 1);
        assert_eq!(summary.notices, 0);
        assert_eq!(summary.authors, 2);
    }
}
