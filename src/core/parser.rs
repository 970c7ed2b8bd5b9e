// TalkLog - core/parser.rs
//
// Line-oriented chat-log parser.
// Core layer: works on text already in memory, never touches the filesystem.
//
// Classification order for each trimmed, non-empty line:
//   date marker -> message -> system notice -> continuation of the active
//   message (or dropped when no message is active).
//
// Only a date marker closes the active message; a notice between a message
// and its continuation lines leaves the message open.

use crate::core::model::{DateFormat, Entry, EntryKind};
use crate::core::repair::repair_encoding;
use crate::util::constants;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Display format for date-marker lines.
    pub date_format: DateFormat,
    /// Lines per batch when parsing cooperatively.
    pub chunk_lines: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            chunk_lines: constants::DEFAULT_CHUNK_LINES,
        }
    }
}

/// Compiled line patterns, built once per process.
struct Patterns {
    date_line: Regex,
    date_parts: Regex,
    message: Regex,
    notice: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are covered by the unit tests below, so a mistake shows up
        // as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("parser: invalid regex")
        }
        Patterns {
            // 2023年4月1日（土） / 2023/4/1(Sat) / [2023-04-01]
            date_line: re(
                r"^\[?([0-9]{4}[年/\-]\s*[0-9]{1,2}[月/\-]\s*[0-9]{1,2}日?)(\s*[(（]\S+[)）])?\]?$",
            ),
            date_parts: re(r"([0-9]{4})[年/\-]\s*([0-9]{1,2})[月/\-]\s*([0-9]{1,2})日?"),
            // 12:34 Author Content
            message: re(r"^\[?([0-9]{1,2}:[0-9]{2})\]?\s+(.+?)\s+(.+)$"),
            // 12:34 SingleSegment
            notice: re(r"^\[?([0-9]{1,2}:[0-9]{2})\]?\s+(.+)$"),
        }
    })
}

// =============================================================================
// Whole-text and batch parsing
// =============================================================================

/// Parse a complete chat export.
///
/// Applies the encoding repair pass, splits into lines, and parses them as a
/// single batch. Entries carry provisional ids until the caller builds an
/// [`EntryList`](crate::core::model::EntryList) from them.
pub fn parse(text: &str, config: &ParseConfig) -> Vec<Entry> {
    let repaired = repair_encoding(text);
    let lines: Vec<&str> = repaired.lines().collect();
    parse_lines(&lines, false, config)
}

/// Parse one batch of lines.
///
/// Date formatting and continuation joining only see lines within this
/// batch: a message whose continuation lines fall into the next batch loses
/// them. `is_continuation` marks batches after the first; leading unattached
/// lines of such a batch are the lost tail of the previous batch's last
/// message and are counted in the debug log.
pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    is_continuation: bool,
    config: &ParseConfig,
) -> Vec<Entry> {
    let p = patterns();
    let mut entries: Vec<Entry> = Vec::new();
    // Index into `entries` of the message accepting continuation lines.
    let mut active: Option<usize> = None;
    let mut dropped_lines = 0usize;

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = p.date_line.captures(line) {
            let date = format_date(&caps[1], config.date_format);
            push_entry(&mut entries, "date", EntryKind::DateMarker { date });
            active = None;
            continue;
        }

        if let Some(caps) = p.message.captures(line) {
            let author = caps[2].trim();
            let author = author.strip_suffix(':').unwrap_or(author).trim();
            push_entry(
                &mut entries,
                "msg",
                EntryKind::Message {
                    time: caps[1].to_string(),
                    author: author.to_string(),
                    content: caps[3].trim().to_string(),
                    is_multi_line: false,
                },
            );
            active = Some(entries.len() - 1);
            continue;
        }

        if let Some(caps) = p.notice.captures(line) {
            if is_system_notice(line) {
                push_entry(
                    &mut entries,
                    "sys",
                    EntryKind::SystemNotice {
                        time: caps[1].to_string(),
                        content: caps[2].to_string(),
                    },
                );
                continue;
            }
        }

        match active.and_then(|idx| entries.get_mut(idx)) {
            Some(Entry {
                kind:
                    EntryKind::Message {
                        content,
                        is_multi_line,
                        ..
                    },
                ..
            }) => {
                content.push('\n');
                content.push_str(line);
                *is_multi_line = true;
            }
            _ => {
                dropped_lines += 1;
                tracing::trace!(
                    line = crate::util::logging::preview(line),
                    "Unattached line dropped"
                );
            }
        }
    }

    for entry in &mut entries {
        if let EntryKind::Message {
            content,
            is_multi_line,
            ..
        } = &mut entry.kind
        {
            trim_quotes(content, *is_multi_line);
        }
    }

    if dropped_lines > 0 {
        tracing::debug!(
            dropped = dropped_lines,
            chunk_boundary = is_continuation,
            "Lines outside any message were dropped"
        );
    }
    tracing::debug!(
        lines = lines.len(),
        entries = entries.len(),
        is_continuation,
        "Batch parsed"
    );

    entries
}

fn push_entry(entries: &mut Vec<Entry>, prefix: &str, kind: EntryKind) {
    let position = entries.len();
    entries.push(Entry {
        id: format!("{prefix}-{position}"),
        global_index: position,
        kind,
    });
}

/// A time-prefixed single-segment line is a notice only when it mentions a
/// note or album and is not an invite/join event.
fn is_system_notice(line: &str) -> bool {
    !constants::NOTICE_EXCLUDE_TOKENS
        .iter()
        .any(|token| line.contains(token))
        && constants::NOTICE_INCLUDE_TOKENS
            .iter()
            .any(|token| line.contains(token))
}

/// Strip surrounding quotes from message content.
///
/// Content that both starts and ends with `"` loses exactly one of each.
/// Otherwise, for multi-line content, the first physical line loses a
/// leading quote and the last physical line a trailing quote, independently.
fn trim_quotes(content: &mut String, is_multi_line: bool) {
    if content.len() >= 2 && content.starts_with('"') && content.ends_with('"') {
        content.pop();
        content.remove(0);
        return;
    }
    if !is_multi_line {
        return;
    }
    // The first physical line starts where the content starts and the last
    // one ends where the content ends.
    if content.starts_with('"') {
        content.remove(0);
    }
    if content.ends_with('"') {
        content.pop();
    }
}

/// Reformat a matched date string (`2023年4月1日`, `2023/4/1`, `2023-4-1`).
///
/// Month and day are zero-padded. Strings that are not real calendar dates
/// are still reformatted from their digits.
pub fn format_date(raw: &str, format: DateFormat) -> String {
    let Some(caps) = patterns().date_parts.captures(raw) else {
        return raw.to_string();
    };
    let year = &caps[1];
    let month = format!("{:0>2}", &caps[2]);
    let day = format!("{:0>2}", &caps[3]);

    let is_calendar_date = match (year.parse(), month.parse(), day.parse()) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        _ => false,
    };
    if !is_calendar_date {
        tracing::debug!(date = raw, "Date marker is not a calendar date");
    }

    format.format(year, &month, &day)
}

// =============================================================================
// Cooperative chunked parsing
// =============================================================================

/// Progress after one parse batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseProgress {
    pub processed_lines: usize,
    pub total_lines: usize,
}

impl ParseProgress {
    /// Whole-number completion percentage.
    pub fn percent(&self) -> usize {
        if self.total_lines == 0 {
            100
        } else {
            self.processed_lines * 100 / self.total_lines
        }
    }
}

/// Parses a repaired text one fixed-size batch of lines per `next()` call.
///
/// The host drives the iterator from its event loop, yielding control
/// between batches; each item reports progress. Once exhausted,
/// [`ChunkedParser::into_entries`] returns the concatenated batch results.
#[derive(Debug)]
pub struct ChunkedParser {
    text: String,
    /// Byte offset of the first unparsed line.
    cursor: usize,
    processed_lines: usize,
    total_lines: usize,
    config: ParseConfig,
    entries: Vec<Entry>,
}

impl ChunkedParser {
    /// Repair `text` and count its lines. No parsing happens until the first
    /// call to `next()`.
    pub fn new(text: &str, config: ParseConfig) -> Self {
        let text = repair_encoding(text).into_owned();
        let total_lines = text.lines().count();
        Self {
            text,
            cursor: 0,
            processed_lines: 0,
            total_lines,
            config,
            entries: Vec::new(),
        }
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn processed_lines(&self) -> usize {
        self.processed_lines
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Entries parsed so far (all of them once the iterator is exhausted).
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl Iterator for ChunkedParser {
    type Item = ParseProgress;

    fn next(&mut self) -> Option<ParseProgress> {
        if self.is_finished() {
            return None;
        }

        let batch: Vec<&str> = self.text[self.cursor..]
            .split_inclusive('\n')
            .take(self.config.chunk_lines.max(1))
            .collect();
        let consumed: usize = batch.iter().map(|line| line.len()).sum();
        let parsed = parse_lines(&batch, self.processed_lines > 0, &self.config);
        let batch_lines = batch.len();

        self.entries.extend(parsed);
        self.cursor += consumed;
        self.processed_lines += batch_lines;

        Some(ParseProgress {
            processed_lines: self.processed_lines,
            total_lines: self.total_lines,
        })
    }
}

/// Parse `text` in batches of `config.chunk_lines`, running every batch to
/// completion without yielding.
pub fn parse_in_chunks(text: &str, config: &ParseConfig) -> Vec<Entry> {
    let mut parser = ChunkedParser::new(text, config.clone());
    for _ in parser.by_ref() {}
    parser.into_entries()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EntryList;

    fn parse_default(text: &str) -> Vec<Entry> {
        parse(text, &ParseConfig::default())
    }

    fn message_parts(entry: &Entry) -> (&str, &str, &str, bool) {
        match &entry.kind {
            EntryKind::Message {
                time,
                author,
                content,
                is_multi_line,
            } => (time, author, content, *is_multi_line),
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_basic_conversation() {
        let text = "2023/04/01(土)\n\
                    12:34\tAlice\tGood morning\n\
                    12:35\tBob\tHi there\n";
        let entries = parse_default(text);

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].kind,
            EntryKind::DateMarker {
                date: "2023/04/01".to_string()
            }
        );
        assert_eq!(message_parts(&entries[1]), ("12:34", "Alice", "Good morning", false));
        assert_eq!(message_parts(&entries[2]), ("12:35", "Bob", "Hi there", false));
    }

    #[test]
    fn test_parse_bracketed_time_and_author_colon() {
        let entries = parse_default("[9:05] Carol: see you later");
        assert_eq!(message_parts(&entries[0]), ("9:05", "Carol", "see you later", false));
    }

    #[test]
    fn test_date_formatting_selectors() {
        let mut config = ParseConfig::default();
        assert_eq!(format_date("2023年4月1日", config.date_format), "2023/04/01");

        config.date_format = DateFormat::MonthDayYearSlash;
        assert_eq!(format_date("2023年4月1日", config.date_format), "04/01/2023");

        config.date_format = DateFormat::YearMonthDayKanji;
        assert_eq!(format_date("2023-4-1", config.date_format), "2023年04月01日");
    }

    #[test]
    fn test_date_line_variants() {
        let text = "2023年4月1日（土）\n[2023-04-02]\n2023/4/3(Mon)\n2023年 4月 4日";
        let entries = parse_default(text);
        let dates: Vec<_> = entries
            .iter()
            .map(|e| match &e.kind {
                EntryKind::DateMarker { date } => date.as_str(),
                other => panic!("expected date marker, got {other:?}"),
            })
            .collect();
        assert_eq!(dates, vec!["2023/04/01", "2023/04/02", "2023/04/03", "2023/04/04"]);
    }

    #[test]
    fn test_impossible_date_still_formatted() {
        assert_eq!(
            format_date("2023/13/45", DateFormat::YearMonthDaySlash),
            "2023/13/45"
        );
    }

    #[test]
    fn test_system_notice_requires_note_or_album() {
        let text = "10:00\tアルバムを作成しました\n\
                    10:01\tノートに投稿しました\n\
                    10:02\tSomethinghappened";
        let entries = parse_default(text);
        assert_eq!(entries.len(), 2, "unrelated single-segment line is dropped");
        assert_eq!(
            entries[0].kind,
            EntryKind::SystemNotice {
                time: "10:00".to_string(),
                content: "アルバムを作成しました".to_string()
            }
        );
        assert!(matches!(entries[1].kind, EntryKind::SystemNotice { .. }));
    }

    #[test]
    fn test_unrelated_two_segment_line_is_a_message() {
        let entries = parse_default("10:02\tSomething happened");
        assert_eq!(message_parts(&entries[0]), ("10:02", "Something", "happened", false));
    }

    #[test]
    fn test_notice_keeps_active_message_open() {
        let text = "12:00\tAlice\thello\n12:01\tノートを更新しました\ntrailing line";
        let entries = parse_default(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            message_parts(&entries[0]),
            ("12:00", "Alice", "hello\ntrailing line", true)
        );
        assert!(matches!(entries[1].kind, EntryKind::SystemNotice { .. }));
    }

    #[test]
    fn test_invite_and_join_lines_are_not_notices() {
        let text = "10:00\tAlice\thello\n10:01\tノートに参加しました";
        let entries = parse_default(text);
        assert_eq!(entries.len(), 1);
        // Not a notice, so it falls through to continuation.
        assert_eq!(message_parts(&entries[0]).2, "hello\n10:01\tノートに参加しました");
    }

    #[test]
    fn test_two_segment_line_is_a_message_not_a_notice() {
        let entries = parse_default("10:00 Alice アルバムを作成しました");
        assert!(entries[0].is_message());
    }

    #[test]
    fn test_continuation_lines_join_active_message() {
        let text = "12:00\tAlice\tfirst line\nsecond line\n\n  third line  \n12:01\tBob\tnext";
        let entries = parse_default(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            message_parts(&entries[0]),
            ("12:00", "Alice", "first line\nsecond line\nthird line", true)
        );
        assert!(!message_parts(&entries[1]).3);
    }

    #[test]
    fn test_date_closes_continuation() {
        let text = "12:00\tAlice\thello\n2023/04/02\nstray after date";
        let entries = parse_default(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(message_parts(&entries[0]).2, "hello");
    }

    #[test]
    fn test_stray_lines_before_first_message_dropped() {
        let text = "[LINE] Chat history\nSaved on: somewhere\n12:00\tAlice\thi";
        let entries = parse_default(text);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_message());
    }

    #[test]
    fn test_quote_trim_single_line() {
        let entries = parse_default("12:00\tAlice\t\"hello\"");
        assert_eq!(message_parts(&entries[0]).2, "hello");
    }

    #[test]
    fn test_quote_trim_multi_line_both_ends() {
        let entries = parse_default("12:00\tAlice\t\"line1\nline2\"");
        assert_eq!(message_parts(&entries[0]).2, "line1\nline2");
    }

    #[test]
    fn test_quote_trim_leading_only() {
        let entries = parse_default("12:00\tAlice\t\"line1\nline2");
        assert_eq!(message_parts(&entries[0]).2, "line1\nline2");
    }

    #[test]
    fn test_quote_trim_trailing_only() {
        let entries = parse_default("12:00\tAlice\tline1\nline2\"");
        assert_eq!(message_parts(&entries[0]).2, "line1\nline2");
    }

    #[test]
    fn test_single_quote_character_untouched() {
        let entries = parse_default("12:00\tAlice\t\"");
        assert_eq!(message_parts(&entries[0]).2, "\"");
    }

    #[test]
    fn test_unbalanced_single_line_quote_kept() {
        let entries = parse_default("12:00\tAlice\t\"quoted start");
        assert_eq!(message_parts(&entries[0]).2, "\"quoted start");
    }

    #[test]
    fn test_multi_line_flag_implies_line_break() {
        let text = "12:00\tA\tone\ntwo\n12:01\tB\tthree";
        for entry in parse_default(text) {
            if let EntryKind::Message {
                content,
                is_multi_line: true,
                ..
            } = &entry.kind
            {
                assert!(content.contains('\n'));
            }
        }
    }

    #[test]
    fn test_provisional_ids_follow_batch_position() {
        let entries = parse_default("2023/04/01\n12:00\tA\thi\n12:01\tノートを更新しました");
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["date-0", "msg-1", "sys-2"]);
    }

    #[test]
    fn test_encoding_repair_applied_before_split() {
        let entries = parse_default("12:00\tAlice\tok\u{FFFD}ay");
        assert_eq!(message_parts(&entries[0]).2, "okay");
    }

    #[test]
    fn test_crlf_line_endings() {
        let entries = parse_default("12:00\tAlice\tone\r\ntwo\r\n12:01\tBob\tthree\r\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(message_parts(&entries[0]).2, "one\ntwo");
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let text = "2023/04/01\n12:00\tA\t\"quoted\"\nmore\n12:01\tB\tx\u{00E3}";
        assert_eq!(parse_default(text), parse_default(text));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_default("").is_empty());
        assert!(parse_default("\n\n   \n").is_empty());
    }

    #[test]
    fn test_chunked_matches_whole_when_no_message_spans_boundary() {
        let text = "2023/04/01\n\
                    12:00\tA\tone\n\
                    12:01\tB\ttwo\n\
                    12:02\tA\tthree\n\
                    2023/04/02\n\
                    08:00\tB\tfour\n\
                    08:01\tノートを作成しました\n";
        let config = ParseConfig {
            chunk_lines: 2,
            ..ParseConfig::default()
        };
        let whole = EntryList::finalize(parse(text, &config), false);
        let chunked = EntryList::finalize(parse_in_chunks(text, &config), false);
        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_chunk_boundary_drops_continuation_of_previous_batch() {
        let text = "12:00\tA\tstart\ncontinued\n12:01\tB\tnext";
        let config = ParseConfig {
            chunk_lines: 1,
            ..ParseConfig::default()
        };
        let entries = parse_in_chunks(text, &config);
        assert_eq!(entries.len(), 2);
        assert_eq!(message_parts(&entries[0]).2, "start");
        assert!(!message_parts(&entries[0]).3);
    }

    #[test]
    fn test_chunked_parser_reports_progress_per_batch() {
        let text = "12:00\tA\t1\n12:01\tA\t2\n12:02\tA\t3\n12:03\tA\t4\n12:04\tA\t5";
        let config = ParseConfig {
            chunk_lines: 2,
            ..ParseConfig::default()
        };
        let mut parser = ChunkedParser::new(text, config);
        assert_eq!(parser.total_lines(), 5);

        let steps: Vec<_> = parser.by_ref().collect();
        assert_eq!(
            steps.iter().map(|s| s.processed_lines).collect::<Vec<_>>(),
            vec![2, 4, 5]
        );
        assert_eq!(steps.last().map(ParseProgress::percent), Some(100));
        assert!(parser.is_finished());
        assert_eq!(parser.into_entries().len(), 5);
    }

    #[test]
    fn test_chunked_parser_empty_text_finishes_immediately() {
        let mut parser = ChunkedParser::new("", ParseConfig::default());
        assert!(parser.next().is_none());
        assert_eq!(parser.total_lines(), 0);
    }
}
