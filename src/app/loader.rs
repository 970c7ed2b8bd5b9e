// TalkLog - app/loader.rs
//
// Load lifecycle management. Reads a chat export, then parses it one batch
// per poll so the host event loop stays responsive.
//
// Architecture:
//   - `LoadManager` lives on the UI thread and does all of its work there.
//   - The host calls `poll_progress` once per frame; each call parses at most
//     one batch and returns the progress messages produced since the last
//     poll.
//   - Starting a new load or cancelling drops the active parser, so a
//     superseded load can never deliver a `Completed` message.

use crate::core::model::{DateFormat, EntryList, LoadProgress, LoadSummary};
use crate::core::parser::{ChunkedParser, ParseConfig};
use crate::platform;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Settings fixed for the duration of one load.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub date_format: DateFormat,
    pub reverse_order: bool,
    pub chunk_lines: usize,
}

impl Default for LoadSettings {
    fn default() -> Self {
        let parse = ParseConfig::default();
        Self {
            date_format: parse.date_format,
            reverse_order: false,
            chunk_lines: parse.chunk_lines,
        }
    }
}

/// A load whose text has been read and is being parsed.
#[derive(Debug)]
struct ActiveLoad {
    path: PathBuf,
    file_name: String,
    reverse_order: bool,
    parser: ChunkedParser,
    started: Instant,
}

/// Drives one chat-file load at a time.
#[derive(Debug, Default)]
pub struct LoadManager {
    active: Option<ActiveLoad>,
    queued: VecDeque<LoadProgress>,
    /// Path of the most recently started load, kept for reloads.
    last_path: Option<PathBuf>,
}

impl LoadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and prepare to parse it. Any load already running is
    /// abandoned.
    ///
    /// The read happens immediately; a read failure is queued as
    /// `LoadProgress::Failed` and leaves the manager idle, so calling this
    /// again is always a valid retry.
    pub fn start_load(&mut self, path: &Path, settings: &LoadSettings) {
        self.cancel_load();
        self.last_path = Some(path.to_path_buf());

        let started = Instant::now();
        let file_name = platform::fs::display_name(path);

        let text = match platform::fs::read_chat_file(path) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(error = %error, "Chat file load failed");
                self.queued.push_back(LoadProgress::Failed { error });
                return;
            }
        };

        let parser = ChunkedParser::new(
            &text,
            ParseConfig {
                date_format: settings.date_format,
                chunk_lines: settings.chunk_lines,
            },
        );
        tracing::info!(
            path = %path.display(),
            lines = parser.total_lines(),
            chunk_lines = settings.chunk_lines,
            "Load started"
        );

        self.queued.push_back(LoadProgress::Started {
            file_name: file_name.clone(),
            total_lines: parser.total_lines(),
        });
        self.active = Some(ActiveLoad {
            path: path.to_path_buf(),
            file_name,
            reverse_order: settings.reverse_order,
            parser,
            started,
        });
    }

    /// Re-run the most recent load with new settings. Returns `false` when
    /// nothing has been loaded yet.
    pub fn reload(&mut self, settings: &LoadSettings) -> bool {
        match self.last_path.clone() {
            Some(path) => {
                self.start_load(&path, settings);
                true
            }
            None => false,
        }
    }

    /// Abandon the active load, if any. Parsed entries are discarded.
    pub fn cancel_load(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(
                path = %active.path.display(),
                processed = active.parser.processed_lines(),
                "Load cancelled"
            );
        }
        self.queued.clear();
    }

    /// Forget the most recent path (file closed).
    pub fn forget(&mut self) {
        self.cancel_load();
        self.last_path = None;
    }

    /// Advance the active load by one parse batch and return every message
    /// produced since the previous poll.
    pub fn poll_progress(&mut self) -> Vec<LoadProgress> {
        let mut messages: Vec<LoadProgress> = self.queued.drain(..).collect();

        let Some(active) = self.active.as_mut() else {
            return messages;
        };

        if let Some(step) = active.parser.next() {
            messages.push(LoadProgress::Parsed {
                processed_lines: step.processed_lines,
                total_lines: step.total_lines,
            });
        }

        if active.parser.is_finished() {
            if let Some(done) = self.active.take() {
                messages.push(finish(done));
            }
        }
        messages
    }

    pub fn is_loading(&self) -> bool {
        self.active.is_some()
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

/// Finalise a fully parsed load into its entry list and summary.
fn finish(load: ActiveLoad) -> LoadProgress {
    let total_lines = load.parser.total_lines();
    let entries = EntryList::finalize(load.parser.into_entries(), load.reverse_order);
    let summary = LoadSummary::from_entries(&entries, total_lines, load.started.elapsed());

    tracing::info!(
        path = %load.path.display(),
        entries = summary.entries,
        messages = summary.messages,
        authors = summary.authors,
        elapsed_ms = summary.duration.as_millis() as u64,
        "Load complete"
    );

    LoadProgress::Completed {
        path: load.path,
        file_name: load.file_name,
        entries,
        summary,
    }
}
