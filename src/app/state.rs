// TalkLog - app/state.rs
//
// Application state management. Holds the loaded chat session, settings,
// author palette, search input and status.
// Owned by the eframe::App implementation.

use crate::app::authors::AuthorPalette;
use crate::app::loader::LoadSettings;
use crate::app::session::{self, SessionData};
use crate::core::chat::ChatSession;
use crate::core::model::{DateFormat, LoadProgress, LoadSummary};
use crate::core::search::Direction;
use crate::platform::config::{normalise_names, AppConfig};
use crate::platform::fs::is_chat_export;
use crate::util::constants;
use crate::util::error::TalkLogError;
use std::path::PathBuf;

/// User-adjustable display and parsing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Applied on the next (re)load.
    pub reverse_order: bool,
    /// Applied on the next (re)load.
    pub date_format: DateFormat,
    pub page_size: usize,
    pub windowing: bool,
    pub chunk_lines: usize,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            reverse_order: config.reverse_order,
            date_format: DateFormat::from_setting(&config.date_format),
            page_size: config.page_size,
            windowing: config.windowing,
            chunk_lines: config.chunk_lines,
        }
    }

    pub fn load_settings(&self) -> LoadSettings {
        LoadSettings {
            date_format: self.date_format,
            reverse_order: self.reverse_order,
            chunk_lines: self.chunk_lines,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,

    /// Entries, window and search for the open file.
    pub chat: ChatSession,

    /// Author colours and self names.
    pub palette: AuthorPalette,

    /// Display name of the open (or loading) file.
    pub file_name: Option<String>,

    /// Path of the open file.
    pub current_file: Option<PathBuf>,

    /// Summary of the most recent completed load.
    pub load_summary: Option<LoadSummary>,

    /// Whether a load is in progress.
    pub load_in_progress: bool,

    /// Text in the search box (not yet submitted).
    pub search_input: String,

    /// Comma-separated display names being edited in the options dialog.
    pub display_names_input: String,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal warnings (config problems, load failures).
    pub warnings: Vec<String>,

    /// File the host should start loading on its next frame.
    pub pending_open: Option<PathBuf>,

    /// Set when the open file must be re-read with the current settings.
    pub reload_requested: bool,

    /// Set when the open file should be closed.
    pub close_requested: bool,

    pub show_options: bool,
    pub show_about: bool,

    /// Session file location. `None` disables persistence.
    pub session_path: Option<PathBuf>,

    /// Set when session data changed without being saved yet.
    pub session_dirty: bool,

    /// Page size being edited in the options dialog, committed when the
    /// edit finishes.
    pub page_size_input: usize,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(settings: Settings, palette: AuthorPalette, debug_mode: bool) -> Self {
        let chat = ChatSession::new(settings.page_size, settings.windowing);
        let display_names_input = palette.self_names().join(", ");
        let page_size_input = settings.page_size;
        Self {
            settings,
            chat,
            palette,
            file_name: None,
            current_file: None,
            load_summary: None,
            load_in_progress: false,
            search_input: String::new(),
            display_names_input,
            status_message: "Ready. Open a chat export to begin.".to_string(),
            warnings: Vec::new(),
            pending_open: None,
            reload_requested: false,
            close_requested: false,
            show_options: false,
            show_about: false,
            session_path: None,
            session_dirty: false,
            page_size_input,
            debug_mode,
        }
    }

    /// Restore persisted palette assignments, if a valid session exists,
    /// and queue the last open file for reopening when it still exists.
    pub fn restore_session(&mut self) {
        let Some(path) = self.session_path.as_deref() else {
            return;
        };
        let Some(data) = session::load(path) else {
            return;
        };
        let names = self.palette.self_names().to_vec();
        self.palette = data.restore_palette(names);

        match data.last_file {
            Some(last) if last.is_file() => {
                tracing::info!(path = %last.display(), "Reopening last file");
                self.pending_open = Some(last);
            }
            Some(last) => {
                tracing::debug!(path = %last.display(), "Last file no longer exists");
            }
            None => {}
        }
    }

    /// Persist the palette and current file. Failures are logged only.
    pub fn save_session(&mut self) {
        let Some(path) = self.session_path.as_deref() else {
            return;
        };
        let data = SessionData::capture(&self.palette, self.current_file.as_deref());
        match session::save(&data, path) {
            Ok(()) => self.session_dirty = false,
            Err(e) => {
                tracing::warn!(error = %TalkLogError::from(e), "Session save failed");
            }
        }
    }

    /// Override an author's colour. The session is saved by the host once
    /// the edit settles.
    pub fn set_author_colour(&mut self, author: &str, colour: [u8; 3]) {
        self.palette.set_colour(author, colour);
        self.session_dirty = true;
    }

    /// Queue a dropped file for opening, or warn when it is not a chat
    /// export. Returns whether the file was accepted.
    pub fn accept_dropped_file(&mut self, path: PathBuf) -> bool {
        if is_chat_export(&path) {
            self.pending_open = Some(path);
            return true;
        }
        let warning = format!(
            "Ignored dropped file (not a .txt chat export): {}",
            path.display()
        );
        tracing::warn!(path = %path.display(), "Dropped file rejected");
        self.status_message = warning.clone();
        self.warnings.push(warning);
        false
    }

    /// Apply one message from the loader.
    pub fn apply_progress(&mut self, progress: LoadProgress) {
        match progress {
            LoadProgress::Started {
                file_name,
                total_lines,
            } => {
                self.load_in_progress = true;
                self.status_message = format!("Parsing {file_name} ({total_lines} lines)...");
                self.file_name = Some(file_name);
            }
            LoadProgress::Parsed {
                processed_lines,
                total_lines,
            } => {
                let pct = if total_lines == 0 {
                    100
                } else {
                    processed_lines * 100 / total_lines
                };
                self.status_message =
                    format!("Parsing... ({processed_lines}/{total_lines} lines, {pct}%)");
            }
            LoadProgress::Completed {
                path,
                file_name,
                entries,
                summary,
            } => {
                let discovered = self.palette.register_authors(entries.authors());
                if !discovered.is_empty() {
                    tracing::info!(authors = ?discovered, "New authors discovered");
                }

                self.chat.load(entries);
                self.search_input.clear();
                self.status_message = format!(
                    "Loaded {} entries ({} messages) from {} lines in {:.2}s",
                    summary.entries,
                    summary.messages,
                    summary.total_lines,
                    summary.duration.as_secs_f64()
                );
                self.file_name = Some(file_name);
                self.current_file = Some(path);
                self.load_summary = Some(summary);
                self.load_in_progress = false;
                self.save_session();
            }
            LoadProgress::Failed { error } => {
                self.status_message = format!("Load failed: {error}");
                self.warnings.push(TalkLogError::from(error).to_string());
                self.load_in_progress = false;
            }
        }
    }

    /// Drop the open file and everything derived from it.
    pub fn close_file(&mut self) {
        self.chat.close();
        self.file_name = None;
        self.current_file = None;
        self.load_summary = None;
        self.load_in_progress = false;
        self.search_input.clear();
        self.status_message = "Ready.".to_string();
    }

    /// Submit the search box contents.
    pub fn submit_search(&mut self) {
        let query = self.search_input.trim().to_string();
        let counts = self.chat.search(&query);
        tracing::debug!(
            window = counts.window,
            global = counts.global,
            "Search submitted"
        );
    }

    pub fn navigate_search(&mut self, direction: Direction) {
        self.chat.navigate(direction);
    }

    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.chat.clear_search();
    }

    /// Change page size; the window restarts immediately.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.settings.page_size = page_size;
        self.page_size_input = page_size;
        self.chat.set_page_size(page_size);
    }

    /// Apply the edited page size once the edit has finished. Returns
    /// `false` when the value is unchanged, leaving the window alone.
    pub fn commit_page_size_input(&mut self) -> bool {
        let size = self
            .page_size_input
            .clamp(constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE);
        if size == self.settings.page_size {
            self.page_size_input = size;
            return false;
        }
        self.set_page_size(size);
        true
    }

    /// Toggle windowing; the window restarts immediately.
    pub fn set_windowing(&mut self, enabled: bool) {
        self.settings.windowing = enabled;
        self.chat.set_windowing(enabled);
    }

    /// Parse `display_names_input` and apply it. Layout updates on the next
    /// frame.
    pub fn apply_display_names_input(&mut self) {
        let names = normalise_names(self.display_names_input.split(','));
        tracing::debug!(names = ?names, "Display names updated");
        self.palette.set_self_names(names);
    }
}
