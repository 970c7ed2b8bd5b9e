// TalkLog - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "TalkLog";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "TalkLog";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// Number of source lines parsed per cooperative batch.
pub const DEFAULT_CHUNK_LINES: usize = 1_000;

/// Smallest accepted batch size for chunked parsing.
pub const MIN_CHUNK_LINES: usize = 100;

/// Largest accepted batch size for chunked parsing.
pub const MAX_CHUNK_LINES: usize = 100_000;

/// Tokens that disqualify a time-prefixed single-segment line from being a
/// system notice ("invited", "joined").
pub const NOTICE_EXCLUDE_TOKENS: &[&str] = &["招待しました", "参加しました"];

/// Tokens that a system notice must contain ("note", "album").
pub const NOTICE_INCLUDE_TOKENS: &[&str] = &["ノート", "アルバム"];

/// Largest file accepted for loading. Chat exports beyond this are almost
/// certainly the wrong file.
pub const MAX_FILE_SIZE: u64 = 512 * 1024 * 1024; // 512 MB

/// File extensions accepted when a file is dropped on the window.
pub const CHAT_FILE_EXTENSIONS: &[&str] = &["txt"];

/// Accepted date display format settings, in display order.
pub const DATE_FORMAT_CHOICES: &[&str] = &["yyyy/MM/dd", "yyyy年MM月dd日", "MM/dd/yyyy"];

// =============================================================================
// Pagination
// =============================================================================

/// Entries materialised per window page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Smallest user-configurable page size.
pub const MIN_PAGE_SIZE: usize = 10;

/// Largest user-configurable page size.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Distance from the bottom of the chat view (px) at which the next page is
/// requested automatically.
pub const SCROLL_LOAD_THRESHOLD_PX: f32 = 200.0;

// =============================================================================
// Search
// =============================================================================

/// Queries shorter than this many characters never produce results.
pub const MIN_QUERY_CHARS: usize = 2;

// =============================================================================
// Authors
// =============================================================================

/// Colour pool cycled through as new authors are discovered (RGB).
pub const AUTHOR_COLOUR_POOL: [[u8; 3]; 10] = [
    [0xFF, 0x6B, 0x6B],
    [0x4E, 0xCD, 0xC4],
    [0xFF, 0xD1, 0x66],
    [0x87, 0xBC, 0xDE],
    [0xC3, 0x8D, 0x9E],
    [0xE2, 0x7D, 0x60],
    [0x85, 0xCD, 0xCA],
    [0xE8, 0xA8, 0x7C],
    [0xC1, 0xC8, 0xE4],
    [0x88, 0x60, 0xD0],
];

/// Colour used for an author that has not been registered.
pub const UNKNOWN_AUTHOR_COLOUR: [u8; 3] = [0xCC, 0xCC, 0xCC];

/// Maximum number of author colour assignments kept in the session file.
pub const MAX_REMEMBERED_AUTHORS: usize = 5_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in config.toml.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Maximum length of a source line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";

