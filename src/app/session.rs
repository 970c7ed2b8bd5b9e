// TalkLog - app/session.rs
//
// Session persistence: author colour assignments and the last opened file,
// kept between application restarts.
//
// - Saved atomically (write temp, rename over final) so a crash during save
//   never corrupts the previous good session.
// - Load problems of any kind mean "start fresh"; they are logged, never
//   surfaced.
// - Chat entries are never persisted; files are re-parsed when opened.

use crate::app::authors::AuthorPalette;
use crate::util::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp. Sessions with any other version are discarded.
pub const SESSION_VERSION: u32 = 1;

/// Complete persistent session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Schema version; must equal `SESSION_VERSION` to be accepted.
    pub version: u32,

    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,

    /// File open when the session was saved.
    #[serde(default)]
    pub last_file: Option<PathBuf>,

    /// Author colours as `(author, [r, g, b])` in assignment order.
    #[serde(default)]
    pub author_colours: Vec<(String, [u8; 3])>,

    /// Pool index for the next new author.
    #[serde(default)]
    pub next_colour: usize,
}

impl SessionData {
    /// Snapshot the palette and current file.
    pub fn capture(palette: &AuthorPalette, last_file: Option<&Path>) -> Self {
        Self {
            version: SESSION_VERSION,
            saved_at: Utc::now(),
            last_file: last_file.map(Path::to_path_buf),
            author_colours: palette.to_persisted(),
            next_colour: palette.next_colour(),
        }
    }

    /// Rebuild the palette, attaching the configured self names.
    pub fn restore_palette(&self, self_names: Vec<String>) -> AuthorPalette {
        AuthorPalette::from_persisted(self.author_colours.clone(), self.next_colour, self_names)
    }
}

/// Save `data` to `path` atomically (write temp, then rename).
///
/// Creates parent directories as needed.
pub fn save(data: &SessionData, path: &Path) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SessionError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json =
        serde_json::to_string_pretty(data).map_err(|source| SessionError::Serialise { source })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes()).map_err(|source| SessionError::Write {
        path: tmp.clone(),
        source,
    })?;

    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        SessionError::Rename {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::debug!(
        path = %path.display(),
        authors = data.author_colours.len(),
        "Session saved"
    );
    Ok(())
}

/// Load and validate a session from `path`.
///
/// Returns `None` on any problem (missing file, malformed JSON, version
/// mismatch). `None` means "start fresh".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read session file");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Session file is malformed; starting fresh"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Session file version mismatch; starting fresh"
        );
        return None;
    }

    tracing::info!(
        path = %path.display(),
        saved_at = %data.saved_at,
        "Session file loaded"
    );
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_data() -> SessionData {
        let mut palette = AuthorPalette::default();
        palette.register_authors(["Alice", "Bob"]);
        SessionData::capture(&palette, Some(Path::new("/tmp/chat.txt")))
    }

    #[test]
    fn test_session_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let original = sample_data();

        save(&original, &path).expect("save should succeed");
        let loaded = load(&path).expect("load should return Some after valid save");
        assert_eq!(loaded, original);

        let palette = loaded.restore_palette(vec!["Bob".to_string()]);
        assert_eq!(palette.colour_for("Alice"), original.author_colours[0].1);
        assert!(palette.is_self("Bob"));
    }

    #[test]
    fn test_session_round_trip_keeps_colour_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut palette = AuthorPalette::default();
        palette.register_authors(["Alice", "Bob"]);
        palette.set_colour("Bob", [10, 20, 30]);

        save(&SessionData::capture(&palette, None), &path).unwrap();
        let restored = load(&path).unwrap().restore_palette(Vec::new());
        assert_eq!(restored.colour_for("Bob"), [10, 20, 30]);
        assert_eq!(restored.colour_for("Alice"), palette.colour_for("Alice"));
    }

    #[test]
    fn test_session_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("session.json");
        save(&sample_data(), &path).expect("save should create parents");
        assert!(path.exists());
    }

    #[test]
    fn test_session_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("nonexistent.json")).is_none());
    }

    #[test]
    fn test_session_load_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not valid json {{{{").unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_session_load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut data = sample_data();
        data.version = 99;
        save(&data, &path).unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_session_save_overwrites_leftover_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        save(&sample_data(), &path).unwrap();

        std::fs::write(path.with_extension("json.tmp"), b"garbage").unwrap();

        let mut updated = sample_data();
        updated.next_colour = 7;
        save(&updated, &path).unwrap();

        assert_eq!(load(&path).unwrap().next_colour, 7);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
