// TalkLog - platform/fs.rs
//
// Filesystem access for chat exports.

use crate::util::constants;
use crate::util::error::LoadError;
use std::path::Path;

/// Read a chat export as text.
///
/// The path must be a regular file no larger than `MAX_FILE_SIZE`. Invalid
/// UTF-8 is decoded lossily; the resulting replacement characters are
/// removed later by the encoding repair pass.
pub fn read_chat_file(path: &Path) -> Result<String, LoadError> {
    read_chat_file_limited(path, constants::MAX_FILE_SIZE)
}

fn read_chat_file_limited(path: &Path, max: u64) -> Result<String, LoadError> {
    let metadata = std::fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_file() {
        return Err(LoadError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    if metadata.len() > max {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max,
        });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        "Chat file read"
    );
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Whether `path` looks like a chat export (`.txt`, any case).
pub fn is_chat_export(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            constants::CHAT_FILE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// File name for display, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
