// TalkLog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Parsing, pagination and search never fail; only the surrounding I/O,
// configuration and session layers produce errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all TalkLog operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TalkLogError {
    /// A chat-log file could not be read.
    Load(LoadError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Session persistence failed.
    Session(SessionError),
}

impl fmt::Display for TalkLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Session(e) => write!(f, "Session error: {e}"),
        }
    }
}

impl std::error::Error for TalkLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Session(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// The single terminal failure of a load attempt. Loader state stays
/// consistent after this is reported, so a retry is always safe.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    Io { path: PathBuf, source: io::Error },

    /// The path exists but is not a regular file.
    NotAFile { path: PathBuf },

    /// The file exceeds the maximum accepted size.
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            Self::NotAFile { path } => {
                write!(f, "'{}' is not a regular file", path.display())
            }
            Self::TooLarge { path, size, max } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max} bytes",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoadError> for TalkLogError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading. Returned as non-fatal warnings:
/// the offending value falls back to its default.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io { path: PathBuf, source: io::Error },

    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A numeric config value is out of the allowed range.
    ValueOutOfRange {
        field: &'static str,
        value: String,
        expected: String,
    },

    /// A string config value is not one of the accepted choices.
    UnrecognisedValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::UnrecognisedValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is not recognised. Expected one of: {expected}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::TomlParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for TalkLogError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Errors raised while saving the session file.
#[derive(Debug)]
pub enum SessionError {
    /// The data directory could not be created.
    CreateDir { path: PathBuf, source: io::Error },

    /// The session could not be serialised.
    Serialise { source: serde_json::Error },

    /// The temporary session file could not be written.
    Write { path: PathBuf, source: io::Error },

    /// The temporary file could not be renamed over the session file.
    Rename { path: PathBuf, source: io::Error },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create session directory '{}': {source}",
                path.display()
            ),
            Self::Serialise { source } => write!(f, "failed to serialise session: {source}"),
            Self::Write { path, source } => write!(
                f,
                "failed to write session temp file '{}': {source}",
                path.display()
            ),
            Self::Rename { path, source } => write!(
                f,
                "failed to finalise session file '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Serialise { source } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::Rename { source, .. } => Some(source),
        }
    }
}

impl From<SessionError> for TalkLogError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}
