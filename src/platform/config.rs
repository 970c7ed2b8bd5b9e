// TalkLog - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for TalkLog configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/talklog/ or %APPDATA%\TalkLog\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the session file.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self::in_dir(PathBuf::from("."))
        }
    }

    /// Use one directory for both config and data (`--config-dir`).
    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            config_dir: dir.clone(),
            data_dir: dir,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join(constants::SESSION_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[display]` section.
    pub display: DisplaySection,
    /// `[parsing]` section.
    pub parsing: ParsingSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[display]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Reverse the entry order after parsing.
    pub reverse_order: Option<bool>,
    /// One of `DATE_FORMAT_CHOICES`.
    pub date_format: Option<String>,
    /// Entries per window page.
    pub page_size: Option<usize>,
    /// Windowed pagination on/off.
    pub windowing: Option<bool>,
    /// Names treated as the local user.
    pub my_display_names: Option<Vec<String>>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Lines per cooperative parse batch.
    pub chunk_lines: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce a warning and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub reverse_order: bool,
    /// Always one of `DATE_FORMAT_CHOICES`.
    pub date_format: String,
    pub page_size: usize,
    pub windowing: bool,
    pub my_display_names: Vec<String>,
    pub chunk_lines: usize,
    /// Logging level string (read before tracing is initialised).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reverse_order: false,
            date_format: constants::DATE_FORMAT_CHOICES[0].to_string(),
            page_size: constants::DEFAULT_PAGE_SIZE,
            windowing: true,
            my_display_names: Vec::new(),
            chunk_lines: constants::DEFAULT_CHUNK_LINES,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from `config_dir`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings; an unreadable or unparseable file
/// yields defaults with one warning.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path,
                source,
            };
            tracing::warn!(error = %err, "Using default configuration");
            return (AppConfig::default(), vec![err]);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path,
                source,
            };
            tracing::warn!(error = %err, "Using default configuration");
            return (AppConfig::default(), vec![err]);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, warnings) = validate(raw);
    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }
    (config, warnings)
}

/// Validate each field against named constants, accumulating all errors.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(reverse) = raw.display.reverse_order {
        config.reverse_order = reverse;
    }
    if let Some(windowing) = raw.display.windowing {
        config.windowing = windowing;
    }

    // -- Display: date_format --
    if let Some(format) = raw.display.date_format {
        if constants::DATE_FORMAT_CHOICES.contains(&format.trim()) {
            config.date_format = format.trim().to_string();
        } else {
            warnings.push(ConfigError::UnrecognisedValue {
                field: "[display] date_format",
                value: format,
                expected: "yyyy/MM/dd, yyyy年MM月dd日, MM/dd/yyyy",
            });
        }
    }

    // -- Display: page_size --
    if let Some(size) = raw.display.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[display] page_size",
                value: size.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_PAGE_SIZE,
                    constants::MAX_PAGE_SIZE
                ),
            });
        }
    }

    // -- Display: my_display_names --
    if let Some(names) = raw.display.my_display_names {
        config.my_display_names = normalise_names(names);
    }

    // -- Parsing: chunk_lines --
    if let Some(lines) = raw.parsing.chunk_lines {
        if (constants::MIN_CHUNK_LINES..=constants::MAX_CHUNK_LINES).contains(&lines) {
            config.chunk_lines = lines;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[parsing] chunk_lines",
                value: lines.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_CHUNK_LINES,
                    constants::MAX_CHUNK_LINES
                ),
            });
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(ConfigError::UnrecognisedValue {
                field: "[logging] level",
                value: level,
                expected: "error, warn, info, debug, trace",
            });
        }
    }

    (config, warnings)
}

/// Trim display names and drop blanks, keeping order.
pub fn normalise_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}
