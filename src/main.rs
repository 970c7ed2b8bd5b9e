// TalkLog - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. Session restore and eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use talklog::app;

pub use talklog::core;
pub use talklog::platform;
pub use talklog::ui;
pub use talklog::util;

use clap::Parser;
use std::path::PathBuf;

/// System fonts with Japanese coverage, tried in order.
///
/// egui's built-in fonts have no CJK glyphs, so chat logs would otherwise
/// render as squares. The first font that loads is appended as a fallback.
const CJK_FONT_CANDIDATES: &[(&str, &str)] = &[
    ("Meiryo", r"C:\Windows\Fonts\meiryo.ttc"),
    ("Yu Gothic", r"C:\Windows\Fonts\YuGothM.ttc"),
    ("MS Gothic", r"C:\Windows\Fonts\msgothic.ttc"),
    ("Hiragino Sans", "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc"),
    ("Arial Unicode", "/Library/Fonts/Arial Unicode.ttf"),
    (
        "Noto Sans CJK",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ),
    (
        "Noto Sans CJK",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    ),
    (
        "Noto Sans CJK",
        "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    ),
    (
        "IPAGothic",
        "/usr/share/fonts/opentype/ipafont-gothic/ipag.ttf",
    ),
];

/// Configure fonts for the egui context.
///
/// Appends the first available CJK system font to both families so the
/// egui defaults keep priority for Latin text.
fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    let loaded = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|(name, path)| match std::fs::read(path) {
            Ok(data) => Some((*name, data)),
            Err(_) => None,
        });

    let Some((name, data)) = loaded else {
        tracing::warn!("No CJK system font found; Japanese text may render as squares");
        return;
    };

    fonts
        .font_data
        .insert(name.to_owned(), egui::FontData::from_owned(data).into());
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            list.push(name.to_owned());
        }
    }
    ctx.set_fonts(fonts);
    tracing::info!(font = name, "CJK fallback font configured");
}

/// TalkLog - Viewer for exported chat histories.
///
/// Open a chat export to browse it page by page and search the whole
/// history.
#[derive(Parser, Debug)]
#[command(name = "TalkLog", version, about)]
struct Cli {
    /// Chat export to open at startup (opens nothing if omitted).
    path: Option<PathBuf>,

    /// Show the newest entries first.
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Date marker format: "yyyy/MM/dd", "yyyy年MM月dd日" or "MM/dd/yyyy".
    #[arg(long = "date-format")]
    date_format: Option<String>,

    /// Entries per window page.
    #[arg(long = "page-size")]
    page_size: Option<usize>,

    /// Render the whole chat at once instead of paging.
    #[arg(long = "no-windowing")]
    no_windowing: bool,

    /// Display names treated as yourself (comma separated).
    #[arg(long = "me", value_delimiter = ',')]
    me: Vec<String>,

    /// Directory holding config.toml and the session file.
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Apply command-line overrides on top of the loaded config.
///
/// Returns a warning for each rejected value; the config value stays.
fn apply_cli_overrides(cli: &Cli, config: &mut platform::config::AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if cli.reverse {
        config.reverse_order = true;
    }
    if cli.no_windowing {
        config.windowing = false;
    }

    if let Some(format) = &cli.date_format {
        match crate::core::model::DateFormat::parse(format) {
            Some(parsed) => config.date_format = parsed.label().to_string(),
            None => warnings.push(format!(
                "--date-format \"{format}\" not recognised; expected one of {}",
                util::constants::DATE_FORMAT_CHOICES.join(", ")
            )),
        }
    }

    if let Some(size) = cli.page_size {
        let range = util::constants::MIN_PAGE_SIZE..=util::constants::MAX_PAGE_SIZE;
        if range.contains(&size) {
            config.page_size = size;
        } else {
            warnings.push(format!(
                "--page-size {size} out of range ({}-{})",
                range.start(),
                range.end()
            ));
        }
    }

    let names = platform::config::normalise_names(&cli.me);
    if !names.is_empty() {
        config.my_display_names = names;
    }

    warnings
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths: CLI override > platform default
    let platform_paths = match &cli.config_dir {
        Some(dir) => platform::config::PlatformPaths::in_dir(dir.clone()),
        None => platform::config::PlatformPaths::resolve(),
    };

    // Config is read first so its [logging] level can seed the subscriber.
    let (mut config, config_errors) = platform::config::load_config(&platform_paths.config_dir);

    // Initialise logging subsystem
    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %platform_paths.config_file().display(),
        "TalkLog starting"
    );

    let mut warnings: Vec<String> = config_errors
        .into_iter()
        .map(|e| util::error::TalkLogError::from(e).to_string())
        .collect();
    warnings.extend(apply_cli_overrides(&cli, &mut config));
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Startup configuration warning");
    }

    // Create application state
    let settings = app::state::Settings::from_config(&config);
    let palette = app::authors::AuthorPalette::new(config.my_display_names.clone());
    let mut state = app::state::AppState::new(settings, palette, cli.debug);
    state.session_path = Some(platform_paths.session_file());
    state.restore_session();
    state.warnings = warnings;

    // A path given on the CLI replaces the reopened last file
    if let Some(path) = cli.path.clone() {
        state.pending_open = Some(path);
    }

    tracing::info!("Ready to launch GUI");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([900.0, 800.0])
            .with_min_inner_size([480.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            Ok(Box::new(gui::TalkLogApp::new(state)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch TalkLog GUI: {e}");
        std::process::exit(1);
    }
}
