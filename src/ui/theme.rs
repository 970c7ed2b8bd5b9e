// TalkLog - ui/theme.rs
//
// Colour scheme and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Convert an RGB triple from the author palette.
pub fn author_colour(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Bubble background for messages from the local user.
pub const SELF_BUBBLE_BG: Color32 = Color32::from_rgb(133, 226, 118); // LINE green
/// Bubble background for everyone else.
pub const OTHER_BUBBLE_BG: Color32 = Color32::from_rgb(240, 240, 240);
/// Message text inside bubbles (bubbles are light in both themes).
pub const BUBBLE_TEXT: Color32 = Color32::from_rgb(17, 24, 39); // Gray 900

/// Initial-letter avatar beside other authors' bubbles.
pub const AVATAR_DIAMETER: f32 = 28.0;
pub const AVATAR_TEXT: Color32 = Color32::WHITE;

/// Date separator pill.
pub const DATE_PILL_BG: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500
pub const DATE_PILL_TEXT: Color32 = Color32::WHITE;

/// System notice text.
pub const NOTICE_TEXT: Color32 = Color32::from_rgb(156, 163, 175); // Gray 400

/// Search highlights.
pub const MATCH_BG: Color32 = Color32::from_rgb(253, 224, 71); // Yellow 300
pub const CURRENT_MATCH_BG: Color32 = Color32::from_rgb(251, 146, 60); // Orange 400
pub const CURRENT_MATCH_STROKE: Color32 = Color32::from_rgb(234, 88, 12); // Orange 600

/// Status bar colours.
pub const STATUS_BG: Color32 = Color32::from_rgb(31, 41, 55); // Gray 800
pub const STATUS_TEXT: Color32 = Color32::from_rgb(209, 213, 219); // Gray 300

/// Layout constants.
pub const BUBBLE_MAX_WIDTH_FRACTION: f32 = 0.7;
pub const BUBBLE_ROUNDING: u8 = 10;
pub const BUBBLE_PADDING: i8 = 8;
pub const AUTHOR_FONT_SIZE: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 14.0;
pub const TIME_FONT_SIZE: f32 = 10.0;
pub const STATUS_BAR_HEIGHT: f32 = 28.0;
