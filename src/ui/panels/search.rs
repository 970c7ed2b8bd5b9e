// TalkLog - ui/panels/search.rs
//
// Search bar: query input, previous/next navigation and result statistics.
// Searches run on Enter or the Search button, never per keystroke.

use crate::app::state::AppState;
use crate::core::search::Direction;
use crate::util::constants;

/// Render the search bar (top panel, below the menu).
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let loaded = state.chat.is_loaded();

    ui.add_enabled_ui(loaded, |ui| {
        ui.horizontal(|ui| {
            ui.label("Search:");
            let input = ui.add(
                egui::TextEdit::singleline(&mut state.search_input)
                    .hint_text(format!("at least {} characters", constants::MIN_QUERY_CHARS))
                    .desired_width(240.0),
            );
            let submitted =
                input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.button("Search").clicked() || submitted {
                state.submit_search();
                if submitted {
                    input.request_focus();
                }
            }

            let has_matches = state.chat.search_state().counts().global > 0;
            ui.add_enabled_ui(has_matches, |ui| {
                if ui
                    .button("\u{25b2}")
                    .on_hover_text("Previous match")
                    .clicked()
                {
                    state.navigate_search(Direction::Backward);
                }
                if ui.button("\u{25bc}").on_hover_text("Next match").clicked() {
                    state.navigate_search(Direction::Forward);
                }
            });

            if state.chat.search_state().is_active() && ui.button("Clear").clicked() {
                state.clear_search();
            }

            if let Some(stats) = state.chat.search_state().status_text() {
                ui.separator();
                ui.label(stats);
            }
        });
    });
}
