// TalkLog - ui/panels/options.rs
//
// Options dialog: runtime-configurable settings.
// Shown when the user opens Edit > Options... from the menu bar.
//
// Sections:
//   1. Display  - page size, windowing, my display names, author colours
//   2. Parsing  - date format, reverse order, batch size
//
// Display settings take effect immediately. Parsing settings take effect on
// the next load; "Reload now" re-reads the open file with them.

use crate::app::state::AppState;
use crate::core::model::DateFormat;
use crate::util::constants::{
    DEFAULT_CHUNK_LINES, DEFAULT_PAGE_SIZE, MAX_CHUNK_LINES, MAX_PAGE_SIZE, MIN_CHUNK_LINES,
    MIN_PAGE_SIZE,
};

/// Render the Options dialog (if `state.show_options` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_options {
        return;
    }

    let mut open = true;
    egui::Window::new("Options")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(420.0)
        .show(ctx, |ui| {
            // =========================================================
            // Section 1 - Display
            // =========================================================
            ui.heading("Display");
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Page size:");
                let response = ui.add(
                    egui::DragValue::new(&mut state.page_size_input)
                        .range(MIN_PAGE_SIZE..=MAX_PAGE_SIZE)
                        .suffix(" entries"),
                );
                // Commit only once the drag or text edit ends.
                if response.drag_stopped() || response.lost_focus() {
                    state.commit_page_size_input();
                }
                if state.settings.page_size != DEFAULT_PAGE_SIZE
                    && ui.small_button("Reset").clicked()
                {
                    state.set_page_size(DEFAULT_PAGE_SIZE);
                }
            });

            let mut windowing = state.settings.windowing;
            if ui
                .checkbox(&mut windowing, "Windowed pagination")
                .on_hover_text("When off, the whole chat is rendered at once")
                .changed()
            {
                state.set_windowing(windowing);
            }

            ui.horizontal(|ui| {
                ui.label("My display names:");
                if ui
                    .text_edit_singleline(&mut state.display_names_input)
                    .on_hover_text("Comma separated. Matching authors are shown on the right.")
                    .changed()
                {
                    state.apply_display_names_input();
                }
            });

            render_author_colours(ui, state);

            ui.add_space(2.0);
            ui.label(
                egui::RichText::new("Display settings take effect immediately.")
                    .small()
                    .weak(),
            );

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(6.0);

            // =========================================================
            // Section 2 - Parsing
            // =========================================================
            ui.heading("Parsing");
            ui.add_space(4.0);

            egui::ComboBox::from_label("Date format")
                .selected_text(state.settings.date_format.label())
                .show_ui(ui, |ui| {
                    for format in DateFormat::all() {
                        ui.selectable_value(&mut state.settings.date_format, *format, format.label());
                    }
                });

            ui.checkbox(&mut state.settings.reverse_order, "Newest first (reverse order)");

            ui.horizontal(|ui| {
                ui.label("Lines per parse batch:");
                ui.add(
                    egui::DragValue::new(&mut state.settings.chunk_lines)
                        .range(MIN_CHUNK_LINES..=MAX_CHUNK_LINES)
                        .speed(10),
                );
                if state.settings.chunk_lines != DEFAULT_CHUNK_LINES
                    && ui.small_button("Reset").clicked()
                {
                    state.settings.chunk_lines = DEFAULT_CHUNK_LINES;
                }
            });

            ui.add_space(2.0);
            ui.label(
                egui::RichText::new("Parsing settings apply on the next load.")
                    .small()
                    .weak(),
            );
            ui.add_space(4.0);

            let can_reload = state.current_file.is_some() && !state.load_in_progress;
            if ui
                .add_enabled(can_reload, egui::Button::new("Reload now"))
                .clicked()
            {
                state.reload_requested = true;
            }
        });

    if !open {
        state.show_options = false;
    }
}

/// Colour pickers for the authors of the open document.
fn render_author_colours(ui: &mut egui::Ui, state: &mut AppState) {
    let authors: Vec<String> = state
        .chat
        .entries()
        .authors()
        .into_iter()
        .map(str::to_string)
        .collect();
    if authors.is_empty() {
        return;
    }

    ui.add_space(4.0);
    egui::CollapsingHeader::new(format!("Author colours ({})", authors.len()))
        .id_salt("options_author_colours")
        .show(ui, |ui| {
            egui::ScrollArea::vertical()
                .max_height(160.0)
                .show(ui, |ui| {
                    egui::Grid::new("author_colour_grid")
                        .num_columns(2)
                        .spacing([12.0, 4.0])
                        .show(ui, |ui| {
                            for author in &authors {
                                let mut rgb = state.palette.colour_for(author);
                                if egui::color_picker::color_edit_button_srgb(ui, &mut rgb)
                                    .changed()
                                {
                                    state.set_author_colour(author, rgb);
                                }
                                ui.label(author);
                                ui.end_row();
                            }
                        });
                });
        });
}
