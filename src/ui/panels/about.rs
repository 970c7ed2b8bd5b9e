// TalkLog - ui/panels/about.rs
//
// About dialog: shown from Help > About.
// Rendered as a centred, non-resizable, non-collapsible window.

use crate::app::state::AppState;
use crate::util::constants::{APP_NAME, APP_VERSION};

/// Render the About dialog (if `state.show_about` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_about {
        return;
    }

    let mut open = true;
    egui::Window::new(format!("About {APP_NAME}"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .min_width(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(format!("\u{1f4ac}  {APP_NAME}"))
                        .size(28.0)
                        .strong(),
                );
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!("v{APP_VERSION}"))
                        .size(14.0)
                        .weak(),
                );
            });

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label("A viewer for exported chat histories");
                ui.label("with windowed paging and full-history search.");
            });

            if let Some(summary) = &state.load_summary {
                ui.add_space(10.0);
                ui.separator();
                ui.add_space(6.0);
                egui::Grid::new("about_load_summary")
                    .num_columns(2)
                    .spacing([24.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Lines read:");
                        ui.label(summary.total_lines.to_string());
                        ui.end_row();
                        ui.label("Messages:");
                        ui.label(summary.messages.to_string());
                        ui.end_row();
                        ui.label("Notices:");
                        ui.label(summary.notices.to_string());
                        ui.end_row();
                        ui.label("Days:");
                        ui.label(summary.date_markers.to_string());
                        ui.end_row();
                        ui.label("Authors:");
                        ui.label(summary.authors.to_string());
                        ui.end_row();
                    });
            }

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(6.0);

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Built with Rust & egui").small().weak());
                if state.debug_mode {
                    ui.label(egui::RichText::new("Debug logging enabled").small().weak());
                }
            });

            ui.add_space(8.0);
        });

    if !open {
        state.show_about = false;
    }
}
