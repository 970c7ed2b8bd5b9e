// TalkLog - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the UI panels and drives the cooperative work queue.
//
// Each frame:
//   1. Pump the chat session, completing a page scheduled on an earlier frame.
//   2. Handle requests raised by panels (open, reload, close).
//   3. Advance the loader by one parse batch.
//   4. Render panels, which may schedule new pages for the next frame.

use crate::app::loader::LoadManager;
use crate::app::state::AppState;
use crate::ui;
use crate::util::constants;
use std::path::PathBuf;

/// The TalkLog application.
pub struct TalkLogApp {
    pub state: AppState,
    pub loader: LoadManager,
}

impl TalkLogApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            loader: LoadManager::new(),
        }
    }

    fn start_load(&mut self, path: PathBuf) {
        self.state.load_in_progress = true;
        self.state.status_message = format!("Opening {}...", path.display());
        let settings = self.state.settings.load_settings();
        self.loader.start_load(&path, &settings);
    }

    fn handle_requests(&mut self, ctx: &egui::Context) {
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .find_map(|f| f.path.clone())
        });
        if let Some(path) = dropped {
            self.state.accept_dropped_file(path);
        }

        if let Some(path) = self.state.pending_open.take() {
            self.start_load(path);
        }

        if self.state.reload_requested {
            self.state.reload_requested = false;
            let settings = self.state.settings.load_settings();
            if self.loader.reload(&settings) {
                self.state.load_in_progress = true;
            }
        }

        if self.state.close_requested {
            self.state.close_requested = false;
            self.loader.forget();
            self.state.close_file();
            self.state.save_session();
        }
    }
}

impl eframe::App for TalkLogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let pumped = self.state.chat.pump();

        self.handle_requests(ctx);

        for msg in self.loader.poll_progress() {
            self.state.apply_progress(msg);
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open\u{2026}").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Chat export", constants::CHAT_FILE_EXTENSIONS)
                            .pick_file()
                        {
                            self.state.pending_open = Some(path);
                        }
                        ui.close_menu();
                    }
                    let has_file = self.state.current_file.is_some();
                    ui.add_enabled_ui(has_file && !self.state.load_in_progress, |ui| {
                        if ui.button("Reload").clicked() {
                            self.state.reload_requested = true;
                            ui.close_menu();
                        }
                    });
                    ui.add_enabled_ui(has_file || self.state.load_in_progress, |ui| {
                        if ui.button("Close").clicked() {
                            self.state.close_requested = true;
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Edit", |ui| {
                    if ui.button("Options\u{2026}").clicked() {
                        self.state.show_options = true;
                        ui.close_menu();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.state.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Search bar
        egui::TopBottomPanel::top("search_bar").show(ctx, |ui| {
            ui.add_space(2.0);
            ui::panels::search::render(ui, &mut self.state);
            ui.add_space(2.0);
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::new()
                    .fill(ui::theme::STATUS_BG)
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.state.load_in_progress {
                        ui.spinner();
                    }
                    ui.label(
                        egui::RichText::new(&self.state.status_message)
                            .color(ui::theme::STATUS_TEXT),
                    );
                    if self.loader.is_loading() && ui.small_button("Cancel").clicked() {
                        self.loader.cancel_load();
                        self.state.load_in_progress = false;
                        self.state.status_message = "Load cancelled.".to_string();
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if !self.state.warnings.is_empty() {
                            ui.label(
                                egui::RichText::new(format!(
                                    "\u{26a0} {}",
                                    self.state.warnings.len()
                                ))
                                .color(ui::theme::STATUS_TEXT),
                            )
                            .on_hover_text(self.state.warnings.join("\n"));
                            ui.separator();
                        }
                        let window = self.state.chat.window();
                        if self.state.chat.is_loaded() {
                            let range = window.visible_range();
                            ui.label(
                                egui::RichText::new(format!(
                                    "{}-{} of {} entries",
                                    range.start + usize::from(!range.is_empty()),
                                    range.end,
                                    window.total()
                                ))
                                .color(ui::theme::STATUS_TEXT),
                            );
                        }
                        if let Some(name) = &self.state.file_name {
                            ui.separator();
                            ui.label(egui::RichText::new(name).color(ui::theme::STATUS_TEXT));
                        }
                    });
                });
            });

        // Central panel (chat)
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::chat::render(ui, &mut self.state);
        });

        ui::panels::options::render(ctx, &mut self.state);
        ui::panels::about::render(ctx, &mut self.state);

        // Colour edits are saved once the pointer is released.
        if self.state.session_dirty && !ctx.input(|i| i.pointer.any_down()) {
            self.state.save_session();
        }

        // Keep frames coming while a batch or page is outstanding.
        if pumped
            || self.loader.is_loading()
            || self.state.chat.has_pending_work()
            || self.state.pending_open.is_some()
            || self.state.reload_requested
            || self.state.close_requested
        {
            ctx.request_repaint();
        }
    }

    /// Called by eframe when the application window is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.save_session();
    }
}
