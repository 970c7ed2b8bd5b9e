// TalkLog - ui/panels/chat.rs
//
// Chat window: renders the materialised window of entries as a
// conversation, with search highlighting and windowed pagination.
//
// Only `ChatSession::visible_entries` are ever laid out. More entries arrive
// through the "Load more" button or by scrolling near the bottom; both go
// through `ChatSession::load_more`, whose loading guard drops the second of
// two close triggers.

use crate::app::authors::AuthorPalette;
use crate::app::state::AppState;
use crate::core::model::{Entry, EntryKind};
use crate::core::search::SearchEngine;
use crate::ui::theme;
use crate::util::constants;
use egui::text::{LayoutJob, TextFormat};
use egui::{Align, Layout, RichText};
use std::ops::Range;

/// Window changes requested while rendering, applied once the scroll area
/// releases its borrow of the session.
enum ChatAction {
    LoadMore,
    ShowEarlier(usize),
}

/// Read-only inputs for rendering one entry.
struct RenderContext<'a> {
    palette: &'a AuthorPalette,
    search: &'a SearchEngine,
    bubble_width: f32,
}

/// Render the chat panel (central area).
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    if !state.chat.is_loaded() {
        ui.centered_and_justified(|ui| {
            if state.load_in_progress {
                ui.spinner();
            } else {
                ui.label("No chat loaded.\nOpen a chat export via File \u{2192} Open.");
            }
        });
        return;
    }
    if state.chat.entries().is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(empty_document_text(state.file_name.as_deref()));
        });
        return;
    }

    let scroll_target = state.chat.take_scroll_target();
    let window = state.chat.window();
    let visible = window.visible_range();
    let shows_controls = window.shows_pagination_controls();
    let windowing = window.windowing_enabled();
    let (loaded_to, total) = (window.start_index(), window.total());

    let ctx = RenderContext {
        palette: &state.palette,
        search: state.chat.search_state(),
        bubble_width: ui.available_width() * theme::BUBBLE_MAX_WIDTH_FRACTION,
    };
    let mut action: Option<ChatAction> = None;

    let output = egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            if windowing && visible.start > 0 {
                ui.vertical_centered(|ui| {
                    if ui.button("Load earlier messages").clicked() {
                        action = Some(ChatAction::ShowEarlier(visible.start - 1));
                    }
                });
                ui.add_space(4.0);
            }

            for entry in state.chat.visible_entries() {
                let response = render_entry(ui, entry, &ctx);
                if scroll_target == Some(entry.global_index) {
                    response.scroll_to_me(Some(Align::Center));
                }
                ui.add_space(4.0);
            }

            if shows_controls {
                ui.add_space(4.0);
                ui.vertical_centered(|ui| {
                    if ui
                        .button(format!("Load more ({loaded_to} of {total})"))
                        .clicked()
                    {
                        action = Some(ChatAction::LoadMore);
                    }
                });
            }
        });

    let from_bottom =
        output.content_size.y - (output.state.offset.y + output.inner_rect.height());
    if shows_controls && action.is_none() && from_bottom < constants::SCROLL_LOAD_THRESHOLD_PX {
        action = Some(ChatAction::LoadMore);
    }

    match action {
        Some(ChatAction::LoadMore) => {
            state.chat.load_more(false);
        }
        Some(ChatAction::ShowEarlier(global_index)) => {
            state.chat.jump_to(global_index);
        }
        None => {}
    }
}

fn render_entry(ui: &mut egui::Ui, entry: &Entry, ctx: &RenderContext<'_>) -> egui::Response {
    match &entry.kind {
        EntryKind::DateMarker { date } => {
            ui.vertical_centered(|ui| {
                egui::Frame::new()
                    .fill(theme::DATE_PILL_BG)
                    .corner_radius(theme::BUBBLE_ROUNDING)
                    .inner_margin(egui::Margin::symmetric(10, 2))
                    .show(ui, |ui| {
                        ui.label(RichText::new(date).color(theme::DATE_PILL_TEXT).small());
                    });
            })
            .response
        }
        EntryKind::SystemNotice { time, content } => {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format!("{time}  {content}"))
                        .color(theme::NOTICE_TEXT)
                        .small(),
                );
            })
            .response
        }
        EntryKind::Message {
            time,
            author,
            content,
            ..
        } => render_message(ui, entry.global_index, time, author, content, ctx),
    }
}

fn render_message(
    ui: &mut egui::Ui,
    global_index: usize,
    time: &str,
    author: &str,
    content: &str,
    ctx: &RenderContext<'_>,
) -> egui::Response {
    let is_self = ctx.palette.is_self(author);
    let is_match = ctx.search.is_window_match(global_index);
    let is_current = ctx.search.current_global() == Some(global_index);

    let side = if is_self {
        Layout::right_to_left(Align::TOP)
    } else {
        Layout::left_to_right(Align::TOP)
    };

    ui.with_layout(side, |ui| {
        if !is_self {
            avatar_disc(ui, author, theme::author_colour(ctx.palette.colour_for(author)));
        }
        let mut frame = egui::Frame::new()
            .fill(if is_self {
                theme::SELF_BUBBLE_BG
            } else {
                theme::OTHER_BUBBLE_BG
            })
            .corner_radius(theme::BUBBLE_ROUNDING)
            .inner_margin(egui::Margin::same(theme::BUBBLE_PADDING));
        if is_current {
            frame = frame.stroke(egui::Stroke::new(2.0, theme::CURRENT_MATCH_STROKE));
        }

        frame.show(ui, |ui| {
            ui.set_max_width(ctx.bubble_width);
            ui.with_layout(Layout::top_down(Align::Min), |ui| {
                if !is_self {
                    ui.label(
                        RichText::new(author)
                            .color(theme::author_colour(ctx.palette.colour_for(author)))
                            .size(theme::AUTHOR_FONT_SIZE)
                            .strong(),
                    );
                }
                let ranges = if is_match {
                    ctx.search.highlight_ranges(content)
                } else {
                    Vec::new()
                };
                ui.label(highlighted_job(content, &ranges, is_current));
                ui.label(
                    RichText::new(time)
                        .size(theme::TIME_FONT_SIZE)
                        .color(theme::NOTICE_TEXT),
                );
            });
        });
    })
    .response
}

/// Round avatar showing the author's initial on their colour.
fn avatar_disc(ui: &mut egui::Ui, author: &str, colour: egui::Color32) {
    let size = egui::vec2(theme::AVATAR_DIAMETER, theme::AVATAR_DIAMETER);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), theme::AVATAR_DIAMETER / 2.0, colour);
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        author_initial(author),
        egui::FontId::proportional(theme::AVATAR_DIAMETER * 0.5),
        theme::AVATAR_TEXT,
    );
}

/// First character of the author name, upper-cased where that applies.
fn author_initial(author: &str) -> String {
    author
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// Message shown for a document that parsed to no entries.
fn empty_document_text(file_name: Option<&str>) -> String {
    match file_name {
        Some(name) => format!("No messages found in {name}."),
        None => "No messages found.".to_string(),
    }
}

/// Lay out message text with the given byte ranges marked as matches.
fn highlighted_job(text: &str, ranges: &[Range<usize>], is_current: bool) -> LayoutJob {
    let plain = TextFormat {
        font_id: egui::FontId::proportional(theme::BODY_FONT_SIZE),
        color: theme::BUBBLE_TEXT,
        ..Default::default()
    };
    let marked = TextFormat {
        background: if is_current {
            theme::CURRENT_MATCH_BG
        } else {
            theme::MATCH_BG
        },
        ..plain.clone()
    };

    let mut job = LayoutJob::default();
    let mut cursor = 0;
    for range in ranges {
        if range.start > cursor {
            job.append(&text[cursor..range.start], 0.0, plain.clone());
        }
        job.append(&text[range.clone()], 0.0, marked.clone());
        cursor = range.end;
    }
    if cursor < text.len() || text.is_empty() {
        job.append(&text[cursor..], 0.0, plain);
    }
    job
}
