//! Semantic search panel.

use egui::{self, RichText, ScrollArea, Vec2};

use echo_core::search::SearchState;
use echo_types::search::{SearchMetadata, SearchResult};
use crate::panels::chat::role_label;
use crate::theme::*;

const SNIPPET_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Search(String),
    /// A result was clicked; focus the transcript message with this id
    Focus(String),
    Clear,
}

/// First `max_chars` characters on one line, with an ellipsis when cut.
pub fn snippet(content: &str, max_chars: usize) -> String {
    let flat: String = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

pub fn metadata_line(meta: &SearchMetadata) -> String {
    match (meta.min_score, meta.max_score) {
        (Some(min), Some(max)) => format!(
            "{} matches for \"{}\" (score {:.2} to {:.2})",
            meta.total, meta.query, min, max
        ),
        _ => format!("{} matches for \"{}\"", meta.total, meta.query),
    }
}

pub fn search_panel(
    ui: &mut egui::Ui,
    state: &SearchState,
    query: &mut String,
    session_selected: bool,
) -> Option<SearchAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Search").color(TEXT_PRIMARY).strong());
            ui.separator();

            ui.horizontal(|ui| {
                let hint = if session_selected {
                    "Search this session"
                } else {
                    "Select a session to search"
                };
                let response = ui.add(
                    egui::TextEdit::singleline(query)
                        .hint_text(hint)
                        .desired_width(ui.available_width() - 70.0),
                );
                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let go = ui.add_enabled(
                    !state.loading,
                    egui::Button::new(RichText::new("Search").color(TEXT_PRIMARY))
                        .fill(ACCENT)
                        .corner_radius(PANEL_ROUNDING)
                        .min_size(Vec2::new(60.0, 0.0)),
                );
                if (enter || go.clicked()) && !state.loading {
                    action = Some(SearchAction::Search(query.clone()));
                }
            });

            if state.searched && ui.small_button("Clear").clicked() {
                action = Some(SearchAction::Clear);
            }

            if state.loading {
                ui.spinner();
            }
            if let Some(error) = state.error.as_deref() {
                ui.label(RichText::new(error).color(ERROR).small());
            }
            if state.no_results() {
                ui.label(RichText::new("No results").color(TEXT_SECONDARY));
            }
            if let Some(meta) = state.visible_metadata() {
                ui.label(RichText::new(metadata_line(meta)).color(TEXT_SECONDARY).small());
            }

            ScrollArea::vertical()
                .id_salt("search_results")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for result in &state.results {
                        if result_row(ui, result) {
                            action = Some(SearchAction::Focus(result.id.clone()));
                        }
                    }
                });
        });

    action
}

/// Returns true when clicked.
fn result_row(ui: &mut egui::Ui, result: &SearchResult) -> bool {
    let response = egui::Frame::default()
        .fill(BG_SURFACE)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(role_label(result.payload.role))
                        .color(ACCENT)
                        .small()
                        .strong(),
                );
                ui.label(
                    RichText::new(format!("{:.2}", result.score))
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            });
            ui.label(RichText::new(snippet(&result.payload.content, SNIPPET_CHARS)).color(TEXT_PRIMARY));
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand);
    ui.add_space(2.0);
    response.clicked()
}
