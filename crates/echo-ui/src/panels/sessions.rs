//! Session list sidebar.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use echo_core::session_store::SessionListState;
use echo_types::session::{Session, SessionId};
use crate::state::UiState;
use crate::theme::*;

/// What the user asked the session list to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Select(SessionId),
    Create(String),
    Delete(SessionId),
    Retry,
}

/// Which of the four list states to draw
#[derive(Debug, PartialEq)]
pub enum ListView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    List(&'a [Session]),
}

pub fn list_view(state: &SessionListState) -> ListView<'_> {
    if state.loading {
        ListView::Loading
    } else if let Some(error) = state.error.as_deref() {
        ListView::Error(error)
    } else if state.sessions.is_empty() {
        ListView::Empty
    } else {
        ListView::List(&state.sessions)
    }
}

pub fn sessions_panel(
    ui: &mut egui::Ui,
    list: &SessionListState,
    selected: Option<SessionId>,
    ui_state: &mut UiState,
) -> Option<SessionAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Sessions").color(TEXT_PRIMARY).strong());
            ui.separator();

            // New session form
            ui.horizontal(|ui| {
                let field = egui::TextEdit::singleline(&mut ui_state.new_session_name)
                    .hint_text("New session name")
                    .desired_width(ui.available_width() - 56.0);
                let response = ui.add(field);
                let submit = response.lost_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter))
                    && !ui_state.new_session_name.trim().is_empty();
                if ui
                    .add(
                        egui::Button::new(RichText::new("Add").color(TEXT_PRIMARY))
                            .fill(ACCENT)
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(48.0, 0.0)),
                    )
                    .clicked()
                    || submit
                {
                    action = Some(SessionAction::Create(std::mem::take(&mut ui_state.new_session_name)));
                }
            });

            if let Some(error) = list.action_error.as_deref() {
                ui.label(RichText::new(error).color(ERROR).small());
            }
            ui.add_space(4.0);

            match list_view(list) {
                ListView::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Loading sessions...").color(TEXT_SECONDARY));
                    });
                }
                ListView::Error(error) => {
                    ui.label(RichText::new(format!("Error: {}", error)).color(ERROR));
                    if ui.button("Retry").clicked() {
                        action = Some(SessionAction::Retry);
                    }
                }
                ListView::Empty => {
                    ui.label(RichText::new("No sessions found").color(TEXT_SECONDARY));
                }
                ListView::List(sessions) => {
                    ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            for session in sessions {
                                if let Some(a) = session_row(ui, session, selected == Some(session.id), ui_state) {
                                    action = Some(a);
                                }
                            }
                        });
                }
            }
        });

    action
}

fn session_row(
    ui: &mut egui::Ui,
    session: &Session,
    is_selected: bool,
    ui_state: &mut UiState,
) -> Option<SessionAction> {
    let mut action = None;
    let fill = if is_selected { BG_SURFACE } else { BG_SECONDARY };

    egui::Frame::default()
        .fill(fill)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let name_color = if is_selected { ACCENT } else { TEXT_PRIMARY };
                ui.vertical(|ui| {
                    if ui
                        .selectable_label(is_selected, RichText::new(&session.name).color(name_color))
                        .clicked()
                        && !is_selected
                    {
                        action = Some(SessionAction::Select(session.id));
                    }
                    ui.label(RichText::new(session.created_label()).color(TEXT_SECONDARY).small());
                });

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui_state.confirm_delete == Some(session.id) {
                        if ui.small_button("Cancel").clicked() {
                            ui_state.confirm_delete = None;
                        }
                        if ui.small_button(RichText::new("Confirm").color(ERROR)).clicked() {
                            ui_state.confirm_delete = None;
                            action = Some(SessionAction::Delete(session.id));
                        }
                    } else if ui.small_button("Delete").clicked() {
                        ui_state.confirm_delete = Some(session.id);
                    }
                });
            });
        });
    ui.add_space(2.0);

    action
}
