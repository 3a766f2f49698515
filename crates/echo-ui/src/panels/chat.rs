//! Chat panel: transcript, save indicator, error banner and composer.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use echo_core::composer::ComposerState;
use echo_core::orchestrator::{ChatState, SaveStatus};
use echo_core::transcript::{TranscriptEntry, build_transcript};
use echo_types::message::Role;
use crate::state::UiState;
use crate::theme::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    /// Send to the selected session
    Send(String),
    /// No session is selected; open one named after the prompt first
    CreateAndSend(String),
    DismissError,
}

/// Decide what a submitted prompt should do.
pub fn submit_action(prompt: String, session_selected: bool) -> ChatAction {
    if session_selected {
        ChatAction::Send(prompt)
    } else {
        ChatAction::CreateAndSend(prompt)
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

/// Render the chat panel. `now_ms` is the frame clock used for highlight fades.
pub fn chat_panel(
    ui: &mut egui::Ui,
    chat: &ChatState,
    title: &str,
    busy: bool,
    ui_state: &mut UiState,
    now_ms: f64,
) -> Option<ChatAction> {
    let mut action = None;
    let session_selected = chat.selected_session_id.is_some();

    ui_state.highlighter.observe(&chat.messages, now_ms);
    let scroll_target = ui_state.highlighter.take_scroll_target();

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header
                ui.horizontal(|ui| {
                    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let color = match chat.save_status {
                            SaveStatus::Saving => WARNING,
                            SaveStatus::Saved => SUCCESS,
                            SaveStatus::Idle => TEXT_SECONDARY,
                        };
                        ui.label(RichText::new(chat.save_status.label()).color(color).small());
                    });
                });

                if let Some(error) = chat.error.as_deref() {
                    egui::Frame::default()
                        .fill(ERROR_BG)
                        .corner_radius(PANEL_ROUNDING)
                        .inner_margin(6.0)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(error).color(ERROR));
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                    if ui.small_button("Dismiss").clicked() {
                                        action = Some(ChatAction::DismissError);
                                    }
                                });
                            });
                        });
                }

                ui.separator();

                let available_height = ui.available_height() - 60.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(scroll_target.is_none())
                    .show(ui, |ui| {
                        if chat.history_loading {
                            ui.spinner();
                        } else if chat.messages.is_empty() {
                            let hint = if session_selected {
                                "No messages yet"
                            } else {
                                "Select a session or type a message to start one"
                            };
                            ui.label(RichText::new(hint).color(TEXT_SECONDARY));
                        }

                        for entry in build_transcript(&chat.messages) {
                            let id = entry.message.id.as_deref();
                            let intensity = ui_state.highlighter.intensity(id, now_ms);
                            let response = ui
                                .push_id(entry.key(), |ui| render_message(ui, &entry, intensity))
                                .response;
                            if scroll_target.is_some() && scroll_target.as_deref() == id {
                                response.scroll_to_me(Some(Align::Center));
                            }
                            ui.add_space(4.0);
                        }

                        if busy {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(RichText::new("Waiting for reply...").color(TEXT_SECONDARY).small());
                            });
                        }
                    });

                ui.add_space(8.0);

                // Composer
                ui.horizontal(|ui| {
                    let composer = &mut ui_state.composer;
                    let input = egui::TextEdit::singleline(&mut composer.input)
                        .hint_text(ComposerState::hint_text(session_selected))
                        .desired_width(ui.available_width() - 90.0)
                        .font(egui::FontId::proportional(14.0));
                    let response = ui.add(input);

                    let send_enabled = composer.can_submit(busy);
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(
                            RichText::new(ComposerState::button_label(busy)).color(TEXT_PRIMARY),
                        )
                        .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                        .corner_radius(PANEL_ROUNDING)
                        .min_size(Vec2::new(80.0, 0.0)),
                    );

                    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if enter || send_btn.clicked() {
                        if let Some(prompt) = composer.take_submission(busy) {
                            action = Some(submit_action(prompt, session_selected));
                            response.request_focus();
                        }
                    }
                });
            });
        });

    action
}

fn render_message(ui: &mut egui::Ui, entry: &TranscriptEntry<'_>, intensity: f32) {
    let message = entry.message;
    let (label_color, base) = match message.role {
        Role::User => (ACCENT, USER_BUBBLE),
        Role::Assistant => (SUCCESS, ASSISTANT_BUBBLE),
    };

    egui::Frame::default()
        .fill(highlight_fill(base, intensity))
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(role_label(message.role)).color(label_color).strong().small());
                ui.label(
                    RichText::new(format!("#{}", entry.role_index + 1))
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            });
            ui.label(RichText::new(&message.content).color(TEXT_PRIMARY));
        });
}
