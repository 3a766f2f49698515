//! Transcript derivation: display order, role-scoped indices and highlight state.
//!
//! Everything here is recomputed from the message list on every frame.
//! Nothing derived is stored on the messages themselves.

use std::collections::HashSet;

use echo_types::message::{ChatMessage, Role};

/// A user message this close behind an assistant message is shown first.
pub const TIE_WINDOW_MS: i64 = 1000;

/// One row of the rendered transcript
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry<'a> {
    pub message: &'a ChatMessage,
    /// Zero-based position among messages of the same role
    pub role_index: usize,
}

impl TranscriptEntry<'_> {
    /// Stable addressing key, e.g. `message-user-0`
    pub fn key(&self) -> String {
        format!("message-{}-{}", self.message.role.as_str(), self.role_index)
    }
}

/// Display order: stable by timestamp (missing counts as 0), then each user
/// message is moved ahead of directly preceding assistant messages that are
/// less than [`TIE_WINDOW_MS`] older. Undated messages never take part in
/// that swap.
pub fn ordered(messages: &[ChatMessage]) -> Vec<&ChatMessage> {
    let mut order: Vec<&ChatMessage> = messages.iter().collect();
    order.sort_by_key(|m| m.timestamp_or_zero());

    for i in 1..order.len() {
        if order[i].role != Role::User {
            continue;
        }
        let mut j = i;
        while j > 0
            && order[j - 1].role == Role::Assistant
            && within_tie_window(order[j - 1], order[j])
        {
            order.swap(j - 1, j);
            j -= 1;
        }
    }
    order
}

fn within_tie_window(assistant: &ChatMessage, user: &ChatMessage) -> bool {
    match (assistant.timestamp, user.timestamp) {
        (Some(a), Some(u)) => u.saturating_sub(a) < TIE_WINDOW_MS,
        _ => false,
    }
}

/// Reorder a message list in place into display order.
pub fn sort_messages(messages: &mut Vec<ChatMessage>) {
    let sorted: Vec<ChatMessage> = ordered(messages).into_iter().cloned().collect();
    *messages = sorted;
}

pub fn build_transcript(messages: &[ChatMessage]) -> Vec<TranscriptEntry<'_>> {
    let mut user = 0;
    let mut assistant = 0;
    ordered(messages)
        .into_iter()
        .map(|message| {
            let counter = match message.role {
                Role::User => &mut user,
                Role::Assistant => &mut assistant,
            };
            let role_index = *counter;
            *counter += 1;
            TranscriptEntry { message, role_index }
        })
        .collect()
}

// ─── Highlight ───────────────────────────────────────────────

/// View-local highlight for newly arrived or focused messages.
///
/// Times are milliseconds on the view clock (egui's `input.time`).
#[derive(Debug, Clone)]
pub struct Highlighter {
    duration_ms: f64,
    seen: HashSet<String>,
    seeded: bool,
    active: Option<(String, f64)>,
    scroll_target: Option<String>,
}

impl Highlighter {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms: duration_ms as f64,
            seen: HashSet::new(),
            seeded: false,
            active: None,
            scroll_target: None,
        }
    }

    /// Forget everything, e.g. when another session is selected.
    /// The next `observe` seeds the seen set without highlighting history.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.seeded = false;
        self.active = None;
        self.scroll_target = None;
    }

    /// Note the current messages; highlight the latest newly seen server id.
    pub fn observe(&mut self, messages: &[ChatMessage], now_ms: f64) {
        let mut newest: Option<&str> = None;
        for message in ordered(messages) {
            if !message.has_server_id() {
                continue;
            }
            if let Some(id) = message.id.as_deref() {
                if self.seen.insert(id.to_string()) {
                    newest = Some(id);
                }
            }
        }

        if !self.seeded {
            self.seeded = true;
            return;
        }
        if let Some(id) = newest {
            self.active = Some((id.to_string(), now_ms));
        }
    }

    /// Highlight a specific message and ask the view to scroll to it.
    pub fn focus(&mut self, id: &str, now_ms: f64) {
        self.active = Some((id.to_string(), now_ms));
        self.scroll_target = Some(id.to_string());
    }

    pub fn is_highlighted(&self, id: Option<&str>, now_ms: f64) -> bool {
        match (&self.active, id) {
            (Some((active, since)), Some(id)) => active == id && now_ms - since < self.duration_ms,
            _ => false,
        }
    }

    pub fn highlighted_id(&self, now_ms: f64) -> Option<&str> {
        self.active
            .as_ref()
            .filter(|(_, since)| now_ms - since < self.duration_ms)
            .map(|(id, _)| id.as_str())
    }

    /// Fade strength in `0.0..=1.0` for the highlight animation.
    pub fn intensity(&self, id: Option<&str>, now_ms: f64) -> f32 {
        match (&self.active, id) {
            (Some((active, since)), Some(id)) if active == id => {
                (1.0 - (now_ms - since) / self.duration_ms).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    pub fn take_scroll_target(&mut self) -> Option<String> {
        self.scroll_target.take()
    }

    /// Whether the view must keep repainting to finish the animation.
    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.highlighted_id(now_ms).is_some()
    }
}
