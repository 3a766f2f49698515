//! Chat orchestrator: session selection and the message lifecycle.
//!
//! Owns the selected session and its messages. A send goes through a fixed
//! sequence: optimistic append → saving → POST → reconcile or roll back →
//! loading cleared. Sends are serialized behind an async lock so replies are
//! applied in call order; the optimistic append itself is immediate.
//!
//! State is only borrowed between awaits, never across one.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use futures::lock::Mutex;

use echo_types::{
    EchoError, Result,
    message::{ChatMessage, PostMessageReply, PostMessageRequest, Role},
    session::SessionId,
};
use crate::composer::validate_prompt;
use crate::ports::{ApiPort, TimerPort};
use crate::session_store::SessionStore;
use crate::transcript::sort_messages;

pub const NO_SESSION_ERROR: &str = "Please select a session first";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
        }
    }
}

#[derive(Debug)]
pub struct ChatState {
    pub selected_session_id: Option<SessionId>,
    /// Messages of the selected session, in display order
    pub messages: Vec<ChatMessage>,
    /// A send is talking to the backend
    pub loading: bool,
    pub error: Option<String>,
    pub save_status: SaveStatus,
    /// Message history for a fresh selection is in flight
    pub history_loading: bool,
    /// Highest server timestamp merged so far
    watermark: Option<i64>,
    /// Bumped on every selection change; late results for an older one are dropped
    generation: u64,
    /// Sends started under the current generation and not yet answered
    sends_in_flight: usize,
}

impl ChatState {
    fn new() -> Self {
        Self {
            selected_session_id: None,
            messages: Vec::new(),
            loading: false,
            error: None,
            save_status: SaveStatus::Idle,
            history_loading: false,
            watermark: None,
            generation: 0,
            sends_in_flight: 0,
        }
    }

    pub fn watermark(&self) -> Option<i64> {
        self.watermark
    }

    fn contains_id(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id.as_deref() == Some(id))
    }

    fn advance_watermark(&mut self, message: &ChatMessage) {
        if !message.has_server_id() {
            return;
        }
        if let Some(ts) = message.timestamp {
            self.watermark = Some(self.watermark.map_or(ts, |w| w.max(ts)));
        }
    }

    fn clear_selection_state(&mut self) {
        self.generation += 1;
        self.messages.clear();
        self.error = None;
        self.save_status = SaveStatus::Idle;
        self.watermark = None;
        self.history_loading = false;
        self.sends_in_flight = 0;
    }

    /// Append polled messages newer than the watermark and not already present.
    fn merge_polled(&mut self, polled: Vec<ChatMessage>) -> usize {
        let watermark = self.watermark;
        let mut added = 0;
        for message in polled {
            let newer = match (message.timestamp, watermark) {
                (Some(ts), Some(w)) => ts > w,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !newer {
                continue;
            }
            if let Some(id) = message.id.as_deref() {
                if self.contains_id(id) {
                    continue;
                }
            }
            self.advance_watermark(&message);
            self.messages.push(message);
            added += 1;
        }
        if added > 0 {
            sort_messages(&mut self.messages);
        }
        added
    }
}

/// How a `send_message` call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Validation failed; nothing was sent
    Rejected(String),
    /// Reply reconciled into the transcript
    Delivered,
    /// The request failed and the optimistic message was rolled back
    Failed(String),
    /// Reply arrived after the user switched sessions; it was not merged
    Detached,
}

#[derive(Clone)]
pub struct ChatOrchestrator {
    state: Rc<RefCell<ChatState>>,
    api: Rc<dyn ApiPort>,
    timer: Rc<dyn TimerPort>,
    send_lock: Rc<Mutex<()>>,
}

impl ChatOrchestrator {
    pub fn new(api: Rc<dyn ApiPort>, timer: Rc<dyn TimerPort>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChatState::new())),
            api,
            timer,
            send_lock: Rc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> Ref<'_, ChatState> {
        self.state.borrow()
    }

    pub fn selected_session_id(&self) -> Option<SessionId> {
        self.state.borrow().selected_session_id
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.borrow().messages.clone()
    }

    pub fn is_busy(&self) -> bool {
        let st = self.state.borrow();
        st.loading || st.history_loading || st.sends_in_flight > 0
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().error = None;
    }

    /// Make `id` the active session and load its history.
    pub async fn select_session(&self, id: SessionId) -> Result<usize> {
        let generation = {
            let mut st = self.state.borrow_mut();
            st.clear_selection_state();
            st.selected_session_id = Some(id);
            st.history_loading = true;
            st.generation
        };
        log::info!("Session {} selected", id);

        let result = self.api.list_messages(id).await;

        let mut st = self.state.borrow_mut();
        if st.generation != generation {
            log::warn!("Discarding history of session {}: selection changed", id);
            return Ok(0);
        }
        st.history_loading = false;

        let mut messages = match result {
            Ok(messages) => messages,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => {
                log::error!("Failed to load messages of session {}: {}", id, e);
                st.error = Some(format!("Failed to load messages: {}", e));
                return Err(e);
            }
        };

        for message in &messages {
            st.advance_watermark(message);
        }
        let count = messages.len();
        // messages a send added while the history was in flight are kept
        let pending: Vec<ChatMessage> = st
            .messages
            .drain(..)
            .filter(|m| match m.id.as_deref() {
                Some(mid) => !messages.iter().any(|h| h.id.as_deref() == Some(mid)),
                None => true,
            })
            .collect();
        messages.extend(pending);
        sort_messages(&mut messages);
        st.messages = messages;
        Ok(count)
    }

    /// Forget the selection if it is the deleted session.
    pub fn session_deleted(&self, id: SessionId) {
        let mut st = self.state.borrow_mut();
        if st.selected_session_id == Some(id) {
            st.clear_selection_state();
            st.selected_session_id = None;
            log::info!("Selected session {} deleted", id);
        }
    }

    /// Drop the selection and discard every in-flight result.
    pub fn reset(&self) {
        let mut st = self.state.borrow_mut();
        st.clear_selection_state();
        st.selected_session_id = None;
        st.loading = false;
    }

    pub async fn send_message(&self, content: &str) -> SendOutcome {
        let text = match validate_prompt(content) {
            Ok(text) => text,
            Err(e) => {
                let message = e.to_string();
                self.state.borrow_mut().error = Some(message.clone());
                return SendOutcome::Rejected(message);
            }
        };

        // (a) optimistic append
        let (session_id, generation, placeholder_id) = {
            let mut st = self.state.borrow_mut();
            let Some(session_id) = st.selected_session_id else {
                st.error = Some(NO_SESSION_ERROR.to_string());
                return SendOutcome::Rejected(NO_SESSION_ERROR.to_string());
            };
            let placeholder = ChatMessage::local(Role::User, text.clone(), self.timer.now_ms());
            let placeholder_id = placeholder.id.clone().unwrap_or_default();
            st.messages.push(placeholder);
            st.error = None;
            st.sends_in_flight += 1;
            (session_id, st.generation, placeholder_id)
        };

        let _turn = self.send_lock.lock().await;

        // (b) saving
        {
            let mut st = self.state.borrow_mut();
            st.loading = true;
            if st.generation == generation {
                st.save_status = SaveStatus::Saving;
            }
        }

        // (c) network
        let request = PostMessageRequest {
            content: text,
            role: Role::User,
        };
        let result = self
            .api
            .post_message(session_id, request)
            .await
            .and_then(validate_reply);

        let mut st = self.state.borrow_mut();
        // (f) every exit path below clears loading
        st.loading = false;

        if st.generation != generation {
            log::warn!("Reply for session {} arrived after the selection changed", session_id);
            return SendOutcome::Detached;
        }
        st.sends_in_flight = st.sends_in_flight.saturating_sub(1);

        match result {
            // (d) reconcile
            Ok((primary, user_echo)) => {
                self.apply_reply(&mut st, &placeholder_id, primary, user_echo);
                st.save_status = SaveStatus::Saved;
                SendOutcome::Delivered
            }
            // (e) roll back
            Err(e) => {
                log::error!("Failed to send message to session {}: {}", session_id, e);
                st.messages.retain(|m| m.id.as_deref() != Some(placeholder_id.as_str()));
                let message = format!("Failed to send message: {}", e);
                st.error = Some(message.clone());
                st.messages.push(ChatMessage::local(
                    Role::Assistant,
                    format!("Sorry, your message could not be delivered ({}). Please try again.", e),
                    self.timer.now_ms(),
                ));
                st.save_status = SaveStatus::Idle;
                SendOutcome::Failed(message)
            }
        }
    }

    fn apply_reply(
        &self,
        st: &mut ChatState,
        placeholder_id: &str,
        primary: ChatMessage,
        user_echo: Option<ChatMessage>,
    ) {
        let placeholder_ts = st
            .messages
            .iter()
            .find(|m| m.id.as_deref() == Some(placeholder_id))
            .and_then(|m| m.timestamp);

        let (echo, assistant) = match primary.role {
            Role::User => (Some(primary), None),
            Role::Assistant => (user_echo, Some(primary)),
        };

        if let Some(echo) = echo {
            let echo_id = echo.id.clone().unwrap_or_default();
            if st.contains_id(&echo_id) {
                st.messages.retain(|m| m.id.as_deref() != Some(placeholder_id));
            } else if let Some(slot) = st
                .messages
                .iter_mut()
                .find(|m| m.id.as_deref() == Some(placeholder_id))
            {
                slot.id = Some(echo_id);
                if echo.timestamp.is_some() {
                    slot.timestamp = echo.timestamp;
                }
            }
            st.advance_watermark(&echo);
        }

        if let Some(mut assistant) = assistant {
            let floor = placeholder_ts.unwrap_or_else(|| self.timer.now_ms());
            let server_ts = assistant.timestamp;
            assistant.timestamp = Some(server_ts.map_or(floor, |ts| ts.max(floor)));
            let id = assistant.id.clone().unwrap_or_default();
            if !st.contains_id(&id) {
                if let Some(ts) = server_ts {
                    st.watermark = Some(st.watermark.map_or(ts, |w| w.max(ts)));
                }
                st.messages.push(assistant);
            }
        }

        sort_messages(&mut st.messages);
    }

    /// Fetch the history again and append what is new. Skipped while a send of
    /// the current selection or the initial load is in flight.
    pub async fn poll_messages(&self) -> usize {
        let (session_id, generation) = {
            let st = self.state.borrow();
            let Some(session_id) = st.selected_session_id else {
                return 0;
            };
            if st.sends_in_flight > 0 || st.history_loading {
                return 0;
            }
            (session_id, st.generation)
        };

        let result = self.api.list_messages(session_id).await;

        let mut st = self.state.borrow_mut();
        if st.generation != generation || st.sends_in_flight > 0 {
            return 0;
        }
        match result {
            Ok(polled) => {
                let added = st.merge_polled(polled);
                if added > 0 {
                    log::debug!("Merged {} polled messages into session {}", added, session_id);
                }
                added
            }
            Err(e) => {
                log::debug!("Message poll for session {} failed: {}", session_id, e);
                0
            }
        }
    }

    /// Open a new session named after the prompt and send the prompt as its first turn.
    ///
    /// `on_selected` runs once the new session is selected, before the send goes out.
    pub async fn create_session_then_send(
        &self,
        store: &SessionStore,
        prompt: &str,
        on_selected: impl FnOnce(SessionId),
    ) -> SendOutcome {
        let text = match validate_prompt(prompt) {
            Ok(text) => text,
            Err(e) => {
                let message = e.to_string();
                self.state.borrow_mut().error = Some(message.clone());
                return SendOutcome::Rejected(message);
            }
        };

        let session = match store.create(&session_name_for(&text)).await {
            Ok(session) => session,
            Err(e) => {
                let message = format!("Failed to create session: {}", e);
                self.state.borrow_mut().error = Some(message.clone());
                return SendOutcome::Failed(message);
            }
        };

        // A history failure is already recorded in `error`; the send still goes out.
        let _ = self.select_session(session.id).await;
        if self.selected_session_id() == Some(session.id) {
            on_selected(session.id);
        }
        self.send_message(&text).await
    }
}

const SESSION_NAME_MAX_CHARS: usize = 40;

/// First line of the prompt, cut to a list-friendly length.
pub fn session_name_for(prompt: &str) -> String {
    let first_line = prompt.lines().next().unwrap_or("").trim();
    let mut name: String = first_line.chars().take(SESSION_NAME_MAX_CHARS).collect();
    if first_line.chars().count() > SESSION_NAME_MAX_CHARS {
        name.push_str("...");
    }
    name
}

/// The primary message of a reply must carry a server id.
fn validate_reply(reply: PostMessageReply) -> Result<(ChatMessage, Option<ChatMessage>)> {
    let (primary, user_echo) = reply.into_parts();
    if !primary.has_server_id() {
        return Err(EchoError::MalformedResponse(
            "reply message has no server id".to_string(),
        ));
    }
    let user_echo = user_echo.filter(|m| m.has_server_id());
    Ok((primary, user_echo))
}
