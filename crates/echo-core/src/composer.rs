//! Composer input state and prompt validation.

use echo_types::{EchoError, Result};

pub const EMPTY_PROMPT_ERROR: &str = "Please enter a message";

/// Trim and reject empty input before anything touches the network.
pub fn validate_prompt(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EchoError::Validation(EMPTY_PROMPT_ERROR.to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct ComposerState {
    pub input: String,
}

impl ComposerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_submit(&self, busy: bool) -> bool {
        !busy && validate_prompt(&self.input).is_ok()
    }

    /// Hand out the trimmed prompt and clear the field, or `None` if it may not be sent.
    pub fn take_submission(&mut self, busy: bool) -> Option<String> {
        if busy {
            return None;
        }
        let prompt = validate_prompt(&self.input).ok()?;
        self.input.clear();
        Some(prompt)
    }

    pub fn hint_text(session_selected: bool) -> &'static str {
        if session_selected {
            "Type your message..."
        } else {
            "Type a message to start a new session..."
        }
    }

    pub fn button_label(busy: bool) -> &'static str {
        if busy {
            "Sending..."
        } else {
            "Send"
        }
    }
}
