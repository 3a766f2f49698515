//! View-local state that the core stores do not own: input buffers,
//! the transcript highlighter and the backend health check result.

use echo_core::composer::ComposerState;
use echo_core::transcript::Highlighter;
use echo_types::event::AppEvent;
use echo_types::session::SessionId;

/// Result of the startup `GET /health` check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendHealth {
    Unknown,
    Online,
    Offline,
}

impl BackendHealth {
    pub fn label(&self) -> &'static str {
        match self {
            BackendHealth::Unknown => "Checking backend...",
            BackendHealth::Online => "Backend online",
            BackendHealth::Offline => "Backend unreachable",
        }
    }
}

pub struct UiState {
    pub composer: ComposerState,
    pub search_query: String,
    /// Name field of the "new session" form
    pub new_session_name: String,
    pub highlighter: Highlighter,
    pub health: BackendHealth,
    pub show_search: bool,
    /// Session awaiting delete confirmation
    pub confirm_delete: Option<SessionId>,
}

impl UiState {
    pub fn new(highlight_ms: u64) -> Self {
        Self {
            composer: ComposerState::new(),
            search_query: String::new(),
            new_session_name: String::new(),
            highlighter: Highlighter::new(highlight_ms),
            health: BackendHealth::Unknown,
            show_search: true,
            confirm_delete: None,
        }
    }

    /// Apply the events that only concern the view. Poll ticks are handled by the app.
    pub fn apply(&mut self, event: &AppEvent) {
        match event {
            AppEvent::HealthChecked { ok } => {
                self.health = if *ok {
                    BackendHealth::Online
                } else {
                    BackendHealth::Offline
                };
            }
            AppEvent::SessionOpened { .. } => {
                self.highlighter.reset();
                self.search_query.clear();
                self.confirm_delete = None;
            }
            AppEvent::SessionPollTick | AppEvent::MessagePollTick { .. } | AppEvent::Repaint => {}
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(echo_types::config::DEFAULT_HIGHLIGHT_MS)
    }
}
