use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Events queued by timers and background tasks.
/// The frame loop drains these and dispatches the matching operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Session list poll interval elapsed
    SessionPollTick,

    /// Message poll interval elapsed for the given session
    MessagePollTick { session_id: SessionId },

    /// A background task changed state and the UI should redraw
    Repaint,

    /// Result of the `GET /health` check
    HealthChecked { ok: bool },

    /// A background task made this session the selection
    SessionOpened { session_id: SessionId },
}
