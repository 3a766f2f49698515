use serde::{Deserialize, Serialize};

/// Prefix of ids minted on the client before the server has confirmed a message.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a session transcript.
///
/// The backend stores integer ids and ISO `created_at` datetimes, while the
/// client works with string ids and millisecond timestamps. Deserialization
/// goes through [`RawChatMessage`] to accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChatMessage")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            id: None,
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            id: None,
            timestamp: None,
        }
    }

    /// A message created on the client, with a `local-` placeholder id.
    pub fn local(role: Role, content: impl Into<String>, now_ms: i64) -> Self {
        Self {
            role,
            content: content.into(),
            id: Some(format!("{}{}", LOCAL_ID_PREFIX, uuid::Uuid::new_v4())),
            timestamp: Some(now_ms),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// True when the id was assigned by the backend.
    pub fn has_server_id(&self) -> bool {
        self.id
            .as_deref()
            .map(|id| !id.starts_with(LOCAL_ID_PREFIX))
            .unwrap_or(false)
    }

    pub fn timestamp_or_zero(&self) -> i64 {
        self.timestamp.unwrap_or(0)
    }
}

/// Identifier that the backend may send as a string or an integer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Int(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Int(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawChatMessage {
    role: Role,
    content: String,
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawChatMessage> for ChatMessage {
    type Error = String;

    fn try_from(raw: RawChatMessage) -> std::result::Result<Self, Self::Error> {
        let timestamp = match (raw.timestamp, raw.created_at) {
            (Some(ms), _) => Some(ms as i64),
            (None, Some(created)) => Some(parse_datetime_ms(&created)?),
            (None, None) => None,
        };
        Ok(Self {
            role: raw.role,
            content: raw.content,
            id: raw.id.map(String::from),
            timestamp,
        })
    }
}

/// Parse an RFC 3339 datetime, or a naive ISO-8601 one interpreted as UTC,
/// into epoch milliseconds.
pub fn parse_datetime_ms(value: &str) -> std::result::Result<i64, String> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|e| format!("invalid datetime '{}': {}", value, e))
}

/// Body of `POST /sessions/{id}/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
    pub role: Role,
}

/// Reply of `POST /sessions/{id}/messages`.
///
/// Either `{"message": {...}, "user_message": {...}}` or the message fields
/// at the top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PostMessageReply {
    Wrapped {
        message: ChatMessage,
        #[serde(default)]
        user_message: Option<ChatMessage>,
    },
    Flat(ChatMessage),
}

impl PostMessageReply {
    /// Split into the primary message and the persisted user message, if any.
    pub fn into_parts(self) -> (ChatMessage, Option<ChatMessage>) {
        match self {
            PostMessageReply::Wrapped {
                message,
                user_message,
            } => (message, user_message),
            PostMessageReply::Flat(message) => (message, None),
        }
    }
}
