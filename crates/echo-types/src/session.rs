use serde::{Deserialize, Serialize};

pub type SessionId = i64;

/// A named conversation thread, as listed by `GET /sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Session {
    /// `created_at` rendered in the browser's local time, falling back to the raw value.
    pub fn created_label(&self) -> String {
        match crate::message::parse_datetime_ms(&self.created_at) {
            Ok(ms) => chrono::DateTime::from_timestamp_millis(ms)
                .map(|dt| {
                    dt.with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_else(|| self.created_at.clone()),
            Err(_) => self.created_at.clone(),
        }
    }
}

/// Body of `POST /sessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
}
