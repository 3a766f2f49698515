//! EchoPrompt REST adapter.
//!
//! Uses browser `fetch()` via gloo-net. Every request carries a JSON
//! content type and races a timeout; a request that loses the race is
//! aborted through its `AbortController`.

use async_trait::async_trait;
use futures::future::{self, Either};
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use web_sys::AbortController;

use echo_core::ports::ApiPort;
use echo_types::{
    EchoError, Result,
    config::AppConfig,
    message::{ChatMessage, PostMessageReply, PostMessageRequest},
    search::{SemanticSearchRequest, SemanticSearchResponse},
    session::{CreateSessionRequest, Session, SessionId},
};

pub struct HttpApiClient {
    base_url: String,
    timeout_ms: u32,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u32) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, timeout_ms }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_base(), config.retry.request_timeout_ms)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the timeout race; non-2xx statuses become errors.
    async fn send(&self, builder: RequestBuilder, body: Option<Value>) -> Result<Response> {
        let controller = AbortController::new().ok();
        let builder = builder
            .header("Content-Type", "application/json")
            .abort_signal(controller.as_ref().map(|c| c.signal()).as_ref());

        let request: Request = match body {
            Some(body) => builder.json(&body),
            None => builder.build(),
        }
        .map_err(|e| EchoError::Network(e.to_string()))?;

        let fetch = Box::pin(request.send());
        let timeout = Box::pin(TimeoutFuture::new(self.timeout_ms));

        let response = match future::select(fetch, timeout).await {
            Either::Left((result, _)) => result.map_err(|e| EchoError::Network(e.to_string()))?,
            Either::Right(((), _)) => {
                if let Some(controller) = controller {
                    controller.abort();
                }
                log::warn!("Request timed out after {}ms", self.timeout_ms);
                return Err(EchoError::Timeout(self.timeout_ms as u64));
            }
        };

        if response.ok() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let text = if text.trim().is_empty() {
            response.status_text()
        } else {
            text
        };
        Err(status_error(status, &text))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Request::get(&self.url(path)), None).await?;
        read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Request::post(&self.url(path)), Some(body)).await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| EchoError::Network(e.to_string()))?;
    decode(&text)
}

/// Decode a response body; anything that does not fit the expected shape is malformed.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| EchoError::MalformedResponse(e.to_string()))
}

/// Map a non-2xx status and its body. FastAPI puts the reason in `detail`.
pub fn status_error(status: u16, body: &str) -> EchoError {
    let message = error_detail(body).unwrap_or_else(|| body.trim().to_string());
    if status == 404 {
        EchoError::NotFound(message)
    } else {
        EchoError::Http { status, message }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(s) => Some(s),
        // validation errors: [{"loc": [...], "msg": "...", ...}]
        Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).map(String::from))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait(?Send)]
impl ApiPort for HttpApiClient {
    async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.get_json("/sessions").await
    }

    async fn get_session(&self, id: SessionId) -> Result<Session> {
        self.get_json(&format!("/sessions/{}", id)).await
    }

    async fn create_session(&self, name: &str) -> Result<Session> {
        let body = CreateSessionRequest { name: name.to_string() };
        self.post_json("/sessions", &body).await
    }

    async fn delete_session(&self, id: SessionId) -> Result<()> {
        let url = self.url(&format!("/sessions/{}", id));
        match self.send(Request::delete(&url), None).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn list_messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>> {
        self.get_json(&format!("/sessions/{}/messages", session_id)).await
    }

    async fn post_message(
        &self,
        session_id: SessionId,
        req: PostMessageRequest,
    ) -> Result<PostMessageReply> {
        self.post_json(&format!("/sessions/{}/messages", session_id), &req).await
    }

    async fn semantic_search(&self, req: SemanticSearchRequest) -> Result<SemanticSearchResponse> {
        self.post_json("/query/semantic_search", &req).await
    }

    async fn health(&self) -> Result<()> {
        self.send(Request::get(&self.url("/health")), None).await.map(|_| ())
    }
}
