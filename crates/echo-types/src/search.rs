use serde::{Deserialize, Serialize};

use crate::message::{Role, WireId};
use crate::session::SessionId;

/// Body of `POST /query/semantic_search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticSearchRequest {
    pub query: String,
    pub session_id: SessionId,
    pub limit: usize,
}

/// One ranked hit. `id` matches the id of a transcript message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub score: f64,
    pub payload: SearchPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub query: String,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticSearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub metadata: Option<SearchMetadata>,
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(String::from)
}
