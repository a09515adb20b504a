//! The remote text-completion service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::message::{Message, Mode, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryTurn {
    fn from(m: &Message) -> Self {
        Self { role: m.role, content: m.content.clone() }
    }
}

/// Image attachment forwarded for visual analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub name: String,
    pub media_type: String,
    /// Base64 without the data URI prefix.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// The raw user instruction.
    pub message: String,
    /// Assembled context block.
    pub context: String,
    pub mode: Mode,
    pub history: Vec<HistoryTurn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImagePayload>,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
