//! HTTP clients for the completion service and the document store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::completion::{CompletionRequest, CompletionService};
use crate::config::ServiceConfig;
use crate::error::{CompletionError, StoreError};
use crate::store::{CategorySummary, DocumentStore, DocumentSummary, StoredDocument};

/// Either a reply or an error message; the service may send both keys.
#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpCompletionService {
    client: Client,
    url: String,
}

impl HttpCompletionService {
    pub fn new(config: &ServiceConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        Ok(Self { client, url: config.completion_url.clone() })
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| CompletionError::Transport(e.to_string()))?;
        let reply: Option<CompletionReply> = serde_json::from_str(&body).ok();

        if let Some(message) = reply.as_ref().and_then(|r| r.error.clone()) {
            tracing::warn!(%status, error = %message, "completion service reported an error");
            return Err(CompletionError::Service(message));
        }
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }
        reply
            .and_then(|r| r.response)
            .ok_or_else(|| CompletionError::InvalidResponse("missing `response` field".into()))
    }
}

#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
}

impl HttpDocumentStore {
    pub fn new(config: &ServiceConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { client, base_url: config.store_base_url.trim_end_matches('/').to_string() })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, credential: &str) -> Result<T, StoreError> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        resp.json::<T>().await.map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list_documents(&self, credential: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        self.get_json("/documents", credential).await
    }

    async fn list_categories(&self, credential: &str) -> Result<Vec<CategorySummary>, StoreError> {
        self.get_json("/categories", credential).await
    }

    async fn get_document(&self, credential: &str, id: &str) -> Result<StoredDocument, StoreError> {
        self.get_json(&format!("/documents/{id}"), credential).await
    }
}
