//! Read access to the user's documents and categories.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub shared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Every call carries the user's bearer credential.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self, credential: &str) -> Result<Vec<DocumentSummary>, StoreError>;

    async fn list_categories(&self, credential: &str) -> Result<Vec<CategorySummary>, StoreError>;

    async fn get_document(&self, credential: &str, id: &str) -> Result<StoredDocument, StoreError>;
}
