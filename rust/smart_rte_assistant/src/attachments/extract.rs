//! Text extraction backends for binary formats.
//!
//! Parsing PDF and Word files is left to the host; these traits are the seam.

use async_trait::async_trait;

use crate::error::ExtractionError;

#[async_trait]
pub trait PdfTextSource: Send + Sync {
    async fn page_count(&self, data: &[u8]) -> Result<usize, ExtractionError>;

    /// Text of a 1-based page.
    async fn page_text(&self, data: &[u8], page: usize) -> Result<String, ExtractionError>;
}

#[async_trait]
pub trait WordConverter: Send + Sync {
    async fn extract_raw_text(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Backend for hosts without PDF support; every file gets the placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPdfSupport;

#[async_trait]
impl PdfTextSource for NoPdfSupport {
    async fn page_count(&self, _data: &[u8]) -> Result<usize, ExtractionError> {
        Err(ExtractionError::Pdf("no pdf backend configured".into()))
    }

    async fn page_text(&self, _data: &[u8], _page: usize) -> Result<String, ExtractionError> {
        Err(ExtractionError::Pdf("no pdf backend configured".into()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoWordSupport;

#[async_trait]
impl WordConverter for NoWordSupport {
    async fn extract_raw_text(&self, _data: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::Word("no word backend configured".into()))
    }
}
