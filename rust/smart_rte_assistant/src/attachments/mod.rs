//! Attachment intake: validation, text extraction and the per-turn tray.

mod extract;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::config::Limits;
use crate::error::{AttachmentRejection, ExtractionError};
use crate::notify::Notifier;

pub use extract::{NoPdfSupport, NoWordSupport, PdfTextSource, WordConverter};

const WORD_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];

/// A file as handed over by the picker, before validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Text,
    Word,
}

impl FileKind {
    /// Detects by MIME type; only plain-text extensions are accepted without one.
    pub fn detect(name: &str, mime_type: &str) -> Option<FileKind> {
        let mime = mime_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            return Some(FileKind::Image);
        }
        if mime == "application/pdf" {
            return Some(FileKind::Pdf);
        }
        if mime.starts_with("text/") {
            return Some(FileKind::Text);
        }
        if WORD_MIME_TYPES.contains(&mime.as_str()) {
            return Some(FileKind::Word);
        }
        let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase())?;
        matches!(ext.as_str(), "txt" | "md" | "csv" | "json").then_some(FileKind::Text)
    }
}

/// A validated attachment with its normalized content.
///
/// For images `content` is a base64 data URI; for everything else it is extracted text
/// or a placeholder when extraction failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub kind: FileKind,
    pub content: String,
    /// Thumbnail source; the same data URI as `content` for images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl AttachedFile {
    pub fn is_image(&self) -> bool {
        self.kind == FileKind::Image
    }

    /// (media type, base64 data) of an image attachment.
    pub fn image_data(&self) -> Option<(&str, &str)> {
        if !self.is_image() {
            return None;
        }
        let rest = self.content.strip_prefix("data:")?;
        let (media_type, data) = rest.split_once(";base64,")?;
        Some((media_type, data))
    }
}

pub struct AttachmentProcessor {
    limits: Limits,
    pdf: Arc<dyn PdfTextSource>,
    word: Arc<dyn WordConverter>,
}

impl AttachmentProcessor {
    pub fn new(limits: Limits, pdf: Arc<dyn PdfTextSource>, word: Arc<dyn WordConverter>) -> Self {
        Self { limits, pdf, word }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub async fn process(&self, id: String, file: RawFile) -> Result<AttachedFile, AttachmentRejection> {
        let size = file.data.len() as u64;
        if size > self.limits.max_file_bytes {
            return Err(AttachmentRejection::TooLarge {
                name: file.name,
                size,
                max_mib: self.limits.max_file_bytes / (1024 * 1024),
            });
        }
        let Some(kind) = FileKind::detect(&file.name, &file.mime_type) else {
            return Err(AttachmentRejection::UnsupportedType { name: file.name, mime_type: file.mime_type });
        };

        let content = match kind {
            FileKind::Image => format!("data:{};base64,{}", file.mime_type, STANDARD.encode(&file.data)),
            FileKind::Pdf => self.pdf_text(&file.data).await.unwrap_or_else(|e| {
                tracing::warn!(file = %file.name, error = %e, "pdf extraction failed");
                format!("[No se pudo extraer el texto del PDF {}]", file.name)
            }),
            FileKind::Text => truncate_chars(&String::from_utf8_lossy(&file.data), self.limits.text_max_chars),
            FileKind::Word => match self.word.extract_raw_text(&file.data).await {
                Ok(text) => truncate_chars(&text, self.limits.text_max_chars),
                Err(e) => {
                    tracing::warn!(file = %file.name, error = %e, "word conversion failed");
                    format!("[No se pudo extraer el texto del documento Word {}]", file.name)
                }
            },
        };

        let preview = (kind == FileKind::Image).then(|| content.clone());
        tracing::debug!(file = %file.name, ?kind, size, "attachment processed");
        Ok(AttachedFile { id, name: file.name, mime_type: file.mime_type, size, kind, content, preview })
    }

    async fn pdf_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let pages = self.pdf.page_count(data).await?.min(self.limits.pdf_max_pages);
        let mut out = String::new();
        for page in 1..=pages {
            let text = self.pdf.page_text(data, page).await?;
            out.push_str(&format!("Página {page}:\n{text}\n\n"));
        }
        Ok(out)
    }
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Attachments of the turn being composed.
#[derive(Debug, Default)]
pub struct AttachmentTray {
    files: Vec<AttachedFile>,
    processing: bool,
    next_id: u64,
}

impl AttachmentTray {
    pub fn files(&self) -> &[AttachedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Processes a picker batch one file at a time.
    ///
    /// Rejected files are reported and skipped; files past the per-turn cap are ignored.
    pub async fn add_files(
        &mut self,
        processor: &AttachmentProcessor,
        batch: Vec<RawFile>,
        notifier: &dyn Notifier,
    ) -> Vec<AttachmentRejection> {
        let max = processor.limits().max_files;
        let mut rejected = Vec::new();
        for file in batch {
            if self.files.len() >= max {
                let err = AttachmentRejection::LimitReached { max };
                notifier.notify("Límite de archivos", &err.to_string());
                rejected.push(err);
                break;
            }
            self.next_id += 1;
            let id = format!("file-{}", self.next_id);
            self.processing = true;
            let result = processor.process(id, file).await;
            self.processing = false;
            match result {
                Ok(attached) => self.files.push(attached),
                Err(err) => {
                    notifier.notify("Archivo no válido", &err.to_string());
                    rejected.push(err);
                }
            }
        }
        rejected
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    pub fn take(&mut self) -> Vec<AttachedFile> {
        std::mem::take(&mut self.files)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use async_trait::async_trait;

    struct FakePdf {
        pages: usize,
    }

    #[async_trait]
    impl PdfTextSource for FakePdf {
        async fn page_count(&self, _data: &[u8]) -> Result<usize, ExtractionError> {
            Ok(self.pages)
        }

        async fn page_text(&self, _data: &[u8], page: usize) -> Result<String, ExtractionError> {
            Ok(format!("texto {page}"))
        }
    }

    struct FakeWord;

    #[async_trait]
    impl WordConverter for FakeWord {
        async fn extract_raw_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
            String::from_utf8(data.to_vec()).map_err(|_| ExtractionError::Word("corrupt".into()))
        }
    }

    fn processor(pages: usize) -> AttachmentProcessor {
        AttachmentProcessor::new(Limits::default(), Arc::new(FakePdf { pages }), Arc::new(FakeWord))
    }

    #[tokio::test]
    async fn size_limit_is_inclusive() {
        let p = processor(1);
        let exact = RawFile::new("a.txt", "text/plain", vec![b'a'; 10 * 1024 * 1024]);
        assert!(p.process("file-1".into(), exact).await.is_ok());

        let over = RawFile::new("b.txt", "text/plain", vec![b'a'; 10 * 1024 * 1024 + 1]);
        let err = p.process("file-2".into(), over).await.unwrap_err();
        assert!(matches!(err, AttachmentRejection::TooLarge { max_mib: 10, .. }));
        assert!(err.to_string().contains("10 MB"));
    }

    #[tokio::test]
    async fn pdf_reads_at_most_ten_pages() {
        let p = processor(12);
        let file = p.process("file-1".into(), RawFile::new("r.pdf", "application/pdf", vec![1, 2])).await.unwrap();
        assert!(file.content.starts_with("Página 1:\ntexto 1\n\nPágina 2:"));
        assert!(file.content.contains("Página 10:\ntexto 10\n\n"));
        assert!(!file.content.contains("Página 11"));
    }

    #[tokio::test]
    async fn failed_extraction_yields_placeholder() {
        let p = AttachmentProcessor::new(Limits::default(), Arc::new(NoPdfSupport), Arc::new(FakeWord));
        let pdf = p.process("file-1".into(), RawFile::new("x.pdf", "application/pdf", vec![0])).await.unwrap();
        assert_eq!(pdf.content, "[No se pudo extraer el texto del PDF x.pdf]");

        let docx = RawFile::new("y.docx", WORD_MIME_TYPES[0], vec![0xff, 0xfe]);
        let word = p.process("file-2".into(), docx).await.unwrap();
        assert_eq!(word.kind, FileKind::Word);
        assert!(word.content.starts_with("[No se pudo extraer el texto del documento Word"));
    }

    #[tokio::test]
    async fn text_is_truncated_by_chars() {
        let p = processor(0);
        let body = "ñ".repeat(10_050);
        let file = p.process("file-1".into(), RawFile::new("n.md", "", body.into_bytes())).await.unwrap();
        assert_eq!(file.content.chars().count(), 10_000);
    }

    #[tokio::test]
    async fn text_within_limit_is_unchanged() {
        let p = processor(0);
        for body in ["ñ".repeat(10_000), "resumen corto".to_string()] {
            let raw = RawFile::new("n.txt", "text/plain", body.clone().into_bytes());
            let file = p.process("file-1".into(), raw).await.unwrap();
            assert_eq!(file.content, body);
            assert_eq!(truncate_chars(&file.content, 10_000), file.content);
        }
    }

    #[tokio::test]
    async fn invalid_utf8_text_is_decoded_lossily() {
        let p = processor(0);
        let raw = RawFile::new("l.txt", "text/plain", b"caf\xe9 ok".to_vec());
        let file = p.process("file-1".into(), raw).await.unwrap();
        assert_eq!(file.content, "caf\u{fffd} ok");
    }

    #[tokio::test]
    async fn word_text_is_truncated_by_chars() {
        let p = processor(0);
        let body = "w".repeat(12_000).into_bytes();
        let file = p.process("file-1".into(), RawFile::new("a.docx", WORD_MIME_TYPES[0], body)).await.unwrap();
        assert_eq!(file.kind, FileKind::Word);
        assert_eq!(file.content.chars().count(), 10_000);
    }

    #[test]
    fn extension_fallback_is_limited_to_plain_text() {
        assert_eq!(FileKind::detect("notas.md", ""), Some(FileKind::Text));
        assert_eq!(FileKind::detect("datos.CSV", "application/octet-stream"), Some(FileKind::Text));
        assert_eq!(FileKind::detect("x.png", "application/octet-stream"), None);
        assert_eq!(FileKind::detect("y.pdf", "application/zip"), None);
        assert_eq!(FileKind::detect("z.docx", ""), None);
    }

    #[tokio::test]
    async fn mislabelled_binaries_are_rejected() {
        let p = processor(1);
        let raw = RawFile::new("x.png", "application/octet-stream", vec![1, 2, 3]);
        let err = p.process("file-1".into(), raw).await.unwrap_err();
        assert!(matches!(err, AttachmentRejection::UnsupportedType { .. }));
    }

    #[tokio::test]
    async fn images_become_data_uris() {
        let p = processor(0);
        let file = p.process("file-1".into(), RawFile::new("p.png", "image/png", vec![1, 2, 3])).await.unwrap();
        assert_eq!(file.content, "data:image/png;base64,AQID");
        assert_eq!(file.preview.as_deref(), Some(file.content.as_str()));
        assert_eq!(file.image_data(), Some(("image/png", "AQID")));
    }

    #[tokio::test]
    async fn unsupported_types_are_rejected() {
        let p = processor(0);
        let err = p.process("file-1".into(), RawFile::new("a.zip", "application/zip", vec![0])).await.unwrap_err();
        assert!(matches!(err, AttachmentRejection::UnsupportedType { .. }));
    }

    #[tokio::test]
    async fn tray_ignores_files_past_the_cap() {
        let p = processor(0);
        let notifier = RecordingNotifier::default();
        let mut tray = AttachmentTray::default();
        let batch: Vec<RawFile> = (0..6).map(|i| RawFile::new(format!("{i}.txt"), "text/plain", b"hola".to_vec())).collect();
        let rejected = tray.add_files(&p, batch, &notifier).await;
        assert_eq!(tray.files().len(), 5);
        assert_eq!(rejected, vec![AttachmentRejection::LimitReached { max: 5 }]);
        assert!(!tray.is_processing());
        assert_eq!(notifier.titles(), vec!["Límite de archivos".to_string()]);
    }

    #[tokio::test]
    async fn rejection_does_not_stop_the_batch() {
        let p = processor(0);
        let notifier = RecordingNotifier::default();
        let mut tray = AttachmentTray::default();
        let batch = vec![
            RawFile::new("a.exe", "application/octet-stream", vec![0]),
            RawFile::new("b.txt", "text/plain", b"ok".to_vec()),
        ];
        let rejected = tray.add_files(&p, batch, &notifier).await;
        assert_eq!(rejected.len(), 1);
        assert_eq!(tray.files()[0].name, "b.txt");
        let id = tray.files()[0].id.clone();
        assert!(tray.remove(&id));
        assert!(tray.is_empty());
    }
}
