//! Context gathering and prompt assembly.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::attachments::{truncate_chars, AttachedFile};
use crate::config::Limits;
use crate::error::StoreError;
use crate::message::Mode;
use crate::store::{CategorySummary, DocumentStore, DocumentSummary, StoredDocument};

/// What the assistant knows about the user's workspace for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    pub user_name: String,
    pub categories: Vec<CategorySummary>,
    pub documents: Vec<DocumentSummary>,
    pub selected_id: Option<String>,
    pub selected: Option<StoredDocument>,
    /// `false` when the store could not be reached and defaults are in use.
    pub loaded: bool,
}

impl ContextSnapshot {
    pub fn empty(user_name: impl Into<String>) -> Self {
        Self { user_name: user_name.into(), ..Self::default() }
    }
}

pub struct ContextLoader {
    store: Arc<dyn DocumentStore>,
}

impl ContextLoader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Never fails: any store error yields an empty, not-loaded snapshot.
    pub async fn load(&self, user_name: &str, credential: Option<&str>, selected_id: Option<&str>) -> ContextSnapshot {
        match self.try_load(user_name, credential, selected_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "context unavailable, using defaults");
                ContextSnapshot { selected_id: selected_id.map(str::to_string), ..ContextSnapshot::empty(user_name) }
            }
        }
    }

    async fn try_load(
        &self,
        user_name: &str,
        credential: Option<&str>,
        selected_id: Option<&str>,
    ) -> Result<ContextSnapshot, StoreError> {
        let credential = credential.ok_or(StoreError::MissingCredential)?;
        let documents = self.store.list_documents(credential).await?;
        let categories = self.store.list_categories(credential).await?;
        let selected = match selected_id {
            Some(id) => Some(self.store.get_document(credential, id).await?),
            None => None,
        };
        tracing::debug!(documents = documents.len(), categories = categories.len(), "context loaded");
        Ok(ContextSnapshot {
            user_name: user_name.to_string(),
            categories,
            documents,
            selected_id: selected_id.map(str::to_string),
            selected,
            loaded: true,
        })
    }
}

const INSTRUCTIONS: &[&str] = &[
    "Responde en el mismo idioma que el usuario.",
    "Usa el documento seleccionado y los archivos adjuntos cuando sean relevantes para la solicitud.",
    "Si la información no está en el contexto, dilo claramente en lugar de inventarla.",
    "Cita el título del documento o el nombre del archivo del que obtienes cada dato.",
    "En modo editor, devuelve solo el texto que debe quedar en el documento, sin comentarios adicionales.",
];

/// Builds the context block in a fixed order: user, categories, documents,
/// selected document, attachments, instructions, mode.
pub fn assemble(snapshot: &ContextSnapshot, attachments: &[AttachedFile], mode: Mode, limits: &Limits) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usuario: {}", snapshot.user_name);

    out.push_str("\nCategorías:\n");
    if snapshot.categories.is_empty() {
        out.push_str("- (ninguna)\n");
    }
    for c in &snapshot.categories {
        let shared = if c.shared { " (compartida)" } else { "" };
        let _ = writeln!(out, "- {}{}", c.name, shared);
    }

    out.push_str("\nDocumentos:\n");
    if snapshot.documents.is_empty() {
        out.push_str("- (ninguno)\n");
    }
    for d in &snapshot.documents {
        let mut line = format!("- {} (id: {})", d.title, d.id);
        if d.shared {
            line.push_str(" [compartido]");
        }
        if snapshot.selected_id.as_deref() == Some(d.id.as_str()) {
            line.push_str(" [seleccionado]");
        }
        let _ = writeln!(out, "{line}");
    }

    if let Some(doc) = &snapshot.selected {
        let _ = write!(out, "\nContenido del documento seleccionado \"{}\":\n{}\n", doc.title, doc.content);
    }

    if !attachments.is_empty() {
        out.push_str("\nArchivos adjuntos:\n");
        for (i, file) in attachments.iter().enumerate() {
            let _ = writeln!(out, "[{}] {} ({})", i + 1, file.name, file.mime_type);
            if file.is_image() {
                out.push_str("Imagen adjunta: analízala visualmente y usa lo que observes para responder.\n");
                continue;
            }
            let total = file.content.chars().count();
            let shown = truncate_chars(&file.content, limits.context_attachment_chars);
            let _ = writeln!(out, "Contenido:\n{shown}");
            if total > limits.context_attachment_chars {
                let _ = writeln!(
                    out,
                    "[Contenido truncado: se muestran los primeros {} de {} caracteres]",
                    limits.context_attachment_chars, total
                );
            }
        }
    }

    out.push_str("\nInstrucciones:\n");
    for line in INSTRUCTIONS {
        let _ = writeln!(out, "- {line}");
    }

    let _ = write!(out, "\nModo: {}", mode.as_tag());
    out
}
