//! Error types for the assistant pipeline.

use smart_rte_core::SurfaceError;
use thiserror::Error;

/// Why a file was refused by the attachment tray. The message is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentRejection {
    #[error("{name} supera el tamaño máximo de {max_mib} MB")]
    TooLarge { name: String, size: u64, max_mib: u64 },
    #[error("{name}: tipo de archivo no soportado ({mime_type})")]
    UnsupportedType { name: String, mime_type: String },
    #[error("solo se pueden adjuntar {max} archivos")]
    LimitReached { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("pdf extraction failed: {0}")]
    Pdf(String),
    #[error("word conversion failed: {0}")]
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The service answered with an explicit error message.
    #[error("{0}")]
    Service(String),
    #[error("completion service returned status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no credential available")]
    MissingCredential,
    #[error("document store returned status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode store response: {0}")]
    Decode(String),
}

/// A wire tag that names no tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool intent `{0}`")]
pub struct UnknownIntent(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Primary mutation and every fallback failed.
    #[error("no se pudo aplicar {intent}: {reason}")]
    Exhausted { intent: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session is not ready")]
    NotReady,
    #[error("a request is already in flight")]
    Busy,
    #[error("nothing to send")]
    EmptyInstruction,
    #[error("message {0} not found")]
    MessageNotFound(String),
    #[error("message {0} is not a pending suggestion")]
    NotPending(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}
