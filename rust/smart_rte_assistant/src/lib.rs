//! Assistant command pipeline for the smart_rte editor.
//!
//! Turns a user's instruction and attachments into either a direct document edit or a
//! completion request carrying the user's workspace context.

pub mod attachments;
pub mod completion;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
#[cfg(feature = "http")]
pub mod http;
pub mod intent;
pub mod message;
pub mod notify;
pub mod session;
pub mod store;

pub use attachments::{AttachedFile, AttachmentProcessor, AttachmentTray, FileKind, RawFile};
pub use completion::{CompletionRequest, CompletionService};
pub use config::AssistantConfig;
pub use context::{ContextLoader, ContextSnapshot};
pub use error::{
    AttachmentRejection, CompletionError, ConfigError, ExecutionError, ExtractionError, SessionError, StoreError,
    UnknownIntent,
};
pub use executor::{CommandExecutor, ExecutionReport};
pub use intent::{classify, edit_kind, EditKind, ToolIntent};
pub use message::{Message, Mode, Role, Suggestion, SuggestionStatus, Transcript};
pub use notify::{LogNotifier, Notifier, UrlPrompt};
pub use session::{AssistantSession, Collaborators, SendReport, SessionState};
pub use store::DocumentStore;
