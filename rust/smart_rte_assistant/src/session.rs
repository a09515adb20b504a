//! One assistant panel: state machine, transcripts and the send pipeline.

use std::sync::Arc;

use smart_rte_core::{DocumentSurface, EditCommand};

use crate::attachments::{
    AttachedFile, AttachmentProcessor, AttachmentTray, NoPdfSupport, NoWordSupport, PdfTextSource, RawFile,
    WordConverter,
};
use crate::completion::{CompletionRequest, CompletionService, HistoryTurn, ImagePayload};
use crate::config::AssistantConfig;
use crate::context::{self, ContextLoader, ContextSnapshot};
use crate::error::{AttachmentRejection, SessionError};
use crate::executor::{CommandExecutor, ExecutionReport};
use crate::intent::{self, EditKind, ToolIntent};
use crate::message::{Message, Mode, Suggestion, SuggestionStatus, Transcript};
use crate::notify::{LogNotifier, Notifier, UrlPrompt};
use crate::store::DocumentStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingContext,
    Ready,
    Sending,
    /// Ready again after a failed request; holds the failure message.
    ReadyWithError(String),
}

impl SessionState {
    pub fn can_send(&self) -> bool {
        matches!(self, SessionState::Ready | SessionState::ReadyWithError(_))
    }
}

/// External services a session talks to.
pub struct Collaborators {
    pub completion: Arc<dyn CompletionService>,
    pub store: Arc<dyn DocumentStore>,
    pub pdf: Arc<dyn PdfTextSource>,
    pub word: Arc<dyn WordConverter>,
    pub notifier: Arc<dyn Notifier>,
    pub url_prompt: Option<Arc<dyn UrlPrompt>>,
}

impl Collaborators {
    pub fn new(completion: Arc<dyn CompletionService>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            completion,
            store,
            pdf: Arc::new(NoPdfSupport),
            word: Arc::new(NoWordSupport),
            notifier: Arc::new(LogNotifier),
            url_prompt: None,
        }
    }

    pub fn with_pdf(mut self, pdf: Arc<dyn PdfTextSource>) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn with_word(mut self, word: Arc<dyn WordConverter>) -> Self {
        self.word = word;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_url_prompt(mut self, prompt: Arc<dyn UrlPrompt>) -> Self {
        self.url_prompt = Some(prompt);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendReport {
    pub user_message_id: String,
    pub reply_id: String,
    pub intent: Option<ToolIntent>,
    /// Present when a tool ran against the document.
    pub tool: Option<ExecutionReport>,
    pub failed: bool,
}

pub struct AssistantSession {
    config: AssistantConfig,
    state: SessionState,
    mode: Mode,
    chat: Transcript,
    editor: Transcript,
    input: String,
    tray: AttachmentTray,
    processor: AttachmentProcessor,
    executor: CommandExecutor,
    loader: ContextLoader,
    completion: Arc<dyn CompletionService>,
    notifier: Arc<dyn Notifier>,
    user_name: String,
    credential: Option<String>,
    context: ContextSnapshot,
    next_message: u64,
}

impl AssistantSession {
    pub fn new(config: AssistantConfig, collaborators: Collaborators) -> Self {
        let Collaborators { completion, store, pdf, word, notifier, url_prompt } = collaborators;
        let mut executor = CommandExecutor::new(notifier.clone());
        if let Some(prompt) = url_prompt {
            executor = executor.with_url_prompt(prompt);
        }
        Self {
            processor: AttachmentProcessor::new(config.limits.clone(), pdf, word),
            config,
            state: SessionState::Idle,
            mode: Mode::Chat,
            chat: Transcript::default(),
            editor: Transcript::default(),
            input: String::new(),
            tray: AttachmentTray::default(),
            executor,
            loader: ContextLoader::new(store),
            completion,
            notifier,
            user_name: String::new(),
            credential: None,
            context: ContextSnapshot::default(),
            next_message: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switching modes keeps both transcripts.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn transcript(&self, mode: Mode) -> &Transcript {
        match mode {
            Mode::Chat => &self.chat,
            Mode::Editor => &self.editor,
        }
    }

    fn transcript_mut(&mut self, mode: Mode) -> &mut Transcript {
        match mode {
            Mode::Chat => &mut self.chat,
            Mode::Editor => &mut self.editor,
        }
    }

    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn attachments(&self) -> &[AttachedFile] {
        self.tray.files()
    }

    pub fn is_processing(&self) -> bool {
        self.tray.is_processing()
    }

    /// Opens the panel with empty transcripts and loads the user's context.
    pub async fn open(&mut self, user_name: impl Into<String>, credential: Option<String>) {
        self.chat.clear();
        self.editor.clear();
        self.tray.clear();
        self.input.clear();
        self.user_name = user_name.into();
        self.credential = credential;
        self.state = SessionState::AwaitingContext;
        self.context = self.loader.load(&self.user_name, self.credential.as_deref(), None).await;
        self.state = SessionState::Ready;
        tracing::info!(loaded = self.context.loaded, "assistant session ready");
    }

    pub fn close(&mut self) {
        self.chat.clear();
        self.editor.clear();
        self.tray.clear();
        self.input.clear();
        self.state = SessionState::Idle;
    }

    /// Reloads the context with a different reference document.
    pub async fn select_document(&mut self, id: Option<String>) {
        if self.state == SessionState::Idle {
            self.context.selected_id = id;
            return;
        }
        let previous = std::mem::replace(&mut self.state, SessionState::AwaitingContext);
        self.context = self.loader.load(&self.user_name, self.credential.as_deref(), id.as_deref()).await;
        self.state = match previous {
            SessionState::ReadyWithError(e) => SessionState::ReadyWithError(e),
            _ => SessionState::Ready,
        };
    }

    pub async fn attach(&mut self, files: Vec<RawFile>) -> Vec<AttachmentRejection> {
        self.tray.add_files(&self.processor, files, self.notifier.as_ref()).await
    }

    pub fn remove_attachment(&mut self, id: &str) -> bool {
        self.tray.remove(id)
    }

    fn next_id(&mut self) -> String {
        self.next_message += 1;
        format!("msg-{}", self.next_message)
    }

    /// Sends the input buffer and the attachments of this turn.
    ///
    /// In editor mode the instruction is also classified and, when a tool matches and a
    /// surface is given, executed before the completion call. A failed completion is
    /// appended to the transcript as an error message and still returns `Ok`.
    pub async fn send(&mut self, surface: Option<&mut dyn DocumentSurface>) -> Result<SendReport, SessionError> {
        if self.state == SessionState::Sending {
            return Err(SessionError::Busy);
        }
        if !self.state.can_send() {
            return Err(SessionError::NotReady);
        }
        let instruction = self.input.trim().to_string();
        if instruction.is_empty() && self.tray.is_empty() {
            return Err(SessionError::EmptyInstruction);
        }

        let mode = self.mode;
        let history: Vec<HistoryTurn> = self
            .transcript(mode)
            .recent(self.config.history.max_messages)
            .into_iter()
            .map(HistoryTurn::from)
            .collect();
        let user_message_id = self.next_id();
        self.transcript_mut(mode).push(Message::user(user_message_id.clone(), instruction.clone()));
        self.input.clear();

        let attachments = self.tray.take();
        let context = context::assemble(&self.context, &attachments, mode, &self.config.limits);
        let images = attachments
            .iter()
            .filter_map(|f| {
                f.image_data().map(|(media_type, data)| ImagePayload {
                    name: f.name.clone(),
                    media_type: media_type.to_string(),
                    data: data.to_string(),
                })
            })
            .collect();
        self.state = SessionState::Sending;

        let intent = match mode {
            Mode::Editor => intent::classify(&instruction),
            Mode::Chat => None,
        };
        let tool = match (intent, surface) {
            (Some(intent), Some(surface)) => Some(self.executor.run(intent, &instruction, surface)),
            (Some(intent), None) => {
                tracing::debug!(%intent, "no document surface, tool not executed");
                None
            }
            (None, _) => None,
        };

        let request = CompletionRequest { message: instruction.clone(), context, mode, history, images };
        tracing::info!(mode = mode.as_tag(), attachments = attachments.len(), ?intent, "sending request");
        let result = self.completion.complete(&request).await;

        let reply_id = self.next_id();
        let failed = match result {
            Ok(text) => {
                let mut reply = Message::assistant(reply_id.clone(), text);
                if mode == Mode::Editor && intent.is_none() {
                    reply.suggestion =
                        Some(Suggestion { status: SuggestionStatus::Pending, edit: intent::edit_kind(&instruction) });
                }
                self.transcript_mut(mode).push(reply);
                self.state = SessionState::Ready;
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "completion request failed");
                let mut reply = Message::assistant(reply_id.clone(), format!("Lo siento, ocurrió un error: {e}"));
                reply.is_error = true;
                self.transcript_mut(mode).push(reply);
                self.state = SessionState::ReadyWithError(e.to_string());
                true
            }
        };

        Ok(SendReport { user_message_id, reply_id, intent, tool, failed })
    }

    /// Writes a pending editor suggestion into the document.
    ///
    /// Replace suggestions overwrite a non-empty selection; everything else is inserted at the caret.
    pub fn accept_suggestion(&mut self, id: &str, surface: &mut dyn DocumentSurface) -> Result<(), SessionError> {
        let (content, suggestion) = {
            let message = self.editor.get(id).ok_or_else(|| SessionError::MessageNotFound(id.to_string()))?;
            match message.suggestion {
                Some(s) if s.status == SuggestionStatus::Pending => (message.content.clone(), s),
                _ => return Err(SessionError::NotPending(id.to_string())),
            }
        };
        let command = if suggestion.edit == EditKind::Replace && !surface.selection().is_empty() {
            EditCommand::ReplaceSelection(content)
        } else {
            EditCommand::InsertText(content)
        };
        surface.apply(command)?;
        self.set_suggestion_status(id, SuggestionStatus::Accepted);
        Ok(())
    }

    pub fn reject_suggestion(&mut self, id: &str) -> Result<(), SessionError> {
        let message = self.editor.get(id).ok_or_else(|| SessionError::MessageNotFound(id.to_string()))?;
        if !message.is_pending() {
            return Err(SessionError::NotPending(id.to_string()));
        }
        self.set_suggestion_status(id, SuggestionStatus::Rejected);
        Ok(())
    }

    fn set_suggestion_status(&mut self, id: &str, status: SuggestionStatus) {
        if let Some(Suggestion { status: current, .. }) = self.editor.get_mut(id).and_then(|m| m.suggestion.as_mut()) {
            *current = status;
        }
    }
}
