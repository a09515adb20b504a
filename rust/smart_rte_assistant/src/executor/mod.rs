//! Runs classified tool intents against a document surface.

mod lexicon;
pub mod plan;
pub mod tools;

use std::sync::Arc;

use smart_rte_core::DocumentSurface;

use crate::error::ExecutionError;
use crate::intent::ToolIntent;
use crate::notify::{Notifier, UrlPrompt};
use plan::{Applied, Notice, Outcome, ToolInput};

/// Result of one tool run.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionReport {
    Applied(Applied),
    /// The tool decided not to touch the document.
    Skipped,
    /// The surface was not accepting edits.
    NotReady,
    Failed(ExecutionError),
    Unrecognized,
}

impl ExecutionReport {
    /// `true` once the tool attempted an action, including a deliberate no-op.
    pub fn handled(&self) -> bool {
        matches!(self, ExecutionReport::Applied(_) | ExecutionReport::Skipped)
    }
}

pub struct CommandExecutor {
    notifier: Arc<dyn Notifier>,
    url_prompt: Option<Arc<dyn UrlPrompt>>,
}

impl CommandExecutor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier, url_prompt: None }
    }

    pub fn with_url_prompt(mut self, prompt: Arc<dyn UrlPrompt>) -> Self {
        self.url_prompt = Some(prompt);
        self
    }

    pub fn execute(&self, intent: ToolIntent, instruction: &str, surface: &mut dyn DocumentSurface) -> bool {
        self.run(intent, instruction, surface).handled()
    }

    pub fn execute_tag(&self, tag: &str, instruction: &str, surface: &mut dyn DocumentSurface) -> bool {
        self.run_tag(tag, instruction, surface).handled()
    }

    /// Dispatch by wire tag; unknown tags are logged and not handled.
    pub fn run_tag(&self, tag: &str, instruction: &str, surface: &mut dyn DocumentSurface) -> ExecutionReport {
        match tag.parse::<ToolIntent>() {
            Ok(intent) => self.run(intent, instruction, surface),
            Err(e) => {
                tracing::warn!(error = %e, "unrecognized tool intent");
                ExecutionReport::Unrecognized
            }
        }
    }

    pub fn run(&self, intent: ToolIntent, instruction: &str, surface: &mut dyn DocumentSurface) -> ExecutionReport {
        if !surface.is_editable() {
            tracing::debug!(%intent, "editor not ready, skipping tool");
            return ExecutionReport::NotReady;
        }
        let input = ToolInput::read(instruction, surface);
        let outcome = match intent {
            ToolIntent::Youtube => self.youtube(&input),
            other => tools::plan(other, &input),
        };
        let plan = match outcome {
            Outcome::Plan(plan) => plan,
            Outcome::Skip(notice) => {
                if let Some(Notice { title, description }) = notice {
                    self.notifier.notify(title, &description);
                }
                tracing::debug!(%intent, "tool skipped");
                return ExecutionReport::Skipped;
            }
        };
        match plan::run(surface, plan) {
            Ok(applied) => {
                tracing::info!(%intent, ?applied, "tool applied");
                ExecutionReport::Applied(applied)
            }
            Err(last) => {
                let err = ExecutionError::Exhausted { intent: intent.to_string(), reason: last.to_string() };
                tracing::error!(%intent, error = %err, "tool failed");
                self.notifier.notify("No se pudo aplicar el cambio", &err.to_string());
                ExecutionReport::Failed(err)
            }
        }
    }

    /// URL from the instruction, else from the prompt, else a notice.
    fn youtube(&self, input: &ToolInput<'_>) -> Outcome {
        if let Some(id) = tools::youtube_id(input.instruction) {
            return tools::youtube(&id);
        }
        let answer = self
            .url_prompt
            .as_ref()
            .and_then(|p| p.ask("Pega la URL del video de YouTube"));
        match answer.as_deref().and_then(tools::youtube_id) {
            Some(id) => tools::youtube(&id),
            None => Outcome::Skip(Some(Notice {
                title: "URL de YouTube no válida",
                description: "No se encontró un enlace de YouTube para insertar".to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::{FixedPrompt, RecordingNotifier};
    use smart_rte_core::doc::{Doc, Node, VideoProvider};
    use smart_rte_core::selection::Selection;
    use smart_rte_core::{Capability, EditCommand, EditorCore, SurfaceError};

    fn executor() -> (CommandExecutor, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (CommandExecutor::new(notifier.clone()), notifier)
    }

    /// Fails structured commands, optionally markup too.
    struct Broken {
        inner: EditorCore,
        html_ok: bool,
    }

    impl DocumentSurface for Broken {
        fn is_editable(&self) -> bool {
            true
        }
        fn selection(&self) -> Selection {
            self.inner.selection()
        }
        fn text_between(&self, from: usize, to: usize) -> String {
            self.inner.text_between(from, to)
        }
        fn supports(&self, capability: Capability) -> bool {
            self.inner.supports(capability)
        }
        fn apply(&mut self, _command: EditCommand) -> Result<(), SurfaceError> {
            Err(SurfaceError::Unsupported("broken".into()))
        }
        fn insert_html(&mut self, html: &str) -> Result<(), SurfaceError> {
            if self.html_ok {
                self.inner.insert_html(html)
            } else {
                Err(SurfaceError::InvalidHtml)
            }
        }
    }

    #[test]
    fn primary_strategy_applies_table() {
        let (exec, _) = executor();
        let mut core = EditorCore::new_empty();
        let report = exec.run(ToolIntent::Table, "crea una tabla de 2x4", &mut core);
        assert_eq!(report, ExecutionReport::Applied(Applied::Primary));
        let Node::Table(t) = &core.doc.nodes[0] else { panic!("expected table") };
        assert_eq!((t.rows.len(), t.col_count()), (2, 4));
    }

    #[test]
    fn fallback_inserts_markup_when_primary_fails() {
        let (exec, _) = executor();
        let mut surface = Broken { inner: EditorCore::new_empty(), html_ok: true };
        assert!(exec.execute(ToolIntent::Separator, "añade un separador", &mut surface));
        assert_eq!(surface.inner.doc.nodes, vec![Node::Html { html: "<hr/>".into() }]);
    }

    #[test]
    fn total_failure_notifies_and_returns_false() {
        let (exec, notifier) = executor();
        let mut surface = Broken { inner: EditorCore::new_empty(), html_ok: false };
        let report = exec.run(ToolIntent::Bold, "negrita", &mut surface);
        assert!(matches!(report, ExecutionReport::Failed(ExecutionError::Exhausted { .. })));
        assert!(!report.handled());
        assert!(surface.inner.doc.nodes.is_empty());
        assert_eq!(notifier.titles(), vec!["No se pudo aplicar el cambio".to_string()]);
    }

    #[test]
    fn read_only_surface_is_not_ready() {
        let (exec, notifier) = executor();
        let mut core = EditorCore::new_empty();
        core.set_editable(false);
        assert_eq!(exec.run(ToolIntent::Emoji, "emoji", &mut core), ExecutionReport::NotReady);
        assert!(notifier.titles().is_empty());
    }

    #[test]
    fn case_transform_on_caret_is_handled_noop() {
        let (exec, _) = executor();
        let mut core = EditorCore::from_doc(Doc { nodes: vec![Node::paragraph("hola")] });
        core.set_selection(Selection::caret(2));
        assert!(exec.execute(ToolIntent::Uppercase, "pásalo a mayúsculas", &mut core));
        assert_eq!(core.to_text(), "hola");
        assert!(!core.history.can_undo());
    }

    #[test]
    fn youtube_prompts_when_instruction_has_no_url() {
        let notifier = Arc::new(RecordingNotifier::default());
        let exec = CommandExecutor::new(notifier.clone())
            .with_url_prompt(Arc::new(FixedPrompt(Some("https://youtu.be/dQw4w9WgXcQ"))));
        let mut core = EditorCore::new_empty();
        assert!(exec.execute(ToolIntent::Youtube, "inserta un video de youtube", &mut core));
        assert_eq!(
            core.doc.nodes,
            vec![Node::Video { src: "dQw4w9WgXcQ".into(), provider: VideoProvider::Youtube }]
        );
    }

    #[test]
    fn youtube_prompt_cancelled_is_a_notice() {
        let notifier = Arc::new(RecordingNotifier::default());
        let exec = CommandExecutor::new(notifier.clone()).with_url_prompt(Arc::new(FixedPrompt(None)));
        let mut core = EditorCore::new_empty();
        assert!(exec.execute(ToolIntent::Youtube, "video de youtube", &mut core));
        assert!(core.doc.nodes.is_empty());
        assert_eq!(notifier.titles(), vec!["URL de YouTube no válida".to_string()]);
    }

    #[test]
    fn unknown_tag_is_not_handled() {
        let (exec, _) = executor();
        let mut core = EditorCore::new_empty();
        assert_eq!(exec.run_tag("sparkles", "haz magia", &mut core), ExecutionReport::Unrecognized);
        assert!(!exec.execute_tag("sparkles", "haz magia", &mut core));
        assert!(exec.execute_tag("orderedList", "lista numerada", &mut core));
    }
}
