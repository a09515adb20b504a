//! Tool plans and the shared primary/fallback runner.

use smart_rte_core::selection::Selection;
use smart_rte_core::{Capability, DocumentSurface, EditCommand, SurfaceError};

/// What a tool read from the instruction and the editor before acting.
#[derive(Debug, Clone)]
pub struct ToolInput<'a> {
    pub instruction: &'a str,
    pub selection: Selection,
    pub selected_text: String,
}

impl<'a> ToolInput<'a> {
    pub fn read(instruction: &'a str, surface: &dyn DocumentSurface) -> Self {
        Self { instruction, selection: surface.selection(), selected_text: surface.selected_text() }
    }

    /// A non-empty range covering some visible text.
    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty() && !self.selected_text.trim().is_empty()
    }
}

/// Structured commands to try first, then markup to insert if they fail.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolPlan {
    /// The primary commands are skipped when the surface lacks this.
    pub requires: Option<Capability>,
    pub primary: Vec<EditCommand>,
    /// Tried in order after the primary commands.
    pub fallbacks: Vec<String>,
}

impl ToolPlan {
    pub fn command(command: EditCommand) -> Self {
        Self { primary: vec![command], ..Self::default() }
    }

    pub fn requiring(mut self, capability: Capability) -> Self {
        self.requires = Some(capability);
        self
    }

    pub fn or_html(mut self, html: impl Into<String>) -> Self {
        self.fallbacks.push(html.into());
        self
    }
}

/// A user-facing notice attached to a skipped tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Plan(ToolPlan),
    /// Handled without touching the document.
    Skip(Option<Notice>),
}

/// Which strategy ended up changing the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Primary,
    /// 1-based position in the fallback list.
    Fallback(usize),
}

/// Primary commands, then each fallback, until one succeeds.
///
/// Primary commands run one by one, so a later failure can leave earlier ones applied;
/// every plan in this crate carries a single primary command.
pub fn run(surface: &mut dyn DocumentSurface, plan: ToolPlan) -> Result<Applied, SurfaceError> {
    let mut last_error = SurfaceError::Unsupported("no strategy available".into());

    let capable = plan.requires.map_or(true, |cap| surface.supports(cap));
    if !capable {
        tracing::debug!(capability = ?plan.requires, "capability missing, skipping primary strategy");
    } else if !plan.primary.is_empty() {
        match apply_all(surface, plan.primary) {
            Ok(()) => return Ok(Applied::Primary),
            Err(e) => {
                tracing::warn!(error = %e, "primary strategy failed");
                last_error = e;
            }
        }
    }

    for (i, html) in plan.fallbacks.iter().enumerate() {
        match surface.insert_html(html) {
            Ok(()) => return Ok(Applied::Fallback(i + 1)),
            Err(e) => {
                tracing::warn!(tier = i + 1, error = %e, "fallback insertion failed");
                last_error = e;
            }
        }
    }
    Err(last_error)
}

fn apply_all(surface: &mut dyn DocumentSurface, commands: Vec<EditCommand>) -> Result<(), SurfaceError> {
    for command in commands {
        surface.apply(command)?;
    }
    Ok(())
}
