use std::sync::Arc;

use wasm_bindgen::prelude::*;
use smart_rte_assistant::{classify, edit_kind, CommandExecutor, EditKind, LogNotifier};
use smart_rte_core::selection::Selection;
use smart_rte_core::{DocumentSurface, EditorCore};

#[wasm_bindgen]
pub struct Editor {
    core: EditorCore,
    executor: CommandExecutor,
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        Self::with_core(EditorCore::new_empty())
    }

    pub fn from_json(json: String) -> Editor {
        Self::with_core(EditorCore::from_json(&json).unwrap_or_else(|_| EditorCore::new_empty()))
    }

    fn with_core(core: EditorCore) -> Editor {
        Editor { core, executor: CommandExecutor::new(Arc::new(LogNotifier)) }
    }

    pub fn to_json(&self) -> String { self.core.to_json() }
    pub fn to_html(&self) -> String { self.core.to_html() }
    pub fn to_text(&self) -> String { self.core.to_text() }

    pub fn set_selection(&mut self, from: u32, to: u32) { self.core.set_selection(Selection::range(from as usize, to as usize)) }
    pub fn set_editable(&mut self, editable: bool) { self.core.set_editable(editable) }
    pub fn selected_text(&self) -> String { self.core.selected_text() }

    // History
    pub fn undo(&mut self) -> bool { self.core.undo() }
    pub fn redo(&mut self) -> bool { self.core.redo() }

    // Assistant tools
    /// Wire tag of the tool an instruction maps to, if any.
    pub fn classify(&self, instruction: String) -> Option<String> {
        classify(&instruction).map(|intent| intent.as_str().to_string())
    }

    /// Classifies and runs the instruction; `false` when no tool matched or it failed.
    pub fn apply_instruction(&mut self, instruction: String) -> bool {
        match classify(&instruction) {
            Some(intent) => self.executor.execute(intent, &instruction, &mut self.core),
            None => false,
        }
    }

    pub fn execute(&mut self, tag: String, instruction: String) -> bool {
        self.executor.execute_tag(&tag, &instruction, &mut self.core)
    }

    /// "replace" or "insert" for a suggestion produced from this instruction.
    pub fn edit_kind(&self, instruction: String) -> String {
        match edit_kind(&instruction) {
            EditKind::Replace => "replace".into(),
            EditKind::Insert => "insert".into(),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_sanity() {
        let mut e = Editor::new();
        assert_eq!(e.classify("inserta una tabla de 2x3".into()).as_deref(), Some("table"));
        assert!(e.apply_instruction("inserta una tabla de 2x3".into()));
        assert!(e.to_json().contains("\"Table\""));
        assert!(e.undo());
        assert!(!e.execute("sparkles".into(), "haz magia".into()));
        assert_eq!(e.edit_kind("corrige esto".into()), "replace");
    }
}
