pub mod doc;
pub mod export;
pub mod history;
pub mod ops;
pub mod selection;
pub mod surface;

use std::collections::HashSet;

use doc::{Doc, Node};
use history::History;
use selection::Selection;
pub use surface::{Capability, CaseTransform, DocumentSurface, EditCommand, Mark, SurfaceError, TableOp};

#[derive(Debug)]
pub struct EditorCore {
    pub doc: Doc,
    pub history: History,
    selection: Selection,
    editable: bool,
    disabled: HashSet<Capability>,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl EditorCore {
    pub fn new_empty() -> Self {
        Self {
            doc: Doc::default(),
            history: History::default(),
            selection: Selection::default(),
            editable: true,
            disabled: HashSet::new(),
        }
    }

    pub fn from_doc(doc: Doc) -> Self {
        Self { doc, ..Self::new_empty() }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let doc: Doc = serde_json::from_str(json)?;
        Ok(Self::from_doc(doc))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.doc).unwrap_or_else(|_| "{\"nodes\":[]}".to_string())
    }

    pub fn to_html(&self) -> String {
        export::to_html(&self.doc)
    }

    pub fn to_text(&self) -> String {
        export::to_text(&self.doc)
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Positions are clamped to the document size.
    pub fn set_selection(&mut self, mut selection: Selection) {
        let size = selection::doc_size(&self.doc);
        selection.normalize();
        selection.from = selection.from.min(size);
        selection.to = selection.to.min(size);
        self.selection = selection;
    }

    /// Turn an optional feature on or off; hosts without a feature disable it.
    pub fn set_capability(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.disabled.remove(&capability);
        } else {
            self.disabled.insert(capability);
        }
    }

    // History
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.doc);
        self.set_selection(self.selection);
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.doc);
        self.set_selection(self.selection);
        changed
    }

    fn commit(&mut self, next: Doc, selection: Selection) {
        self.history.record_before_change(&self.doc);
        self.doc = next;
        self.set_selection(selection);
    }
}

impl DocumentSurface for EditorCore {
    fn is_editable(&self) -> bool {
        self.editable
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        selection::text_between(&self.doc, from, to)
    }

    fn supports(&self, capability: Capability) -> bool {
        !self.disabled.contains(&capability)
    }

    fn apply(&mut self, command: EditCommand) -> Result<(), SurfaceError> {
        if !self.editable {
            return Err(SurfaceError::NotEditable);
        }
        if let Some(cap) = ops::required_capability(&command) {
            if !self.supports(cap) {
                return Err(SurfaceError::Unsupported(format!("{cap:?}")));
            }
        }
        let mut next = self.doc.clone();
        let selection = ops::apply(&mut next, &self.selection, command)?;
        self.commit(next, selection);
        Ok(())
    }

    fn insert_html(&mut self, html: &str) -> Result<(), SurfaceError> {
        if !self.editable {
            return Err(SurfaceError::NotEditable);
        }
        let html = html.trim();
        if html.is_empty() || !html.starts_with('<') || !html.ends_with('>') {
            return Err(SurfaceError::InvalidHtml);
        }
        let mut next = self.doc.clone();
        let idx = ops::insert_node(&mut next, &self.selection, Node::Html { html: html.to_string() });
        let caret = Selection::caret(selection::node_start(&next, idx + 1));
        self.commit(next, caret);
        Ok(())
    }
}
