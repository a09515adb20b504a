//! Bounded undo/redo history for the document.

use crate::doc::Doc;

pub const DEFAULT_DEPTH: usize = 100;

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Doc>,
    redo_stack: Vec<Doc>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }
}

impl History {
    pub fn with_depth(depth: usize) -> Self {
        Self { undo_stack: Vec::new(), redo_stack: Vec::new(), depth: depth.max(1) }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record the current state before making a change. The oldest snapshot is dropped at capacity.
    pub fn record_before_change(&mut self, current: &Doc) {
        if self.undo_stack.len() == self.depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(current.clone());
        self.redo_stack.clear();
    }

    /// Undo into the provided doc. Returns true if a change occurred.
    pub fn undo(&mut self, doc: &mut Doc) -> bool {
        match self.undo_stack.pop() {
            Some(prev) => {
                self.redo_stack.push(std::mem::replace(doc, prev));
                true
            }
            None => false,
        }
    }

    /// Redo into the provided doc. Returns true if a change occurred.
    pub fn redo(&mut self, doc: &mut Doc) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(std::mem::replace(doc, next));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Node;

    fn doc_with(text: &str) -> Doc {
        Doc { nodes: vec![Node::paragraph(text)] }
    }

    #[test]
    fn undo_then_redo_restores_states() {
        let mut h = History::default();
        let mut doc = doc_with("a");
        h.record_before_change(&doc);
        doc = doc_with("b");

        assert!(h.undo(&mut doc));
        assert_eq!(doc, doc_with("a"));
        assert!(h.redo(&mut doc));
        assert_eq!(doc, doc_with("b"));
        assert!(!h.redo(&mut doc));
    }

    #[test]
    fn depth_drops_oldest_snapshot() {
        let mut h = History::with_depth(2);
        let mut doc = doc_with("0");
        for i in 1..=3 {
            h.record_before_change(&doc);
            doc = doc_with(&i.to_string());
        }
        assert!(h.undo(&mut doc));
        assert!(h.undo(&mut doc));
        assert_eq!(doc, doc_with("1"));
        assert!(!h.can_undo());
    }
}
