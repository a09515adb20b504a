//! The mutation surface the editor exposes to command producers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::doc::{Align, BoxStyle, ListKind, Node};
use crate::selection::Selection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("document is not editable")]
    NotEditable,
    #[error("document is empty")]
    EmptyDocument,
    #[error("selection {from}..{to} is not valid here")]
    InvalidRange { from: usize, to: usize },
    #[error("no table at the cursor")]
    NoTable,
    #[error("table cell {row},{col} is out of bounds")]
    OutOfBounds { row: usize, col: usize },
    #[error("command not supported: {0}")]
    Unsupported(String),
    #[error("invalid html fragment")]
    InvalidHtml,
}

/// Optional editor features a caller can probe for before using them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Tables,
    VideoEmbed,
    Math,
    Canvas,
    TaskLists,
    Columns,
    Widgets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Superscript,
    Subscript,
    Code,
    Color(String),
    Highlight(String),
    FontSize(u32),
    Link(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseTransform {
    Upper,
    Lower,
    Capitalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableOp {
    AddRowBefore,
    AddRowAfter,
    DeleteRow,
    AddColumnBefore,
    AddColumnAfter,
    DeleteColumn,
    MergeCells,
    SplitCell,
    DeleteTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    InsertTable { rows: u32, cols: u32, with_header: bool },
    /// Turn the text block under the caret into a heading.
    SetHeading { level: u8 },
    /// Style the selected text.
    AddMark(Mark),
    /// Insert styled text at the caret.
    InsertStyledText { text: String, marks: Vec<Mark> },
    /// Turn the selected text blocks into list items.
    ConvertToList(ListKind),
    SetAlign(Align),
    SetLineHeight(f32),
    WrapQuote,
    InsertText(String),
    TransformCase(CaseTransform),
    ReplaceSelection(String),
    /// Frame the text block under the caret.
    WrapBox(BoxStyle),
    /// Insert a block after the node under the caret.
    InsertNode(Node),
    Table(TableOp),
}

/// Minimum set of primitives a document editor exposes to the assistant.
pub trait DocumentSurface {
    fn is_editable(&self) -> bool;

    fn selection(&self) -> Selection;

    fn text_between(&self, from: usize, to: usize) -> String;

    fn supports(&self, capability: Capability) -> bool;

    fn apply(&mut self, command: EditCommand) -> Result<(), SurfaceError>;

    /// Generic insertion used when no structured command fits.
    fn insert_html(&mut self, html: &str) -> Result<(), SurfaceError>;

    fn selected_text(&self) -> String {
        let sel = self.selection();
        self.text_between(sel.from, sel.to)
    }
}
