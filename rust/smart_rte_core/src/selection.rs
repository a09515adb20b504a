//! Selection model over global document positions.
//!
//! Text blocks occupy one position per character plus a closing boundary;
//! every other node is a single atom position.

use serde::{Deserialize, Serialize};
use crate::doc::Doc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

/// Rectangular cell selection; a single cell has `start == end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellPos,
    pub end: CellPos,
}

impl CellRange {
    pub fn single(row: usize, col: usize) -> Self {
        let pos = CellPos { row, col };
        Self { start: pos, end: pos }
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// (min_row, min_col, max_row, max_col)
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (
            self.start.row.min(self.end.row),
            self.start.col.min(self.end.col),
            self.start.row.max(self.end.row),
            self.start.col.max(self.end.col),
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
    /// Selected cells when the caret sits on a table node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<CellRange>,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos, cells: None }
    }

    pub fn range(from: usize, to: usize) -> Self {
        Self { from: from.min(to), to: from.max(to), cells: None }
    }

    pub fn in_cell(pos: usize, row: usize, col: usize) -> Self {
        Self { from: pos, to: pos, cells: Some(CellRange::single(row, col)) }
    }

    pub fn in_cells(pos: usize, start: CellPos, end: CellPos) -> Self {
        Self { from: pos, to: pos, cells: Some(CellRange { start, end }) }
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn normalize(&mut self) {
        if self.from > self.to {
            std::mem::swap(&mut self.from, &mut self.to);
        }
    }
}

/// A position resolved to a node and an offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub node_index: usize,
    pub offset: usize,
}

/// The part of a text block covered by a range, in local char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub node_index: usize,
    pub from: usize,
    pub to: usize,
}

pub fn doc_size(doc: &Doc) -> usize {
    doc.nodes.iter().map(|n| n.size()).sum()
}

pub fn node_start(doc: &Doc, index: usize) -> usize {
    doc.nodes.iter().take(index).map(|n| n.size()).sum()
}

/// Positions past the end clamp to the end of the last node.
pub fn resolve(doc: &Doc, pos: usize) -> Option<Resolved> {
    let mut start = 0;
    for (i, node) in doc.nodes.iter().enumerate() {
        let size = node.size();
        if pos < start + size {
            return Some(Resolved { node_index: i, offset: pos - start });
        }
        start += size;
    }
    let last = doc.nodes.len().checked_sub(1)?;
    Some(Resolved { node_index: last, offset: doc.nodes[last].size() - 1 })
}

pub fn text_segments(doc: &Doc, from: usize, to: usize) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, node) in doc.nodes.iter().enumerate() {
        let size = node.size();
        if let Some(block) = node.text_block() {
            let len = block.char_len();
            let lo = from.max(start);
            let hi = to.min(start + len);
            if lo < hi {
                out.push(Segment { node_index: i, from: lo - start, to: hi - start });
            }
        }
        start += size;
        if start >= to {
            break;
        }
    }
    out
}

/// Indices of nodes touched by the range; a caret touches the node it sits in.
pub fn nodes_in_range(doc: &Doc, from: usize, to: usize) -> Vec<usize> {
    if from == to {
        return resolve(doc, from).map(|r| vec![r.node_index]).unwrap_or_default();
    }
    let mut out = Vec::new();
    let mut start = 0;
    for (i, node) in doc.nodes.iter().enumerate() {
        let size = node.size();
        if start < to && from < start + size {
            out.push(i);
        }
        start += size;
    }
    out
}

pub fn text_between(doc: &Doc, from: usize, to: usize) -> String {
    text_segments(doc, from, to)
        .iter()
        .filter_map(|s| doc.nodes[s.node_index].text_block().map(|b| b.slice(s.from, s.to)))
        .collect::<Vec<_>>()
        .join("\n")
}
