//! Document tree structures and helpers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Doc {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Node {
    Paragraph(TextBlock),
    Heading { level: u8, block: TextBlock },
    Quote(TextBlock),
    List(List),
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        code: String,
    },
    Separator,
    Table(Table),
    Image { src: String, alt: String },
    Video { src: String, provider: VideoProvider },
    Canvas { width: u32, height: u32 },
    FormulaInline { tex: String },
    FormulaBlock { tex: String },
    Columns { columns: Vec<TextBlock> },
    Widget { widget: Widget },
    Boxed { style: BoxStyle, block: TextBlock },
    /// Raw markup inserted when a structured command is not available.
    Html { html: String },
}

impl Default for Node {
    fn default() -> Self {
        Node::Paragraph(TextBlock::default())
    }
}

impl Node {
    pub fn paragraph(text: &str) -> Self {
        Node::Paragraph(TextBlock::plain(text))
    }

    /// The editable inline content of this node, if it has any.
    pub fn text_block(&self) -> Option<&TextBlock> {
        match self {
            Node::Paragraph(b) | Node::Quote(b) => Some(b),
            Node::Heading { block, .. } | Node::Boxed { block, .. } => Some(block),
            _ => None,
        }
    }

    pub fn text_block_mut(&mut self) -> Option<&mut TextBlock> {
        match self {
            Node::Paragraph(b) | Node::Quote(b) => Some(b),
            Node::Heading { block, .. } | Node::Boxed { block, .. } => Some(block),
            _ => None,
        }
    }

    /// Number of selection positions this node occupies.
    /// Text blocks take one per character plus a closing boundary, everything else is an atom.
    pub fn size(&self) -> usize {
        match self.text_block() {
            Some(b) => b.char_len() + 1,
            None => 1,
        }
    }

    pub fn take_block(self) -> Option<TextBlock> {
        match self {
            Node::Paragraph(b) | Node::Quote(b) => Some(b),
            Node::Heading { block, .. } | Node::Boxed { block, .. } => Some(block),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InlineStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strike: bool,
    #[serde(default)]
    pub superscript: bool,
    #[serde(default)]
    pub subscript: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// CSS color hex for foreground text color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// CSS color hex for text highlight (background)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_px: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InlineSpan {
    pub text: String,
    #[serde(default)]
    pub style: InlineStyle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_css(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }
}

/// A run of styled inline text with block level layout attributes.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TextBlock {
    #[serde(default)]
    pub spans: Vec<InlineSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

impl TextBlock {
    pub fn plain(text: &str) -> Self {
        Self::styled(text, InlineStyle::default())
    }

    pub fn styled(text: &str, style: InlineStyle) -> Self {
        let spans = if text.is_empty() {
            Vec::new()
        } else {
            vec![InlineSpan { text: text.to_string(), style }]
        };
        Self { spans, align: None, line_height: None }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    pub fn slice(&self, from: usize, to: usize) -> String {
        self.text().chars().skip(from).take(to.saturating_sub(from)).collect()
    }

    /// Split spans so that a span starts exactly at `offset`; returns that span's index.
    fn ensure_boundary(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.spans.len() {
            if offset == pos {
                return i;
            }
            let len = self.spans[i].text.chars().count();
            if offset < pos + len {
                let byte = char_to_byte(&self.spans[i].text, offset - pos);
                let tail = self.spans[i].text.split_off(byte);
                let style = self.spans[i].style.clone();
                self.spans.insert(i + 1, InlineSpan { text: tail, style });
                return i + 1;
            }
            pos += len;
        }
        self.spans.len()
    }

    /// Apply `f` to the style of every character in `from..to`.
    pub fn style_range(&mut self, from: usize, to: usize, f: impl Fn(&mut InlineStyle)) {
        if from >= to {
            return;
        }
        let start = self.ensure_boundary(from);
        let end = self.ensure_boundary(to);
        for span in &mut self.spans[start..end] {
            f(&mut span.style);
        }
        self.normalize();
    }

    /// Rewrite the text of `from..to` span by span, keeping each span's style.
    pub fn map_range(&mut self, from: usize, to: usize, mut f: impl FnMut(&str) -> String) {
        if from >= to {
            return;
        }
        let start = self.ensure_boundary(from);
        let end = self.ensure_boundary(to);
        for span in &mut self.spans[start..end] {
            span.text = f(&span.text);
        }
        self.normalize();
    }

    pub fn insert_span(&mut self, offset: usize, span: InlineSpan) {
        let idx = self.ensure_boundary(offset.min(self.char_len()));
        self.spans.insert(idx, span);
        self.normalize();
    }

    pub fn delete_range(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        let start = self.ensure_boundary(from);
        let end = self.ensure_boundary(to);
        self.spans.drain(start..end);
        self.normalize();
    }

    /// Style of the character just before `offset`, used when typing continues a run.
    pub fn style_at(&self, offset: usize) -> InlineStyle {
        let mut pos = 0;
        for span in &self.spans {
            let len = span.text.chars().count();
            if offset > pos && offset <= pos + len {
                return span.style.clone();
            }
            pos += len;
        }
        InlineStyle::default()
    }

    fn normalize(&mut self) {
        self.spans.retain(|s| !s.text.is_empty());
        let mut merged: Vec<InlineSpan> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.style == span.style => prev.text.push_str(&span.text),
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }
}

fn char_to_byte(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(b, _)| b).unwrap_or(s.len())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Ordered,
    Task,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ListItem {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub header_row: bool,
}

impl Table {
    pub fn new(rows: u32, cols: u32, header_row: bool) -> Self {
        let rows = (0..rows)
            .map(|_| TableRow { cells: (0..cols).map(|_| TableCell::default()).collect() })
            .collect();
        Self { rows, header_row }
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub colspan: u32,
    pub rowspan: u32,
    /// When true, this cell is a placeholder covered by a spanning cell.
    /// The renderer should skip drawing it.
    #[serde(default)]
    pub placeholder: bool,
}

impl Default for TableCell {
    fn default() -> Self {
        Self { text: String::new(), colspan: 1, rowspan: 1, placeholder: false }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    Youtube,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Widget {
    Button {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
        color: String,
    },
    Badge { label: String, color: String },
    Progress { percent: u8, color: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BorderStyle {
    pub color: String,
    pub width_px: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shadow {
    Soft,
    Medium,
    Strong,
}

impl Shadow {
    pub fn as_css(self) -> &'static str {
        match self {
            Shadow::Soft => "0 1px 3px rgba(0,0,0,0.12)",
            Shadow::Medium => "0 4px 8px rgba(0,0,0,0.2)",
            Shadow::Strong => "0 10px 24px rgba(0,0,0,0.35)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BoxStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

impl BoxStyle {
    pub fn merge(&mut self, other: &BoxStyle) {
        if other.border.is_some() { self.border = other.border.clone(); }
        if other.shadow.is_some() { self.shadow = other.shadow; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> InlineStyle {
        InlineStyle { bold: true, ..Default::default() }
    }

    #[test]
    fn style_range_splits_and_merges_spans() {
        let mut b = TextBlock::plain("hello world");
        b.style_range(6, 11, |s| s.bold = true);
        assert_eq!(b.spans.len(), 2);
        assert_eq!(b.spans[0].text, "hello ");
        assert_eq!(b.spans[1].text, "world");
        assert!(b.spans[1].style.bold);

        b.style_range(0, 6, |s| s.bold = true);
        assert_eq!(b.spans.len(), 1);
        assert_eq!(b.text(), "hello world");
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let mut b = TextBlock::plain("añoño");
        b.style_range(1, 3, |s| s.italic = true);
        assert_eq!(b.spans[0].text, "a");
        assert_eq!(b.spans[1].text, "ño");
        assert_eq!(b.spans[2].text, "ño");
        assert_eq!(b.char_len(), 5);
    }

    #[test]
    fn insert_and_delete_keep_neighbours() {
        let mut b = TextBlock::plain("ac");
        b.insert_span(1, InlineSpan { text: "b".into(), style: bold() });
        assert_eq!(b.text(), "abc");
        assert_eq!(b.style_at(2), bold());
        b.delete_range(1, 2);
        assert_eq!(b.text(), "ac");
        assert_eq!(b.spans.len(), 1);
    }

    #[test]
    fn slice_reads_char_range() {
        let b = TextBlock::plain("título largo");
        assert_eq!(b.slice(0, 6), "título");
        assert_eq!(b.slice(7, 40), "largo");
    }

    #[test]
    fn json_roundtrip_keeps_tagged_nodes() {
        let doc = Doc {
            nodes: vec![
                Node::Heading { level: 2, block: TextBlock::plain("Intro") },
                Node::Separator,
                Node::Widget { widget: Widget::Badge { label: "new".into(), color: "#22c55e".into() } },
            ],
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"type\":\"Separator\""));
        let back: Doc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
