//! Commands/operations for editing.
//!
//! Every operation works on a document and returns the selection to use afterwards.
//! Callers apply them to a scratch copy so a failed command leaves the live document untouched.

use crate::doc::{Doc, InlineSpan, InlineStyle, List, ListItem, ListKind, Node, Table, TableCell, TableRow, TextBlock};
use crate::selection::{self, CellRange, Selection};
use crate::surface::{Capability, CaseTransform, EditCommand, Mark, SurfaceError, TableOp};

pub fn apply(doc: &mut Doc, sel: &Selection, command: EditCommand) -> Result<Selection, SurfaceError> {
    match command {
        EditCommand::InsertTable { rows, cols, with_header } => {
            if rows == 0 || cols == 0 {
                return Err(SurfaceError::Unsupported("table without rows or columns".into()));
            }
            let idx = insert_node(doc, sel, Node::Table(Table::new(rows, cols, with_header)));
            Ok(Selection::in_cell(selection::node_start(doc, idx), 0, 0))
        }
        EditCommand::SetHeading { level } => {
            let level = level.clamp(1, 6);
            convert_blocks(doc, sel, |block| Node::Heading { level, block })?;
            Ok(*sel)
        }
        EditCommand::AddMark(mark) => {
            style_selection(doc, sel, |s| apply_mark(s, &mark))?;
            Ok(*sel)
        }
        EditCommand::InsertStyledText { text, marks } => {
            let mut style = InlineStyle::default();
            for m in &marks {
                apply_mark(&mut style, m);
            }
            insert_text(doc, sel.to, &text, Some(style))
        }
        EditCommand::InsertText(text) => insert_text(doc, sel.to, &text, None),
        EditCommand::ConvertToList(kind) => convert_to_list(doc, sel, kind),
        EditCommand::SetAlign(align) => {
            update_blocks(doc, sel, |b| b.align = Some(align))?;
            Ok(*sel)
        }
        EditCommand::SetLineHeight(height) => {
            if !(height.is_finite() && height > 0.0) {
                return Err(SurfaceError::Unsupported(format!("line height {height}")));
            }
            update_blocks(doc, sel, |b| b.line_height = Some(height))?;
            Ok(*sel)
        }
        EditCommand::WrapQuote => {
            convert_blocks(doc, sel, Node::Quote)?;
            Ok(*sel)
        }
        EditCommand::TransformCase(case) => {
            transform_case(doc, sel, case)?;
            Ok(*sel)
        }
        EditCommand::ReplaceSelection(text) => replace_selection(doc, sel, &text),
        EditCommand::WrapBox(style) => {
            let targets = text_block_indices(doc, sel);
            if targets.is_empty() {
                return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to });
            }
            for i in targets {
                let node = std::mem::take(&mut doc.nodes[i]);
                doc.nodes[i] = match node {
                    Node::Boxed { style: mut existing, block } => {
                        existing.merge(&style);
                        Node::Boxed { style: existing, block }
                    }
                    other => match other.take_block() {
                        Some(block) => Node::Boxed { style: style.clone(), block },
                        None => return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to }),
                    },
                };
            }
            Ok(*sel)
        }
        EditCommand::InsertNode(node) => {
            let idx = insert_node(doc, sel, node);
            Ok(Selection::caret(selection::node_start(doc, idx + 1)))
        }
        EditCommand::Table(op) => table_op(doc, sel, op),
    }
}

/// Capability a command depends on, if any.
pub fn required_capability(command: &EditCommand) -> Option<Capability> {
    match command {
        EditCommand::InsertTable { .. } | EditCommand::Table(_) => Some(Capability::Tables),
        EditCommand::ConvertToList(ListKind::Task) => Some(Capability::TaskLists),
        EditCommand::InsertNode(node) => match node {
            Node::Table(_) => Some(Capability::Tables),
            Node::Video { .. } => Some(Capability::VideoEmbed),
            Node::FormulaInline { .. } | Node::FormulaBlock { .. } => Some(Capability::Math),
            Node::Canvas { .. } => Some(Capability::Canvas),
            Node::List(List { kind: ListKind::Task, .. }) => Some(Capability::TaskLists),
            Node::Columns { .. } => Some(Capability::Columns),
            Node::Widget { .. } => Some(Capability::Widgets),
            _ => None,
        },
        _ => None,
    }
}

fn apply_mark(style: &mut InlineStyle, mark: &Mark) {
    match mark {
        Mark::Bold => style.bold = true,
        Mark::Italic => style.italic = true,
        Mark::Underline => style.underline = true,
        Mark::Strike => style.strike = true,
        Mark::Superscript => {
            style.superscript = true;
            style.subscript = false;
        }
        Mark::Subscript => {
            style.subscript = true;
            style.superscript = false;
        }
        Mark::Code => style.code = true,
        Mark::Color(c) => style.color = Some(c.clone()),
        Mark::Highlight(c) => style.highlight = Some(c.clone()),
        Mark::FontSize(px) => style.font_size_px = Some(*px),
        Mark::Link(href) => style.link = Some(href.clone()),
    }
}

/// Inserts after the node under the caret, or at the end of an empty document.
pub fn insert_node(doc: &mut Doc, sel: &Selection, node: Node) -> usize {
    let idx = selection::resolve(doc, sel.to).map(|r| r.node_index + 1).unwrap_or(0);
    doc.nodes.insert(idx, node);
    idx
}

fn insert_text(doc: &mut Doc, pos: usize, text: &str, style: Option<InlineStyle>) -> Result<Selection, SurfaceError> {
    let len = text.chars().count();
    let Some(r) = selection::resolve(doc, pos) else {
        doc.nodes.push(Node::Paragraph(TextBlock::styled(text, style.unwrap_or_default())));
        return Ok(Selection::caret(len));
    };
    if let Some(block) = doc.nodes[r.node_index].text_block_mut() {
        let style = style.unwrap_or_else(|| block.style_at(r.offset));
        block.insert_span(r.offset, InlineSpan { text: text.to_string(), style });
        return Ok(Selection::caret(pos + len));
    }
    let idx = r.node_index + 1;
    doc.nodes.insert(idx, Node::Paragraph(TextBlock::styled(text, style.unwrap_or_default())));
    Ok(Selection::caret(selection::node_start(doc, idx) + len))
}

fn style_selection(doc: &mut Doc, sel: &Selection, f: impl Fn(&mut InlineStyle)) -> Result<(), SurfaceError> {
    let segments = selection::text_segments(doc, sel.from, sel.to);
    if segments.is_empty() {
        return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to });
    }
    for seg in segments {
        if let Some(block) = doc.nodes[seg.node_index].text_block_mut() {
            block.style_range(seg.from, seg.to, &f);
        }
    }
    Ok(())
}

fn text_block_indices(doc: &Doc, sel: &Selection) -> Vec<usize> {
    selection::nodes_in_range(doc, sel.from, sel.to)
        .into_iter()
        .filter(|&i| doc.nodes[i].text_block().is_some())
        .collect()
}

fn update_blocks(doc: &mut Doc, sel: &Selection, f: impl Fn(&mut TextBlock)) -> Result<(), SurfaceError> {
    let targets = text_block_indices(doc, sel);
    if targets.is_empty() {
        return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to });
    }
    for i in targets {
        if let Some(block) = doc.nodes[i].text_block_mut() {
            f(block);
        }
    }
    Ok(())
}

fn convert_blocks(doc: &mut Doc, sel: &Selection, wrap: impl Fn(TextBlock) -> Node) -> Result<(), SurfaceError> {
    let targets = text_block_indices(doc, sel);
    if targets.is_empty() {
        return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to });
    }
    for i in targets {
        let node = std::mem::take(&mut doc.nodes[i]);
        if let Some(block) = node.take_block() {
            doc.nodes[i] = wrap(block);
        }
    }
    Ok(())
}

fn convert_to_list(doc: &mut Doc, sel: &Selection, kind: ListKind) -> Result<Selection, SurfaceError> {
    let targets = text_block_indices(doc, sel);
    let Some(&first) = targets.first() else {
        return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to });
    };
    let items = targets
        .iter()
        .filter_map(|&i| doc.nodes[i].text_block().map(|b| ListItem { text: b.text(), checked: false }))
        .collect();
    for &i in targets.iter().skip(1).rev() {
        doc.nodes.remove(i);
    }
    doc.nodes[first] = Node::List(List { kind, items });
    Ok(Selection::caret(selection::node_start(doc, first)))
}

fn transform_case(doc: &mut Doc, sel: &Selection, case: CaseTransform) -> Result<(), SurfaceError> {
    let segments = selection::text_segments(doc, sel.from, sel.to);
    if segments.is_empty() {
        return Err(SurfaceError::InvalidRange { from: sel.from, to: sel.to });
    }
    for seg in segments {
        let Some(block) = doc.nodes[seg.node_index].text_block_mut() else { continue };
        match case {
            CaseTransform::Upper => block.map_range(seg.from, seg.to, |s| s.to_uppercase()),
            CaseTransform::Lower => block.map_range(seg.from, seg.to, |s| s.to_lowercase()),
            CaseTransform::Capitalize => {
                let mut word_start = seg.from == 0
                    || block.text().chars().nth(seg.from - 1).map_or(true, |c| !c.is_alphanumeric());
                block.map_range(seg.from, seg.to, |s| capitalize_words(s, &mut word_start));
            }
        }
    }
    Ok(())
}

fn capitalize_words(s: &str, word_start: &mut bool) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if *word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            *word_start = false;
        } else {
            out.push(ch);
            *word_start = true;
        }
    }
    out
}

fn replace_selection(doc: &mut Doc, sel: &Selection, text: &str) -> Result<Selection, SurfaceError> {
    let segments = selection::text_segments(doc, sel.from, sel.to);
    let style = segments
        .first()
        .and_then(|seg| doc.nodes[seg.node_index].text_block().map(|b| b.style_at(seg.from + 1)));
    for seg in segments.iter().rev() {
        if let Some(block) = doc.nodes[seg.node_index].text_block_mut() {
            block.delete_range(seg.from, seg.to);
        }
    }
    insert_text(doc, sel.from, text, style)
}

fn table_op(doc: &mut Doc, sel: &Selection, op: TableOp) -> Result<Selection, SurfaceError> {
    let r = selection::resolve(doc, sel.from).ok_or(SurfaceError::EmptyDocument)?;
    let idx = r.node_index;
    let table_start = selection::node_start(doc, idx);
    let Node::Table(table) = &mut doc.nodes[idx] else {
        return Err(SurfaceError::NoTable);
    };

    let cells = sel.cells.unwrap_or_else(|| CellRange::single(0, 0));
    let (min_r, min_c, max_r, max_c) = cells.bounds();
    if max_r >= table.rows.len() || max_c >= table.col_count() {
        return Err(SurfaceError::OutOfBounds { row: max_r, col: max_c });
    }

    let mut next = Selection::in_cell(table_start, min_r, min_c);
    match op {
        TableOp::AddRowBefore => add_row(table, min_r),
        TableOp::AddRowAfter => {
            add_row(table, max_r + 1);
            next = Selection::in_cell(table_start, max_r + 1, min_c);
        }
        TableOp::DeleteRow => delete_rows(table, min_r, max_r),
        TableOp::AddColumnBefore => add_col(table, min_c),
        TableOp::AddColumnAfter => {
            add_col(table, max_c + 1);
            next = Selection::in_cell(table_start, min_r, max_c + 1);
        }
        TableOp::DeleteColumn => delete_cols(table, min_c, max_c),
        TableOp::MergeCells => {
            // A single cell merges with its right neighbour.
            let end_c = if cells.is_single() { max_c + 1 } else { max_c };
            if end_c >= table.col_count() {
                return Err(SurfaceError::OutOfBounds { row: max_r, col: end_c });
            }
            merge_cells(table, min_r, min_c, max_r, end_c);
        }
        TableOp::SplitCell => split_cell(table, min_r, min_c),
        TableOp::DeleteTable => table.rows.clear(),
    }

    if table.rows.is_empty() || table.col_count() == 0 {
        doc.nodes.remove(idx);
        return Ok(Selection::caret(table_start.min(selection::doc_size(doc))));
    }
    Ok(next)
}

/// Structural edits split merged cells first so spans never straddle a removed line.
fn unmerge_all(t: &mut Table) {
    for row in &mut t.rows {
        for cell in &mut row.cells {
            cell.colspan = 1;
            cell.rowspan = 1;
            cell.placeholder = false;
        }
    }
}

pub fn add_row(t: &mut Table, at: usize) {
    unmerge_all(t);
    let cols = t.col_count();
    let at = at.min(t.rows.len());
    t.rows.insert(at, TableRow { cells: (0..cols).map(|_| TableCell::default()).collect() });
}

pub fn delete_rows(t: &mut Table, from: usize, to: usize) {
    unmerge_all(t);
    if from < t.rows.len() {
        t.rows.drain(from..=to.min(t.rows.len() - 1));
    }
}

pub fn add_col(t: &mut Table, at: usize) {
    unmerge_all(t);
    for row in &mut t.rows {
        let at = at.min(row.cells.len());
        row.cells.insert(at, TableCell::default());
    }
}

pub fn delete_cols(t: &mut Table, from: usize, to: usize) {
    unmerge_all(t);
    for row in &mut t.rows {
        if from < row.cells.len() {
            let end = to.min(row.cells.len() - 1);
            row.cells.drain(from..=end);
        }
    }
}

pub fn merge_cells(t: &mut Table, sr: usize, sc: usize, er: usize, ec: usize) {
    let mut texts = Vec::new();
    for r in sr..=er {
        for c in sc..=ec {
            let cell = &mut t.rows[r].cells[c];
            if !cell.text.trim().is_empty() {
                texts.push(std::mem::take(&mut cell.text));
            }
            cell.placeholder = !(r == sr && c == sc);
            cell.colspan = 1;
            cell.rowspan = 1;
        }
    }
    let master = &mut t.rows[sr].cells[sc];
    master.text = texts.join(" ");
    master.colspan = (ec - sc + 1) as u32;
    master.rowspan = (er - sr + 1) as u32;
}

pub fn split_cell(t: &mut Table, r: usize, c: usize) {
    let master = &mut t.rows[r].cells[c];
    if master.placeholder {
        return;
    }
    let (rs, cs) = (master.rowspan as usize, master.colspan as usize);
    master.rowspan = 1;
    master.colspan = 1;
    for rr in r..(r + rs).min(t.rows.len()) {
        for cc in c..(c + cs).min(t.rows[rr].cells.len()) {
            t.rows[rr].cells[cc].placeholder = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Align, BoxStyle, Shadow};

    fn doc(texts: &[&str]) -> Doc {
        Doc { nodes: texts.iter().map(|t| Node::paragraph(t)).collect() }
    }

    #[test]
    fn insert_table_lands_after_caret_node() {
        let mut d = doc(&["uno", "dos"]);
        let sel = apply(&mut d, &Selection::caret(1), EditCommand::InsertTable { rows: 2, cols: 3, with_header: true }).unwrap();
        let Node::Table(t) = &d.nodes[1] else { panic!("expected table") };
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.col_count(), 3);
        assert!(t.header_row);
        assert_eq!(sel.cells, Some(CellRange::single(0, 0)));
    }

    #[test]
    fn add_mark_styles_only_selected_text() {
        let mut d = doc(&["hola mundo"]);
        apply(&mut d, &Selection::range(5, 10), EditCommand::AddMark(Mark::Bold)).unwrap();
        let block = d.nodes[0].text_block().unwrap();
        assert_eq!(block.spans.len(), 2);
        assert!(!block.spans[0].style.bold);
        assert!(block.spans[1].style.bold);
        assert_eq!(block.spans[1].text, "mundo");
    }

    #[test]
    fn add_mark_on_caret_is_rejected() {
        let mut d = doc(&["hola"]);
        let err = apply(&mut d, &Selection::caret(2), EditCommand::AddMark(Mark::Italic)).unwrap_err();
        assert_eq!(err, SurfaceError::InvalidRange { from: 2, to: 2 });
    }

    #[test]
    fn styled_text_inserts_at_caret() {
        let mut d = doc(&["ab"]);
        let sel = apply(
            &mut d,
            &Selection::caret(1),
            EditCommand::InsertStyledText { text: "X".into(), marks: vec![Mark::Color("#ff0000".into())] },
        )
        .unwrap();
        let block = d.nodes[0].text_block().unwrap();
        assert_eq!(block.text(), "aXb");
        assert_eq!(block.spans[1].style.color.as_deref(), Some("#ff0000"));
        assert_eq!(sel, Selection::caret(2));
    }

    #[test]
    fn heading_and_align_convert_caret_block() {
        let mut d = doc(&["Intro", "cuerpo"]);
        apply(&mut d, &Selection::caret(2), EditCommand::SetHeading { level: 9 }).unwrap();
        apply(&mut d, &Selection::caret(2), EditCommand::SetAlign(Align::Center)).unwrap();
        match &d.nodes[0] {
            Node::Heading { level, block } => {
                assert_eq!(*level, 6);
                assert_eq!(block.align, Some(Align::Center));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn convert_to_list_collects_blocks() {
        let mut d = doc(&["a", "b", "c"]);
        apply(&mut d, &Selection::range(0, 3), EditCommand::ConvertToList(ListKind::Ordered)).unwrap();
        assert_eq!(d.nodes.len(), 2);
        let Node::List(list) = &d.nodes[0] else { panic!("expected list") };
        assert_eq!(list.kind, ListKind::Ordered);
        assert_eq!(list.items.iter().map(|i| i.text.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn capitalize_respects_word_boundaries_across_spans() {
        let mut d = doc(&["hola MUNDO feliz"]);
        apply(&mut d, &Selection::range(0, 3), EditCommand::AddMark(Mark::Bold)).unwrap();
        apply(&mut d, &Selection::range(0, 16), EditCommand::TransformCase(CaseTransform::Capitalize)).unwrap();
        assert_eq!(d.nodes[0].text_block().unwrap().text(), "Hola Mundo Feliz");
    }

    #[test]
    fn replace_selection_keeps_surrounding_text() {
        let mut d = doc(&["el gato negro"]);
        let sel = apply(&mut d, &Selection::range(3, 7), EditCommand::ReplaceSelection("perro".into())).unwrap();
        assert_eq!(d.nodes[0].text_block().unwrap().text(), "el perro negro");
        assert_eq!(sel, Selection::caret(8));
    }

    #[test]
    fn wrap_box_merges_existing_style() {
        let mut d = doc(&["nota"]);
        let shadow = BoxStyle { border: None, shadow: Some(Shadow::Soft) };
        apply(&mut d, &Selection::caret(0), EditCommand::WrapBox(shadow)).unwrap();
        let border = BoxStyle {
            border: Some(crate::doc::BorderStyle { color: "#000000".into(), width_px: 2 }),
            shadow: None,
        };
        apply(&mut d, &Selection::caret(0), EditCommand::WrapBox(border)).unwrap();
        let Node::Boxed { style, block } = &d.nodes[0] else { panic!("expected box") };
        assert_eq!(style.shadow, Some(Shadow::Soft));
        assert_eq!(style.border.as_ref().map(|b| b.width_px), Some(2));
        assert_eq!(block.text(), "nota");
    }

    #[test]
    fn table_ops_require_table_under_caret() {
        let mut d = doc(&["texto"]);
        let err = apply(&mut d, &Selection::caret(0), EditCommand::Table(TableOp::AddRowAfter)).unwrap_err();
        assert_eq!(err, SurfaceError::NoTable);
    }

    #[test]
    fn table_row_and_column_edits() {
        let mut d = Doc { nodes: vec![Node::Table(Table::new(2, 2, false))] };
        let sel = Selection::in_cell(0, 1, 1);
        apply(&mut d, &sel, EditCommand::Table(TableOp::AddRowAfter)).unwrap();
        apply(&mut d, &sel, EditCommand::Table(TableOp::AddColumnBefore)).unwrap();
        let Node::Table(t) = &d.nodes[0] else { panic!("expected table") };
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.col_count(), 3);

        apply(&mut d, &Selection::in_cell(0, 0, 0), EditCommand::Table(TableOp::DeleteColumn)).unwrap();
        let Node::Table(t) = &d.nodes[0] else { panic!("expected table") };
        assert_eq!(t.col_count(), 2);
    }

    #[test]
    fn merge_then_split_cells() {
        let mut d = Doc { nodes: vec![Node::Table(Table::new(2, 3, false))] };
        apply(&mut d, &Selection::in_cell(0, 0, 0), EditCommand::Table(TableOp::MergeCells)).unwrap();
        {
            let Node::Table(t) = &d.nodes[0] else { panic!("expected table") };
            assert_eq!(t.rows[0].cells[0].colspan, 2);
            assert!(t.rows[0].cells[1].placeholder);
        }
        apply(&mut d, &Selection::in_cell(0, 0, 0), EditCommand::Table(TableOp::SplitCell)).unwrap();
        let Node::Table(t) = &d.nodes[0] else { panic!("expected table") };
        assert_eq!(t.rows[0].cells[0].colspan, 1);
        assert!(!t.rows[0].cells[1].placeholder);
    }

    #[test]
    fn deleting_last_row_removes_table() {
        let mut d = Doc { nodes: vec![Node::paragraph("x"), Node::Table(Table::new(1, 2, false))] };
        apply(&mut d, &Selection::in_cell(2, 0, 0), EditCommand::Table(TableOp::DeleteRow)).unwrap();
        assert_eq!(d.nodes.len(), 1);
    }

    #[test]
    fn capability_mapping_covers_embeds() {
        let video = EditCommand::InsertNode(Node::Video { src: "abc".into(), provider: crate::doc::VideoProvider::Youtube });
        assert_eq!(required_capability(&video), Some(Capability::VideoEmbed));
        assert_eq!(required_capability(&EditCommand::WrapQuote), None);
    }
}
