//! HTML and plain text export.

use crate::doc::{BoxStyle, Doc, InlineSpan, List, ListKind, Node, Table, TextBlock, VideoProvider, Widget};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

pub fn to_html(doc: &Doc) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"doc\">\n");
    for n in &doc.nodes {
        out.push_str("  ");
        out.push_str(&node_to_html(n));
        out.push('\n');
    }
    out.push_str("</div>");
    out
}

pub fn node_to_html(node: &Node) -> String {
    match node {
        Node::Paragraph(b) => format!("<p{}>{}</p>", block_style_attr(b), render_spans_html(&b.spans)),
        Node::Heading { level, block } => {
            let lvl = (*level).clamp(1, 6);
            format!("<h{lvl}{}>{}</h{lvl}>", block_style_attr(block), render_spans_html(&block.spans))
        }
        Node::Quote(b) => format!("<blockquote>{}</blockquote>", render_spans_html(&b.spans)),
        Node::List(list) => list_to_html(list),
        Node::CodeBlock { language, code } => {
            let class = language
                .as_ref()
                .map(|l| format!(" class=\"language-{}\"", attr(l)))
                .unwrap_or_default();
            format!("<pre><code{}>{}</code></pre>", class, text(code))
        }
        Node::Separator => "<hr/>".to_string(),
        Node::Table(t) => table_to_html(t),
        Node::Image { src, alt } => format!("<img src=\"{}\" alt=\"{}\"/>", attr(src), attr(alt)),
        Node::Video { src, provider: VideoProvider::Youtube } => format!(
            "<div data-youtube-video><iframe src=\"https://www.youtube.com/embed/{}\" allowfullscreen></iframe></div>",
            attr(src)
        ),
        Node::Video { src, provider: VideoProvider::File } => {
            format!("<video src=\"{}\" controls></video>", attr(src))
        }
        Node::Canvas { width, height } => {
            format!("<canvas data-drawing width=\"{width}\" height=\"{height}\"></canvas>")
        }
        Node::FormulaInline { tex } => format!("<span class=\"formula-inline\">{}</span>", text(tex)),
        Node::FormulaBlock { tex } => format!("<div class=\"formula-block\">{}</div>", text(tex)),
        Node::Columns { columns } => {
            let inner: String = columns
                .iter()
                .map(|c| format!("<div class=\"column\">{}</div>", render_spans_html(&c.spans)))
                .collect();
            format!("<div class=\"columns\" style=\"display:grid;grid-template-columns:repeat({},1fr);gap:1rem\">{}</div>", columns.len(), inner)
        }
        Node::Widget { widget } => widget_to_html(widget),
        Node::Boxed { style, block } => format!(
            "<div style=\"{}\">{}</div>",
            box_css(style),
            render_spans_html(&block.spans)
        ),
        Node::Html { html } => html.clone(),
    }
}

fn block_style_attr(b: &TextBlock) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(a) = b.align { parts.push(format!("text-align:{}", a.as_css())); }
    if let Some(h) = b.line_height { parts.push(format!("line-height:{h}")); }
    if parts.is_empty() { String::new() } else { format!(" style=\"{}\"", parts.join(";")) }
}

fn box_css(style: &BoxStyle) -> String {
    let mut parts = vec!["padding:1rem".to_string()];
    if let Some(b) = &style.border { parts.push(format!("border:{}px solid {}", b.width_px, attr(&b.color))); }
    if let Some(s) = style.shadow { parts.push(format!("box-shadow:{}", s.as_css())); }
    parts.join(";")
}

fn list_to_html(list: &List) -> String {
    let tag = if list.kind == ListKind::Ordered { "ol" } else { "ul" };
    let data = if list.kind == ListKind::Task { " data-type=\"taskList\"" } else { "" };
    let items: String = list
        .items
        .iter()
        .map(|item| match list.kind {
            ListKind::Task => format!(
                "<li data-checked=\"{}\">{}</li>",
                item.checked,
                text(&item.text)
            ),
            _ => format!("<li>{}</li>", text(&item.text)),
        })
        .collect();
    format!("<{tag}{data}>{items}</{tag}>")
}

fn table_to_html(t: &Table) -> String {
    let mut out = String::from("<table>");
    for (ri, row) in t.rows.iter().enumerate() {
        out.push_str("<tr>");
        let tag = if t.header_row && ri == 0 { "th" } else { "td" };
        for cell in &row.cells {
            if cell.placeholder { continue; }
            let mut attrs = String::new();
            if cell.colspan > 1 { attrs.push_str(&format!(" colspan=\"{}\"", cell.colspan)); }
            if cell.rowspan > 1 { attrs.push_str(&format!(" rowspan=\"{}\"", cell.rowspan)); }
            out.push_str(&format!("<{tag}{attrs}>{}</{tag}>", text(&cell.text)));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

fn widget_to_html(widget: &Widget) -> String {
    match widget {
        Widget::Button { label, href, color } => {
            let style = format!("background:{};color:#ffffff;padding:0.5rem 1rem;border-radius:6px;border:none", attr(color));
            match href {
                Some(h) => format!("<a href=\"{}\" style=\"{};text-decoration:none\">{}</a>", attr(h), style, text(label)),
                None => format!("<button style=\"{}\">{}</button>", style, text(label)),
            }
        }
        Widget::Badge { label, color } => format!(
            "<span style=\"background:{};color:#ffffff;padding:0.15rem 0.5rem;border-radius:9999px;font-size:0.75rem\">{}</span>",
            attr(color),
            text(label)
        ),
        Widget::Progress { percent, color } => format!(
            "<div style=\"background:#e5e7eb;border-radius:9999px;height:0.75rem\"><div style=\"width:{percent}%;background:{};height:100%;border-radius:9999px\"></div></div>",
            attr(color)
        ),
    }
}

pub fn render_spans_html(spans: &[InlineSpan]) -> String {
    let mut s = String::new();
    for span in spans {
        let mut inner = text(&span.text).to_string();
        let st = &span.style;
        if st.code { inner = format!("<code>{inner}</code>"); }
        if st.superscript { inner = format!("<sup>{inner}</sup>"); }
        if st.subscript { inner = format!("<sub>{inner}</sub>"); }
        if st.strike { inner = format!("<s>{inner}</s>"); }
        if st.underline { inner = format!("<u>{inner}</u>"); }
        if st.italic { inner = format!("<em>{inner}</em>"); }
        if st.bold { inner = format!("<strong>{inner}</strong>"); }
        let mut styles: Vec<String> = Vec::new();
        if let Some(c) = &st.color { styles.push(format!("color:{}", attr(c))); }
        if let Some(h) = &st.highlight { styles.push(format!("background:{}", attr(h))); }
        if let Some(fs) = st.font_size_px { styles.push(format!("font-size:{fs}px")); }
        if !styles.is_empty() {
            inner = format!("<span style=\"{}\">{}</span>", styles.join(";"), inner);
        }
        if let Some(href) = &st.link {
            inner = format!("<a href=\"{}\">{}</a>", attr(href), inner);
        }
        s.push_str(&inner);
    }
    s
}

/// Plain text of the document, one line per block.
pub fn to_text(doc: &Doc) -> String {
    let mut lines: Vec<String> = Vec::new();
    for n in &doc.nodes {
        match n {
            Node::List(list) => {
                for (i, item) in list.items.iter().enumerate() {
                    lines.push(match list.kind {
                        ListKind::Bullet => format!("- {}", item.text),
                        ListKind::Ordered => format!("{}. {}", i + 1, item.text),
                        ListKind::Task => format!("[{}] {}", if item.checked { "x" } else { " " }, item.text),
                    });
                }
            }
            Node::CodeBlock { code, .. } => lines.push(code.clone()),
            Node::Table(t) => {
                for row in &t.rows {
                    let cells: Vec<&str> = row.cells.iter().filter(|c| !c.placeholder).map(|c| c.text.as_str()).collect();
                    lines.push(cells.join(" | "));
                }
            }
            Node::Image { alt, .. } => lines.push(alt.clone()),
            Node::FormulaInline { tex } | Node::FormulaBlock { tex } => lines.push(tex.clone()),
            Node::Columns { columns } => lines.extend(columns.iter().map(|c| c.text())),
            Node::Widget { widget: Widget::Button { label, .. } | Widget::Badge { label, .. } } => lines.push(label.clone()),
            other => {
                if let Some(b) = other.text_block() {
                    lines.push(b.text());
                }
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Align, InlineStyle, ListItem};

    #[test]
    fn spans_render_nested_marks_and_escape() {
        let spans = vec![
            InlineSpan { text: "a<b".into(), style: InlineStyle { bold: true, color: Some("#ff0000".into()), ..Default::default() } },
        ];
        assert_eq!(render_spans_html(&spans), "<span style=\"color:#ff0000\"><strong>a&lt;b</strong></span>");
    }

    #[test]
    fn headings_carry_alignment() {
        let mut block = TextBlock::plain("Título");
        block.align = Some(Align::Center);
        let html = node_to_html(&Node::Heading { level: 8, block });
        assert_eq!(html, "<h6 style=\"text-align:center\">Título</h6>");
    }

    #[test]
    fn header_row_uses_th_and_skips_placeholders() {
        let mut t = Table::new(2, 2, true);
        t.rows[1].cells[0].colspan = 2;
        t.rows[1].cells[1].placeholder = true;
        let html = table_to_html(&t);
        assert!(html.starts_with("<table><tr><th></th><th></th></tr>"));
        assert!(html.contains("<td colspan=\"2\"></td></tr>"));
    }

    #[test]
    fn plain_text_lists_blocks() {
        let doc = Doc {
            nodes: vec![
                Node::paragraph("Resumen"),
                Node::List(List {
                    kind: ListKind::Task,
                    items: vec![ListItem { text: "uno".into(), checked: true }, ListItem { text: "dos".into(), checked: false }],
                }),
                Node::Separator,
            ],
        };
        assert_eq!(to_text(&doc), "Resumen\n[x] uno\n[ ] dos");
    }
}
