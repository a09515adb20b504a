//! One planner per tool intent.
//!
//! Planners only read the instruction and the selection; running the plan is left to
//! [`plan::run`](super::plan::run).

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use once_cell::sync::Lazy;
use regex::Regex;
use smart_rte_core::doc::{
    Align, BorderStyle, BoxStyle, List, ListItem, ListKind, Node, Shadow, Table, TextBlock, VideoProvider, Widget,
};
use smart_rte_core::export::node_to_html;
use smart_rte_core::{Capability, CaseTransform, EditCommand, Mark, TableOp};

use super::lexicon::{self, DEFAULT_HIGHLIGHT, DEFAULT_TEXT_COLOR, QUADRATIC};
use super::plan::{Notice, Outcome, ToolInput, ToolPlan};
use crate::intent::ToolIntent;

pub const MAX_TABLE_ROWS: u32 = 20;
pub const MAX_TABLE_COLS: u32 = 10;
const DEFAULT_TABLE_SIZE: u32 = 3;
const DEFAULT_HEADING_LEVEL: u8 = 2;
const SMALL_FONT_PX: u32 = 12;
const LARGE_FONT_PX: u32 = 24;
const DEFAULT_WIDGET_COLOR: &str = "#3b82f6";
const DEFAULT_BADGE_COLOR: &str = "#22c55e";

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static QUOTED: Lazy<Regex> = Lazy::new(|| re(r#"["“«]([^"”»]+)["”»]"#));
static AFTER_COLON: Lazy<Regex> = Lazy::new(|| re(r":\s+(.+)$"));
static NUMBER: Lazy<Regex> = Lazy::new(|| re(r"\d+"));
static URL: Lazy<Regex> = Lazy::new(|| re(r#"(?i)\bhttps?://[^\s"'<>]+|\bwww\.[^\s"'<>]+"#));
static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    re(r"(?:youtube\.com/(?:watch\?(?:[^\s#]*&)?v=|embed/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})")
});

pub fn plan(intent: ToolIntent, input: &ToolInput<'_>) -> Outcome {
    match intent {
        ToolIntent::Table => table(input),
        ToolIntent::TableModify => table_modify(input),
        ToolIntent::Heading => heading(input),
        ToolIntent::Bold => decorate(input, Mark::Bold, "texto en negrita"),
        ToolIntent::Italic => decorate(input, Mark::Italic, "texto en cursiva"),
        ToolIntent::Underline => decorate(input, Mark::Underline, "texto subrayado"),
        ToolIntent::Strikethrough => decorate(input, Mark::Strike, "texto tachado"),
        ToolIntent::Superscript => decorate(input, Mark::Superscript, "superíndice"),
        ToolIntent::Subscript => decorate(input, Mark::Subscript, "subíndice"),
        ToolIntent::Small => decorate(input, Mark::FontSize(SMALL_FONT_PX), "texto pequeño"),
        ToolIntent::Large => decorate(input, Mark::FontSize(LARGE_FONT_PX), "texto grande"),
        ToolIntent::Color => {
            let color = lexicon::resolve_color(input.instruction, DEFAULT_TEXT_COLOR);
            decorate(input, Mark::Color(color), "texto en color")
        }
        ToolIntent::Highlight => {
            let color = lexicon::resolve_color(input.instruction, DEFAULT_HIGHLIGHT);
            decorate(input, Mark::Highlight(color), "texto resaltado")
        }
        ToolIntent::List => list(input, ListKind::Bullet),
        ToolIntent::OrderedList => list(input, ListKind::Ordered),
        ToolIntent::TaskList => list(input, ListKind::Task),
        ToolIntent::Align => align(input),
        ToolIntent::Quote => quote(input),
        ToolIntent::Code => code(input),
        ToolIntent::Separator => Outcome::Plan(insert(Node::Separator)),
        ToolIntent::Link => link(input),
        ToolIntent::Image => image(input),
        ToolIntent::Youtube => match youtube_id(input.instruction) {
            Some(id) => youtube(&id),
            None => Outcome::Skip(Some(missing_url("Falta la URL de YouTube"))),
        },
        ToolIntent::Video => video(input),
        ToolIntent::Canvas => canvas(input),
        ToolIntent::Emoji => {
            let emoji = lexicon::resolve_emoji(input.instruction);
            let html = format!("<p>{}</p>", text(&emoji));
            Outcome::Plan(ToolPlan::command(EditCommand::InsertText(emoji)).or_html(html))
        }
        ToolIntent::Uppercase => case(input, CaseTransform::Upper),
        ToolIntent::Lowercase => case(input, CaseTransform::Lower),
        ToolIntent::Capitalize => case(input, CaseTransform::Capitalize),
        ToolIntent::Spacing => spacing(input),
        ToolIntent::Columns => columns(input),
        ToolIntent::Button => {
            let widget = Widget::Button {
                label: payload_text(input.instruction).unwrap_or_else(|| "Haz clic aquí".to_string()),
                href: find_url(input.instruction),
                color: lexicon::resolve_color(input.instruction, DEFAULT_WIDGET_COLOR),
            };
            Outcome::Plan(insert(Node::Widget { widget }))
        }
        ToolIntent::Badge => {
            let widget = Widget::Badge {
                label: payload_text(input.instruction).unwrap_or_else(|| "Nuevo".to_string()),
                color: lexicon::resolve_color(input.instruction, DEFAULT_BADGE_COLOR),
            };
            Outcome::Plan(insert(Node::Widget { widget }))
        }
        ToolIntent::Progress => {
            let widget = Widget::Progress {
                percent: progress_percent(input.instruction),
                color: lexicon::resolve_color(input.instruction, DEFAULT_WIDGET_COLOR),
            };
            Outcome::Plan(insert(Node::Widget { widget }))
        }
        ToolIntent::Border => {
            let style = BoxStyle {
                border: Some(BorderStyle {
                    color: lexicon::resolve_color(input.instruction, DEFAULT_TEXT_COLOR),
                    width_px: border_width(input.instruction),
                }),
                shadow: None,
            };
            boxed(input, style, "Contenido con borde")
        }
        ToolIntent::Shadow => {
            let style = BoxStyle { border: None, shadow: Some(shadow_strength(input.instruction)) };
            boxed(input, style, "Contenido con sombra")
        }
        ToolIntent::Formula => formula(input, false),
        ToolIntent::Fraction => formula(input, true),
    }
}

/// Structured insert of `node`, falling back to its rendered markup.
fn insert(node: Node) -> ToolPlan {
    let html = node_to_html(&node);
    let command = EditCommand::InsertNode(node);
    let requires = smart_rte_core::ops::required_capability(&command);
    ToolPlan { requires, primary: vec![command], fallbacks: vec![html] }
}

fn missing_url(title: &'static str) -> Notice {
    Notice { title, description: "Incluye una dirección que empiece por http:// o https://".to_string() }
}

/// Text the user wants inserted: quoted text first, then whatever follows a colon.
pub(crate) fn payload_text(instruction: &str) -> Option<String> {
    QUOTED
        .captures(instruction)
        .or_else(|| AFTER_COLON.captures(instruction))
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The instruction up to where its quoted or colon payload begins.
fn command_part(instruction: &str) -> &str {
    let start = [QUOTED.find(instruction), AFTER_COLON.find(instruction)]
        .into_iter()
        .flatten()
        .map(|m| m.start())
        .min();
    start.map_or(instruction, |at| &instruction[..at])
}

pub(crate) fn find_url(instruction: &str) -> Option<String> {
    let m = URL.find(instruction)?;
    let url = m.as_str().trim_end_matches(['.', ',', ';', ':', ')', '!', '?']);
    if url.to_ascii_lowercase().starts_with("www.") {
        Some(format!("https://{url}"))
    } else {
        Some(url.to_string())
    }
}

pub(crate) fn youtube_id(instruction: &str) -> Option<String> {
    YOUTUBE_ID.captures(instruction).map(|c| c[1].to_string())
}

/// Large numbers saturate so they clamp instead of failing to parse.
fn parse_count(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}

// Tables

static ROW_COUNT: Lazy<Regex> = Lazy::new(|| re(r"(?i)(\d+)\s*(?:filas?|rows?)\b"));
static COL_COUNT: Lazy<Regex> = Lazy::new(|| re(r"(?i)(\d+)\s*(?:columnas?|columns?|cols?)\b"));
static DIMENSIONS: Lazy<Regex> = Lazy::new(|| re(r"(\d+)\s*[x×]\s*(\d+)"));
static WITH_HEADER: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)\b(?:con|with)\s+(?:\w+\s+)?(?:encabezados?|cabeceras?|headers?|títulos?|titulos?)\b"));

/// (rows, cols), clamped to the supported table size.
pub fn table_dimensions(instruction: &str) -> (u32, u32) {
    let mut rows = ROW_COUNT.captures(instruction).map(|c| parse_count(&c[1]));
    let mut cols = COL_COUNT.captures(instruction).map(|c| parse_count(&c[1]));
    if rows.is_none() && cols.is_none() {
        if let Some(c) = DIMENSIONS.captures(instruction) {
            rows = Some(parse_count(&c[1]));
            cols = Some(parse_count(&c[2]));
        }
    }
    let clamp = |v: Option<u64>, max: u32| v.unwrap_or(DEFAULT_TABLE_SIZE as u64).clamp(1, max as u64) as u32;
    (clamp(rows, MAX_TABLE_ROWS), clamp(cols, MAX_TABLE_COLS))
}

fn table(input: &ToolInput<'_>) -> Outcome {
    let (rows, cols) = table_dimensions(input.instruction);
    let with_header = WITH_HEADER.is_match(input.instruction);
    let mut preview = Table::new(rows, cols, with_header);
    if with_header {
        for (i, cell) in preview.rows[0].cells.iter_mut().enumerate() {
            cell.text = format!("Columna {}", i + 1);
        }
    }
    let plan = ToolPlan::command(EditCommand::InsertTable { rows, cols, with_header })
        .requiring(Capability::Tables)
        .or_html(node_to_html(&Node::Table(preview)));
    Outcome::Plan(plan)
}

static TABLE_OPS: Lazy<Vec<(Regex, TableOp)>> = Lazy::new(|| {
    let add = r"(?:agrega|añade|anade|inserta|add|insert)";
    let delete = r"(?:elimina|borra|quita|delete|remove)";
    let row = r"(?:filas?|rows?)";
    let col = r"(?:columnas?|columns?)";
    vec![
        (re(&format!(r"(?i)\b{add}\w*\b.*\b{row}\b")), TableOp::AddRowAfter),
        (re(&format!(r"(?i)\b{delete}\w*\b.*\b{row}\b")), TableOp::DeleteRow),
        (re(&format!(r"(?i)\b{add}\w*\b.*\b{col}\b")), TableOp::AddColumnAfter),
        (re(&format!(r"(?i)\b{delete}\w*\b.*\b{col}\b")), TableOp::DeleteColumn),
        (re(r"(?i)\b(?:combina|fusiona|une|merge|combine)\w*\b"), TableOp::MergeCells),
        (re(r"(?i)\b(?:divide|separa|split)\w*\b"), TableOp::SplitCell),
        (re(&format!(r"(?i)\b{delete}\w*\b.*\b(?:tabla|table)\b")), TableOp::DeleteTable),
    ]
});

static BEFORE: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)\b(?:arriba|encima|antes|izquierda|above|before|left)\b"));

/// First matching sub-operation in a fixed order; "antes"/"before" flips inserts.
pub fn table_op(instruction: &str) -> Option<TableOp> {
    let op = TABLE_OPS.iter().find(|(re, _)| re.is_match(instruction)).map(|(_, op)| *op)?;
    let before = BEFORE.is_match(instruction);
    Some(match op {
        TableOp::AddRowAfter if before => TableOp::AddRowBefore,
        TableOp::AddColumnAfter if before => TableOp::AddColumnBefore,
        other => other,
    })
}

fn table_modify(input: &ToolInput<'_>) -> Outcome {
    match table_op(input.instruction) {
        Some(op) => Outcome::Plan(ToolPlan::command(EditCommand::Table(op)).requiring(Capability::Tables)),
        None => Outcome::Skip(Some(Notice {
            title: "Operación de tabla no reconocida",
            description: "Prueba con agregar o eliminar filas y columnas, combinar o dividir celdas".to_string(),
        })),
    }
}

// Headings

static HEADING_DIGIT: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(?:h|nivel|level)\s*(\d+)"));

/// Read from the command part only, so numbers inside the title text are ignored.
pub fn heading_level(instruction: &str) -> u8 {
    let instruction = command_part(instruction);
    let digit = HEADING_DIGIT
        .captures(instruction)
        .and_then(|c| c.get(1))
        .or_else(|| NUMBER.find(instruction))
        .map(|m| parse_count(m.as_str()).clamp(1, 6) as u8);
    digit
        .or_else(|| lexicon::heading_word_level(instruction))
        .unwrap_or(DEFAULT_HEADING_LEVEL)
}

fn heading(input: &ToolInput<'_>) -> Outcome {
    let level = heading_level(input.instruction);
    if let Some(title) = payload_text(input.instruction) {
        return Outcome::Plan(insert(Node::Heading { level, block: TextBlock::plain(&title) }));
    }
    let plan = ToolPlan::command(EditCommand::SetHeading { level });
    if input.has_selection() {
        return Outcome::Plan(plan);
    }
    Outcome::Plan(plan.or_html(format!("<h{level}>Nuevo título</h{level}>")))
}

// Inline decorations

/// Styles the selection in place, or inserts styled placeholder text at the caret.
fn decorate(input: &ToolInput<'_>, mark: Mark, placeholder: &str) -> Outcome {
    if input.has_selection() {
        return Outcome::Plan(ToolPlan::command(EditCommand::AddMark(mark)));
    }
    let phrase = payload_text(input.instruction).unwrap_or_else(|| placeholder.to_string());
    let html = format!("<p>{}</p>", styled_html(&phrase, &mark));
    Outcome::Plan(ToolPlan::command(EditCommand::InsertStyledText { text: phrase, marks: vec![mark] }).or_html(html))
}

fn styled_html(phrase: &str, mark: &Mark) -> String {
    let inner = text(phrase);
    match mark {
        Mark::Bold => format!("<strong>{inner}</strong>"),
        Mark::Italic => format!("<em>{inner}</em>"),
        Mark::Underline => format!("<u>{inner}</u>"),
        Mark::Strike => format!("<s>{inner}</s>"),
        Mark::Superscript => format!("<sup>{inner}</sup>"),
        Mark::Subscript => format!("<sub>{inner}</sub>"),
        Mark::Code => format!("<code>{inner}</code>"),
        Mark::Color(c) => format!("<span style=\"color:{}\">{inner}</span>", attr(c)),
        Mark::Highlight(c) => format!("<mark style=\"background-color:{}\">{inner}</mark>", attr(c)),
        Mark::FontSize(px) => format!("<span style=\"font-size:{px}px\">{inner}</span>"),
        Mark::Link(href) => format!("<a href=\"{}\">{inner}</a>", attr(href)),
    }
}

fn case(input: &ToolInput<'_>, transform: CaseTransform) -> Outcome {
    if !input.has_selection() {
        tracing::debug!(?transform, "case transform without selection");
        return Outcome::Skip(None);
    }
    Outcome::Plan(ToolPlan::command(EditCommand::TransformCase(transform)))
}

// Blocks

static LIST_SPLIT: Lazy<Regex> = Lazy::new(|| re(r"(?i)\s*(?:[,;\n]|\by\b|\band\b)\s*"));

pub fn list_items(instruction: &str) -> Vec<String> {
    if let Some(tail) = AFTER_COLON.captures(instruction) {
        let items: Vec<String> = LIST_SPLIT
            .split(&tail[1])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !items.is_empty() {
            return items;
        }
    }
    let count = NUMBER.find(instruction).map_or(3, |m| parse_count(m.as_str()).clamp(1, 20));
    (1..=count).map(|i| format!("Elemento {i}")).collect()
}

fn list(input: &ToolInput<'_>, kind: ListKind) -> Outcome {
    if input.has_selection() {
        let mut plan = ToolPlan::command(EditCommand::ConvertToList(kind));
        if kind == ListKind::Task {
            plan = plan.requiring(Capability::TaskLists);
        }
        return Outcome::Plan(plan);
    }
    let items = list_items(input.instruction)
        .into_iter()
        .map(|text| ListItem { text, checked: false })
        .collect();
    Outcome::Plan(insert(Node::List(List { kind, items })))
}

static ALIGNMENTS: Lazy<Vec<(Regex, Align)>> = Lazy::new(|| {
    vec![
        (re(r"(?i)\b(?:justifica\w*|justif\w*)\b"), Align::Justify),
        (re(r"(?i)\b(?:centr\w*|center\w*|medio|middle)\b"), Align::Center),
        (re(r"(?i)\b(?:derech\w*|right)\b"), Align::Right),
        (re(r"(?i)\b(?:izquierd\w*|left)\b"), Align::Left),
    ]
});

pub fn alignment(instruction: &str) -> Align {
    ALIGNMENTS
        .iter()
        .find(|(re, _)| re.is_match(instruction))
        .map_or(Align::Left, |(_, align)| *align)
}

fn align(input: &ToolInput<'_>) -> Outcome {
    let align = alignment(input.instruction);
    let body = block_body(input, "Texto alineado");
    let html = format!("<p style=\"text-align:{}\">{}</p>", align.as_css(), text(&body));
    Outcome::Plan(ToolPlan::command(EditCommand::SetAlign(align)).or_html(html))
}

fn block_body(input: &ToolInput<'_>, placeholder: &str) -> String {
    if input.has_selection() {
        input.selected_text.clone()
    } else {
        payload_text(input.instruction).unwrap_or_else(|| placeholder.to_string())
    }
}

fn quote(input: &ToolInput<'_>) -> Outcome {
    if input.has_selection() {
        return Outcome::Plan(ToolPlan::command(EditCommand::WrapQuote));
    }
    let body = payload_text(input.instruction).unwrap_or_else(|| "Cita".to_string());
    Outcome::Plan(insert(Node::Quote(TextBlock::plain(&body))))
}

fn code(input: &ToolInput<'_>) -> Outcome {
    if input.has_selection() {
        return Outcome::Plan(ToolPlan::command(EditCommand::AddMark(Mark::Code)));
    }
    let language = lexicon::code_language(input.instruction).map(str::to_string);
    let code = payload_text(input.instruction).unwrap_or_else(|| "// código".to_string());
    Outcome::Plan(insert(Node::CodeBlock { language, code }))
}

static LINE_HEIGHT: Lazy<Regex> = Lazy::new(|| re(r"(\d+(?:[.,]\d+)?)"));

pub fn line_height(instruction: &str) -> f32 {
    let lower = instruction.to_lowercase();
    if lower.contains("doble") || lower.contains("double") {
        return 2.0;
    }
    if ["sencillo", "simple", "single"].iter().any(|w| lower.contains(w)) {
        return 1.0;
    }
    LINE_HEIGHT
        .find(instruction)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f32>().ok())
        .map_or(1.5, |v| v.clamp(0.8, 3.0))
}

fn spacing(input: &ToolInput<'_>) -> Outcome {
    let height = line_height(input.instruction);
    let body = block_body(input, "Texto con interlineado");
    let html = format!("<p style=\"line-height:{height}\">{}</p>", text(&body));
    Outcome::Plan(ToolPlan::command(EditCommand::SetLineHeight(height)).or_html(html))
}

static COLUMN_WORDS: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(dos|two|tres|three|cuatro|four)\b"));

pub fn column_count(instruction: &str) -> usize {
    if let Some(m) = NUMBER.find(instruction) {
        return parse_count(m.as_str()).clamp(2, 4) as usize;
    }
    match COLUMN_WORDS.find(instruction).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("tres" | "three") => 3,
        Some("cuatro" | "four") => 4,
        _ => 2,
    }
}

fn columns(input: &ToolInput<'_>) -> Outcome {
    let columns = (1..=column_count(input.instruction))
        .map(|i| TextBlock::plain(&format!("Columna {i}")))
        .collect();
    Outcome::Plan(insert(Node::Columns { columns }))
}

static BORDER_WIDTH: Lazy<Regex> = Lazy::new(|| re(r"(?i)(\d+)\s*(?:px|pixel|píxel)"));

fn border_width(instruction: &str) -> u32 {
    BORDER_WIDTH
        .captures(instruction)
        .map_or(2, |c| parse_count(&c[1]).clamp(1, 10) as u32)
}

static SOFT: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(?:suave|ligera|leve|sutil|soft|light|subtle)\b"));
static STRONG: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(?:fuerte|intensa|marcada|strong|heavy|dark)\b"));

fn shadow_strength(instruction: &str) -> Shadow {
    if SOFT.is_match(instruction) {
        Shadow::Soft
    } else if STRONG.is_match(instruction) {
        Shadow::Strong
    } else {
        Shadow::Medium
    }
}

/// Frames the block under the caret, or inserts a framed placeholder block.
fn boxed(input: &ToolInput<'_>, style: BoxStyle, placeholder: &str) -> Outcome {
    let body = block_body(input, placeholder);
    let html = node_to_html(&Node::Boxed { style: style.clone(), block: TextBlock::plain(&body) });
    Outcome::Plan(ToolPlan::command(EditCommand::WrapBox(style)).or_html(html))
}

static PERCENT: Lazy<Regex> = Lazy::new(|| re(r"(\d+)\s*%"));

fn progress_percent(instruction: &str) -> u8 {
    PERCENT
        .captures(instruction)
        .map(|c| c.get(1).map_or("", |m| m.as_str()).to_string())
        .or_else(|| NUMBER.find(instruction).map(|m| m.as_str().to_string()))
        .map_or(50, |digits| parse_count(&digits).min(100) as u8)
}

// Media

fn link(input: &ToolInput<'_>) -> Outcome {
    let Some(url) = find_url(input.instruction) else {
        return Outcome::Skip(Some(missing_url("Falta la URL del enlace")));
    };
    if input.has_selection() {
        return Outcome::Plan(ToolPlan::command(EditCommand::AddMark(Mark::Link(url))));
    }
    let label = QUOTED.captures(input.instruction).map_or_else(|| url.clone(), |c| c[1].trim().to_string());
    let html = format!("<p>{}</p>", styled_html(&label, &Mark::Link(url.clone())));
    let command = EditCommand::InsertStyledText { text: label, marks: vec![Mark::Link(url)] };
    Outcome::Plan(ToolPlan::command(command).or_html(html))
}

fn image(input: &ToolInput<'_>) -> Outcome {
    let Some(src) = find_url(input.instruction) else {
        return Outcome::Skip(Some(missing_url("Falta la URL de la imagen")));
    };
    let alt = QUOTED.captures(input.instruction).map_or_else(|| "Imagen".to_string(), |c| c[1].trim().to_string());
    Outcome::Plan(insert(Node::Image { src, alt }))
}

/// Embed node, then a responsive wrapper, then a bare iframe.
pub fn youtube(video_id: &str) -> Outcome {
    let src = format!("https://www.youtube.com/embed/{}", attr(video_id));
    let wrapped = format!(
        "<div data-youtube-video class=\"video-wrapper\" style=\"position:relative;padding-bottom:56.25%;height:0\">\
         <iframe src=\"{src}\" style=\"position:absolute;top:0;left:0;width:100%;height:100%\" frameborder=\"0\" \
         allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" allowfullscreen></iframe></div>"
    );
    let bare = format!("<iframe width=\"560\" height=\"315\" src=\"{src}\" allowfullscreen></iframe>");
    let node = Node::Video { src: video_id.to_string(), provider: VideoProvider::Youtube };
    let plan = ToolPlan::command(EditCommand::InsertNode(node))
        .requiring(Capability::VideoEmbed)
        .or_html(wrapped)
        .or_html(bare);
    Outcome::Plan(plan)
}

fn video(input: &ToolInput<'_>) -> Outcome {
    let Some(url) = find_url(input.instruction) else {
        return Outcome::Skip(Some(missing_url("Falta la URL del video")));
    };
    if let Some(id) = youtube_id(&url) {
        return youtube(&id);
    }
    Outcome::Plan(insert(Node::Video { src: url, provider: VideoProvider::File }))
}

fn canvas(input: &ToolInput<'_>) -> Outcome {
    let (width, height) = DIMENSIONS.captures(input.instruction).map_or((800, 400), |c| {
        (parse_count(&c[1]).clamp(100, 2000) as u32, parse_count(&c[2]).clamp(100, 2000) as u32)
    });
    Outcome::Plan(insert(Node::Canvas { width, height }))
}

// Math

static DISPLAY_MATH: Lazy<Regex> = Lazy::new(|| re(r"\$\$(.+?)\$\$|\\\[(.+?)\\\]"));
static INLINE_MATH: Lazy<Regex> = Lazy::new(|| re(r"\$([^$]+)\$|\\\((.+?)\\\)"));
static LABELED_FORMULA: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)(?:fórmula|formula|ecuación|ecuacion|equation|expresión|expresion|expression)\s*:\s*(.+)$")
});
static FRACTION: Lazy<Regex> = Lazy::new(|| re(r"(?i)(\w+)\s*/\s*(\w+)|(\w+)\s+(?:sobre|entre|over)\s+(\w+)"));
static INLINE_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)\b(?:inline|in line|en línea|en linea|dentro del texto|en el texto)\b"));

fn first_group(c: &regex::Captures<'_>) -> Option<String> {
    c.iter().skip(1).flatten().next().map(|m| m.as_str().trim().to_string())
}

/// TeX source for a formula request: explicit delimiters, then a labeled expression,
/// then a named formula, then the quadratic formula.
pub fn formula_tex(instruction: &str, fraction: bool) -> String {
    if let Some(tex) = DISPLAY_MATH.captures(instruction).as_ref().and_then(first_group) {
        return tex;
    }
    if let Some(tex) = INLINE_MATH.captures(instruction).as_ref().and_then(first_group) {
        return tex;
    }
    if fraction {
        if let Some(c) = FRACTION.captures(instruction) {
            let parts: Vec<&str> = c.iter().skip(1).flatten().map(|m| m.as_str()).collect();
            if let [num, den] = parts.as_slice() {
                return format!(r"\frac{{{num}}}{{{den}}}");
            }
        }
    }
    if let Some(c) = LABELED_FORMULA.captures(instruction) {
        let tex = c[1].trim();
        if !tex.is_empty() {
            return tex.to_string();
        }
    }
    lexicon::named_formula(instruction).unwrap_or(QUADRATIC).to_string()
}

fn formula(input: &ToolInput<'_>, fraction: bool) -> Outcome {
    let tex = formula_tex(input.instruction, fraction);
    let inline = INLINE_QUALIFIER.is_match(input.instruction);
    let (node, html) = if inline {
        let html = format!("<span class=\"math-inline\">${}$</span>", text(&tex));
        (Node::FormulaInline { tex }, html)
    } else {
        let html = format!("<div class=\"math-block\">$${}$$</div>", text(&tex));
        (Node::FormulaBlock { tex }, html)
    };
    let plan = ToolPlan::command(EditCommand::InsertNode(node)).requiring(Capability::Math).or_html(html);
    Outcome::Plan(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_rte_core::selection::Selection;

    fn caret(instruction: &str) -> ToolInput<'_> {
        ToolInput { instruction, selection: Selection::caret(0), selected_text: String::new() }
    }

    fn selected<'a>(instruction: &'a str, text: &str) -> ToolInput<'a> {
        ToolInput { instruction, selection: Selection::range(0, text.chars().count()), selected_text: text.to_string() }
    }

    fn expect_plan(outcome: Outcome) -> ToolPlan {
        match outcome {
            Outcome::Plan(plan) => plan,
            Outcome::Skip(notice) => panic!("expected a plan, got skip {notice:?}"),
        }
    }

    #[test]
    fn table_dimensions_clamp_and_default() {
        assert_eq!(table_dimensions("crea una tabla"), (3, 3));
        assert_eq!(table_dimensions("tabla de 4 filas y 5 columnas"), (4, 5));
        assert_eq!(table_dimensions("table with 6 columns and 2 rows"), (2, 6));
        assert_eq!(table_dimensions("tabla 50x50"), (20, 10));
        assert_eq!(table_dimensions("tabla 0x0"), (1, 1));
        assert_eq!(table_dimensions("tabla de 99999999999999999999999 filas"), (20, 3));
    }

    fn table_plan(instruction: &str) -> ToolPlan {
        expect_plan(plan(ToolIntent::Table, &caret(instruction)))
    }

    #[test]
    fn table_header_qualifier() {
        let plan = expect_plan(plan(ToolIntent::Table, &caret("tabla 2x2 con encabezados")));
        assert_eq!(plan.primary, vec![EditCommand::InsertTable { rows: 2, cols: 2, with_header: true }]);
        assert_eq!(plan.requires, Some(Capability::Tables));
        assert!(plan.fallbacks[0].contains("<th>Columna 1</th>"));

        let plan = table_plan("table 2x2 with headers");
        assert_eq!(plan.primary, vec![EditCommand::InsertTable { rows: 2, cols: 2, with_header: true }]);
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading_level("título h3"), 3);
        assert_eq!(heading_level("heading level 9"), 6);
        assert_eq!(heading_level("título nivel 0"), 1);
        assert_eq!(heading_level("título principal"), 1);
        assert_eq!(heading_level("subtítulo"), 2);
        assert_eq!(heading_level("agrega un título: Resultados 2024"), 2);
        assert_eq!(heading_level("título 3 \"Plan 2030\""), 3);
        assert_eq!(heading_level("encabezado: Detalle del proyecto"), 2);
    }

    #[test]
    fn heading_with_text_inserts_a_new_block() {
        let plan = expect_plan(plan(ToolIntent::Heading, &caret("agrega un título h1: Introducción")));
        assert_eq!(
            plan.primary,
            vec![EditCommand::InsertNode(Node::Heading { level: 1, block: TextBlock::plain("Introducción") })]
        );
        assert_eq!(plan.fallbacks, vec!["<h1>Introducción</h1>".to_string()]);
    }

    #[test]
    fn decoration_branches_on_selection() {
        let on_sel = expect_plan(plan(ToolIntent::Bold, &selected("pon en negrita", "hola")));
        assert_eq!(on_sel.primary, vec![EditCommand::AddMark(Mark::Bold)]);

        let no_sel = expect_plan(plan(ToolIntent::Bold, &caret("pon en negrita")));
        assert_eq!(
            no_sel.primary,
            vec![EditCommand::InsertStyledText { text: "texto en negrita".into(), marks: vec![Mark::Bold] }]
        );
        assert_eq!(no_sel.fallbacks, vec!["<p><strong>texto en negrita</strong></p>".to_string()]);
    }

    #[test]
    fn whitespace_selection_counts_as_empty() {
        let plan = expect_plan(plan(ToolIntent::Italic, &selected("cursiva", "   ")));
        assert!(matches!(plan.primary[0], EditCommand::InsertStyledText { .. }));
    }

    #[test]
    fn color_and_highlight_defaults() {
        let red = expect_plan(plan(ToolIntent::Color, &selected("texto rojo", "x")));
        assert_eq!(red.primary, vec![EditCommand::AddMark(Mark::Color("#ff0000".into()))]);
        let plain = expect_plan(plan(ToolIntent::Color, &selected("cambia el color", "x")));
        assert_eq!(plain.primary, vec![EditCommand::AddMark(Mark::Color("#000000".into()))]);
        let hl = expect_plan(plan(ToolIntent::Highlight, &selected("resalta", "x")));
        assert_eq!(hl.primary, vec![EditCommand::AddMark(Mark::Highlight("#ffff00".into()))]);
    }

    #[test]
    fn case_transform_without_selection_is_skipped_silently() {
        assert_eq!(plan(ToolIntent::Uppercase, &caret("mayúsculas")), Outcome::Skip(None));
        let plan = expect_plan(plan(ToolIntent::Capitalize, &selected("capitaliza", "hola")));
        assert_eq!(plan.primary, vec![EditCommand::TransformCase(CaseTransform::Capitalize)]);
    }

    #[test]
    fn table_modify_first_match_wins() {
        assert_eq!(table_op("añade una fila"), Some(TableOp::AddRowAfter));
        assert_eq!(table_op("añade una fila arriba"), Some(TableOp::AddRowBefore));
        assert_eq!(table_op("añade una fila y elimina una columna"), Some(TableOp::AddRowAfter));
        assert_eq!(table_op("delete this column"), Some(TableOp::DeleteColumn));
        assert_eq!(table_op("add a column to the left"), Some(TableOp::AddColumnBefore));
        assert_eq!(table_op("combina las celdas"), Some(TableOp::MergeCells));
        assert_eq!(table_op("split the cell"), Some(TableOp::SplitCell));
        assert_eq!(table_op("elimina la tabla"), Some(TableOp::DeleteTable));
        assert_eq!(table_op("hazla bonita"), None);
    }

    #[test]
    fn youtube_ids_from_common_url_shapes() {
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://youtube.com/watch?t=10&v=dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("mira youtu.be/dQw4w9WgXcQ ahora").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("youtube.com/shorts/abcdefghijk").as_deref(), Some("abcdefghijk"));
        assert_eq!(youtube_id("inserta un video de youtube"), None);
    }

    #[test]
    fn youtube_plan_has_three_tiers() {
        let plan = expect_plan(youtube("dQw4w9WgXcQ"));
        assert_eq!(plan.requires, Some(Capability::VideoEmbed));
        assert_eq!(plan.fallbacks.len(), 2);
        assert!(plan.fallbacks[0].starts_with("<div data-youtube-video"));
        assert!(plan.fallbacks[1].starts_with("<iframe"));
    }

    #[test]
    fn link_and_image_need_a_url() {
        assert!(matches!(plan(ToolIntent::Link, &caret("agrega un enlace")), Outcome::Skip(Some(_))));
        let plan = expect_plan(plan(ToolIntent::Link, &caret("enlace \"Docs\" a www.rust-lang.org.")));
        assert_eq!(
            plan.primary,
            vec![EditCommand::InsertStyledText {
                text: "Docs".into(),
                marks: vec![Mark::Link("https://www.rust-lang.org".into())]
            }]
        );
    }

    #[test]
    fn formula_sources_in_priority_order() {
        assert_eq!(formula_tex("inserta $\\alpha + \\beta$", false), "\\alpha + \\beta");
        assert_eq!(formula_tex("ecuación: y = mx + b", false), "y = mx + b");
        assert_eq!(formula_tex("fórmula de pitágoras", false), "a^2 + b^2 = c^2");
        assert_eq!(formula_tex("una fórmula bonita", false), QUADRATIC);
        assert_eq!(formula_tex("fracción 3/4", true), "\\frac{3}{4}");
        assert_eq!(formula_tex("fracción x sobre y", true), "\\frac{x}{y}");
        assert_eq!(formula_tex("una fracción", true), "\\frac{a}{b}");
    }

    #[test]
    fn formula_inline_vs_block() {
        let inline = expect_plan(plan(ToolIntent::Formula, &caret("fórmula de einstein en línea")));
        assert_eq!(inline.primary, vec![EditCommand::InsertNode(Node::FormulaInline { tex: "E = mc^2".into() })]);
        let block = expect_plan(plan(ToolIntent::Formula, &caret("fórmula de einstein")));
        assert_eq!(block.primary, vec![EditCommand::InsertNode(Node::FormulaBlock { tex: "E = mc^2".into() })]);
        assert_eq!(block.fallbacks, vec!["<div class=\"math-block\">$$E = mc^2$$</div>".to_string()]);
    }

    #[test]
    fn list_items_from_colon_tail_or_count() {
        assert_eq!(list_items("lista: pan, leche y huevos"), vec!["pan", "leche", "huevos"]);
        assert_eq!(list_items("lista de 2 elementos"), vec!["Elemento 1", "Elemento 2"]);
        assert_eq!(list_items("haz una lista").len(), 3);
    }

    #[test]
    fn parameter_readers() {
        assert_eq!(alignment("centra el texto"), Align::Center);
        assert_eq!(alignment("align right"), Align::Right);
        assert_eq!(alignment("justifica"), Align::Justify);
        assert_eq!(alignment("alinea"), Align::Left);
        assert_eq!(line_height("interlineado doble"), 2.0);
        assert_eq!(line_height("line height 1,25"), 1.25);
        assert_eq!(line_height("espaciado 9"), 3.0);
        assert_eq!(column_count("tres columnas"), 3);
        assert_eq!(column_count("7 columns"), 4);
        assert_eq!(progress_percent("barra de progreso al 75%"), 75);
        assert_eq!(progress_percent("progress 250"), 100);
        assert_eq!(border_width("borde de 4px"), 4);
        assert_eq!(shadow_strength("sombra suave"), Shadow::Soft);
    }

    #[test]
    fn widgets_fall_back_to_rendered_markup() {
        let plan = expect_plan(plan(ToolIntent::Button, &caret("botón \"Comprar\" verde https://tienda.example")));
        assert_eq!(plan.requires, Some(Capability::Widgets));
        let EditCommand::InsertNode(Node::Widget { widget }) = &plan.primary[0] else { panic!("expected widget") };
        assert_eq!(
            widget,
            &Widget::Button {
                label: "Comprar".into(),
                href: Some("https://tienda.example".into()),
                color: "#008000".into()
            }
        );
        assert!(plan.fallbacks[0].starts_with("<a href=\"https://tienda.example\""));
    }
}
