//! Instruction classification.
//!
//! Rules are evaluated top to bottom and the first match wins, so the order of
//! `RULES` decides every overlap ("tabla con 3 columnas" is a table, not columns).

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::UnknownIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolIntent {
    Table,
    Heading,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
    Color,
    Highlight,
    List,
    OrderedList,
    TaskList,
    Align,
    Quote,
    Code,
    Separator,
    Link,
    Image,
    Youtube,
    Canvas,
    Emoji,
    Small,
    Large,
    Uppercase,
    Lowercase,
    Capitalize,
    Spacing,
    Columns,
    Button,
    Badge,
    Progress,
    Border,
    Shadow,
    Formula,
    Fraction,
    Video,
    TableModify,
}

impl ToolIntent {
    pub const ALL: [ToolIntent; 38] = [
        ToolIntent::Table,
        ToolIntent::Heading,
        ToolIntent::Bold,
        ToolIntent::Italic,
        ToolIntent::Underline,
        ToolIntent::Strikethrough,
        ToolIntent::Superscript,
        ToolIntent::Subscript,
        ToolIntent::Color,
        ToolIntent::Highlight,
        ToolIntent::List,
        ToolIntent::OrderedList,
        ToolIntent::TaskList,
        ToolIntent::Align,
        ToolIntent::Quote,
        ToolIntent::Code,
        ToolIntent::Separator,
        ToolIntent::Link,
        ToolIntent::Image,
        ToolIntent::Youtube,
        ToolIntent::Canvas,
        ToolIntent::Emoji,
        ToolIntent::Small,
        ToolIntent::Large,
        ToolIntent::Uppercase,
        ToolIntent::Lowercase,
        ToolIntent::Capitalize,
        ToolIntent::Spacing,
        ToolIntent::Columns,
        ToolIntent::Button,
        ToolIntent::Badge,
        ToolIntent::Progress,
        ToolIntent::Border,
        ToolIntent::Shadow,
        ToolIntent::Formula,
        ToolIntent::Fraction,
        ToolIntent::Video,
        ToolIntent::TableModify,
    ];

    /// Wire tag, e.g. `orderedList`.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolIntent::Table => "table",
            ToolIntent::Heading => "heading",
            ToolIntent::Bold => "bold",
            ToolIntent::Italic => "italic",
            ToolIntent::Underline => "underline",
            ToolIntent::Strikethrough => "strikethrough",
            ToolIntent::Superscript => "superscript",
            ToolIntent::Subscript => "subscript",
            ToolIntent::Color => "color",
            ToolIntent::Highlight => "highlight",
            ToolIntent::List => "list",
            ToolIntent::OrderedList => "orderedList",
            ToolIntent::TaskList => "taskList",
            ToolIntent::Align => "align",
            ToolIntent::Quote => "quote",
            ToolIntent::Code => "code",
            ToolIntent::Separator => "separator",
            ToolIntent::Link => "link",
            ToolIntent::Image => "image",
            ToolIntent::Youtube => "youtube",
            ToolIntent::Canvas => "canvas",
            ToolIntent::Emoji => "emoji",
            ToolIntent::Small => "small",
            ToolIntent::Large => "large",
            ToolIntent::Uppercase => "uppercase",
            ToolIntent::Lowercase => "lowercase",
            ToolIntent::Capitalize => "capitalize",
            ToolIntent::Spacing => "spacing",
            ToolIntent::Columns => "columns",
            ToolIntent::Button => "button",
            ToolIntent::Badge => "badge",
            ToolIntent::Progress => "progress",
            ToolIntent::Border => "border",
            ToolIntent::Shadow => "shadow",
            ToolIntent::Formula => "formula",
            ToolIntent::Fraction => "fraction",
            ToolIntent::Video => "video",
            ToolIntent::TableModify => "tableModify",
        }
    }
}

impl fmt::Display for ToolIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolIntent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolIntent::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}

static YOUTUBE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:youtube\.com|youtu\.be)").expect("valid regex"));

static RULES: Lazy<Vec<(ToolIntent, Regex)>> = Lazy::new(|| {
    let table: &[(ToolIntent, &str)] = &[
        (
            ToolIntent::TableModify,
            r"\b(?:agrega|añade|anade|inserta|elimina|borra|quita|add|insert|delete|remove)\w*\s+(?:una\s+|un\s+|la\s+|el\s+|otra\s+|nueva\s+|a\s+|an\s+|the\s+|another\s+|new\s+|\d+\s+)?(?:filas?|columnas?|rows?|columns?)\b|\b(?:combina|fusiona|une|merge|combine)\w*\s+(?:las\s+|la\s+|estas\s+|the\s+|these\s+)?(?:celdas?|cells?)\b|\b(?:divide|separa|split)\w*\s+(?:la\s+|las\s+|esta\s+|the\s+|this\s+)?(?:celdas?|cells?)\b|\b(?:elimina|borra|quita|delete|remove)\w*\s+(?:la\s+|esta\s+|the\s+|this\s+)?(?:tabla|table)\b",
        ),
        (ToolIntent::Table, r"\b(?:tabla|tablas|table)\b"),
        (ToolIntent::Youtube, r"\byoutube\b"),
        (ToolIntent::Video, r"\b(?:video|vídeo|videos|vídeos|mp4|vimeo)\b"),
        (ToolIntent::Canvas, r"\b(?:canvas|lienzo|dibujo|dibujar|drawing|pizarra|whiteboard)\b"),
        (ToolIntent::Image, r"\b(?:imagen|imágenes|image|foto|photo|picture)\b"),
        (ToolIntent::Fraction, r"\b(?:fracción|fraccion|fraction|quebrado)\b"),
        (ToolIntent::Formula, r"\b(?:fórmula|formula|ecuación|ecuacion|equation|latex|matemática|matematica|math)\b|\$[^\s$](?:[^$]*[^\s$])?\$"),
        (ToolIntent::Uppercase, r"\b(?:mayúsculas?|mayusculas?|uppercase|upper case|all caps)\b"),
        (ToolIntent::Lowercase, r"\b(?:minúsculas?|minusculas?|lowercase|lower case)\b"),
        (ToolIntent::Capitalize, r"\b(?:capitaliza\w*|capitalize\w*|title case)\b"),
        (ToolIntent::TaskList, r"\b(?:lista de tareas|lista de pendientes|checklist|task list|to-?do list)\b"),
        (ToolIntent::OrderedList, r"\b(?:lista numerada|lista ordenada|numbered list|ordered list)\b"),
        (ToolIntent::List, r"\b(?:lista|viñetas|vinetas|bullets?|list)\b"),
        (ToolIntent::Heading, r"\b(?:título|titulo|encabezado|subtítulo|subtitulo|heading|header)\b|\bh[1-6]\b"),
        (ToolIntent::Highlight, r"\b(?:resalta|resaltar|resaltado|resáltalo|highlight\w*|fondo)\b"),
        (
            ToolIntent::Color,
            r"\b(?:color|colorea|colorear|rojo|roja|azul|verde|amarillo|amarilla|naranja|morado|morada|rosa|gris|red|blue|green|yellow|orange|purple|pink|gray|grey)\b|#[0-9a-fA-F]{3,6}\b",
        ),
        (ToolIntent::Bold, r"\b(?:negrita|negritas|negrilla|bold)\b"),
        (ToolIntent::Italic, r"\b(?:cursiva|cursivas|itálica|italica|italic|italics)\b"),
        (ToolIntent::Underline, r"\b(?:subraya\w*|underline\w*)\b"),
        (ToolIntent::Strikethrough, r"\b(?:tachado|tachar|tacha|strikethrough|strike)\b"),
        (ToolIntent::Superscript, r"\b(?:superíndice|superindice|superscript)\b"),
        (ToolIntent::Subscript, r"\b(?:subíndice|subindice|subscript)\b"),
        (ToolIntent::Small, r"\b(?:más pequeño|mas pequeño|mas pequeno|texto pequeño|letra pequeña|small|smaller)\b"),
        (ToolIntent::Large, r"\b(?:más grande|mas grande|texto grande|letra grande|agranda\w*|large|larger|bigger)\b"),
        (ToolIntent::Align, r"\b(?:alinea\w*|centra\w*|justifica\w*|align\w*|center|centre)\b"),
        (ToolIntent::Quote, r"\b(?:cita|citar|blockquote|quote)\b"),
        (ToolIntent::Code, r"\b(?:código|codigo|code|snippet)\b"),
        (ToolIntent::Separator, r"\b(?:separador|divisor|línea horizontal|linea horizontal|divider|separator|horizontal rule)\b"),
        (ToolIntent::Link, r"\b(?:enlace|vínculo|vinculo|hipervínculo|hipervinculo|link)\b|https?://"),
        (ToolIntent::Emoji, r"\b(?:emoji|emojis|emoticono|emoticon|carita)\b|\p{Extended_Pictographic}"),
        (ToolIntent::Spacing, r"\b(?:interlineado|interlínea|interlinea|espaciado|spacing|line[- ]height)\b"),
        (ToolIntent::Columns, r"\b(?:columnas|columns)\b"),
        (ToolIntent::Button, r"\b(?:botón|boton|button)\b"),
        (ToolIntent::Badge, r"\b(?:insignia|etiqueta|badge)\b"),
        (ToolIntent::Progress, r"\b(?:barra de progreso|progreso|progress)\b"),
        (ToolIntent::Border, r"\b(?:borde|bordes|marco|border)\b"),
        (ToolIntent::Shadow, r"\b(?:sombra|sombreado|shadow)\b"),
    ];
    table
        .iter()
        .map(|(intent, pattern)| (*intent, Regex::new(&format!("(?i){pattern}")).expect("valid regex")))
        .collect()
});

/// Maps an instruction to at most one tool intent.
///
/// A YouTube URL anywhere in the text overrides every other rule.
pub fn classify(text: &str) -> Option<ToolIntent> {
    if YOUTUBE_URL.is_match(text) {
        return Some(ToolIntent::Youtube);
    }
    RULES.iter().find(|(_, re)| re.is_match(text)).map(|(intent, _)| *intent)
}

/// Whether an editor-mode reply should replace the selection or be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Replace,
    #[default]
    Insert,
}

static REPLACE_TRIGGERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:corrig\w*|corrij\w*|correg\w*|arregl\w*|reescrib\w*|reformul\w*|mejor[ae]\w*|reemplaz\w*|sustitu\w*|cambi[ae]\w*|fix\w*|correct\w*|rewrit\w*|improv\w*|replac\w*|rephras\w*)\b",
    )
    .expect("valid regex")
});

pub fn edit_kind(text: &str) -> EditKind {
    if REPLACE_TRIGGERS.is_match(text) {
        EditKind::Replace
    } else {
        EditKind::Insert
    }
}
