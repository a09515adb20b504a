//! Bilingual vocabularies used to read parameters out of instructions.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) struct Lexicon<T: 'static> {
    entries: Vec<(Regex, T)>,
}

impl<T: Copy> Lexicon<T> {
    fn new(table: &[(&[&str], T)]) -> Self {
        let entries = table
            .iter()
            .map(|(words, value)| {
                let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
                let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).expect("valid regex");
                (re, *value)
            })
            .collect();
        Self { entries }
    }

    /// Value whose keyword appears first in the text; the longer keyword wins a tie.
    pub fn earliest(&self, text: &str) -> Option<T> {
        self.entries
            .iter()
            .filter_map(|(re, value)| re.find(text).map(|m| (m.start(), std::cmp::Reverse(m.len()), *value)))
            .min_by_key(|(start, len, _)| (*start, *len))
            .map(|(_, _, value)| value)
    }

    /// Value of the first table entry with a keyword in the text.
    pub fn first(&self, text: &str) -> Option<T> {
        self.entries.iter().find(|(re, _)| re.is_match(text)).map(|(_, value)| *value)
    }
}

pub(crate) const DEFAULT_TEXT_COLOR: &str = "#000000";
pub(crate) const DEFAULT_HIGHLIGHT: &str = "#ffff00";

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").expect("valid regex"));

static COLORS: Lazy<Lexicon<&'static str>> = Lazy::new(|| {
    Lexicon::new(&[
        (&["azul marino", "navy", "navy blue"], "#000080"),
        (&["azul claro", "light blue"], "#add8e6"),
        (&["verde claro", "light green"], "#90ee90"),
        (&["verde lima", "lima", "lime"], "#00ff00"),
        (&["rojo", "roja", "rojos", "rojas", "red"], "#ff0000"),
        (&["azul", "azules", "blue"], "#0000ff"),
        (&["verde", "verdes", "green"], "#008000"),
        (&["amarillo", "amarilla", "amarillos", "amarillas", "yellow"], "#ffff00"),
        (&["naranja", "anaranjado", "orange"], "#ffa500"),
        (&["morado", "morada", "púrpura", "purpura", "purple"], "#800080"),
        (&["violeta", "violet"], "#ee82ee"),
        (&["rosa", "rosado", "rosada", "pink"], "#ffc0cb"),
        (&["negro", "negra", "black"], "#000000"),
        (&["blanco", "blanca", "white"], "#ffffff"),
        (&["gris", "gray", "grey"], "#808080"),
        (&["marrón", "marron", "café", "brown"], "#a52a2a"),
        (&["celeste", "sky blue"], "#87ceeb"),
        (&["cian", "cyan"], "#00ffff"),
        (&["magenta", "fucsia", "fuchsia"], "#ff00ff"),
        (&["dorado", "dorada", "gold", "golden"], "#ffd700"),
        (&["plateado", "plateada", "silver"], "#c0c0c0"),
        (&["turquesa", "turquoise"], "#40e0d0"),
        (&["granate", "maroon"], "#800000"),
        (&["índigo", "indigo"], "#4b0082"),
        (&["beige"], "#f5f5dc"),
    ])
});

/// Explicit hex code first, then the earliest color name in either language.
pub(crate) fn find_color(text: &str) -> Option<String> {
    if let Some(m) = HEX_COLOR.find(text) {
        return Some(m.as_str().to_ascii_lowercase());
    }
    COLORS.earliest(text).map(str::to_string)
}

pub(crate) fn resolve_color(text: &str, default: &str) -> String {
    find_color(text).unwrap_or_else(|| default.to_string())
}

pub(crate) const DEFAULT_EMOJI: &str = "😊";

static LITERAL_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Extended_Pictographic}[\x{FE0F}\x{200D}\p{Extended_Pictographic}\p{Emoji_Modifier}]*")
        .expect("valid regex")
});

static EMOJI: Lazy<Lexicon<&'static str>> = Lazy::new(|| {
    Lexicon::new(&[
        (&["feliz", "sonrisa", "sonriente", "happy", "smile", "smiley"], "😊"),
        (&["risa", "carcajada", "laugh", "laughing", "lol"], "😂"),
        (&["triste", "llorar", "sad", "cry"], "😢"),
        (&["pensando", "duda", "thinking"], "🤔"),
        (&["corazón", "corazon", "amor", "heart", "love"], "❤️"),
        (&["fuego", "fire"], "🔥"),
        (&["estrella", "star"], "⭐"),
        (&["pulgar arriba", "pulgar", "me gusta", "thumbs up", "like"], "👍"),
        (&["ok", "perfecto"], "👌"),
        (&["cohete", "rocket"], "🚀"),
        (&["fiesta", "celebración", "celebracion", "party", "celebrate"], "🎉"),
        (&["check", "hecho", "completado", "done"], "✅"),
        (&["advertencia", "cuidado", "warning"], "⚠️"),
        (&["idea", "bombilla", "light bulb"], "💡"),
        (&["sol", "sun"], "☀️"),
        (&["luna", "moon"], "🌙"),
        (&["libro", "libros", "book", "books"], "📚"),
        (&["música", "musica", "music"], "🎵"),
        (&["trofeo", "trophy"], "🏆"),
        (&["reloj", "alarma", "clock"], "⏰"),
    ])
});

/// A literal emoji in the text, else one named in either language, else the default.
pub(crate) fn resolve_emoji(text: &str) -> String {
    if let Some(m) = LITERAL_EMOJI.find(text) {
        return m.as_str().to_string();
    }
    EMOJI.earliest(text).unwrap_or(DEFAULT_EMOJI).to_string()
}

pub(crate) const QUADRATIC: &str = r"x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}";

static FORMULAS: Lazy<Lexicon<&'static str>> = Lazy::new(|| {
    Lexicon::new(&[
        (&["cuadrática", "cuadratica", "segundo grado", "quadratic"], QUADRATIC),
        (&["pitágoras", "pitagoras", "pythagorean", "pythagoras"], "a^2 + b^2 = c^2"),
        (&["einstein", "relatividad", "relativity", "e=mc", "mc^2"], "E = mc^2"),
        (&["área del círculo", "area del circulo", "circle area", "area of a circle"], r"A = \pi r^2"),
        (&["integral"], r"\int_{a}^{b} f(x)\,dx"),
        (&["derivada", "derivative"], r"\frac{d}{dx} f(x)"),
        (&["sumatoria", "sumatorio", "summation", "sigma"], r"\sum_{i=1}^{n} x_i"),
        (&["límite", "limite", "limit"], r"\lim_{x \to \infty} f(x)"),
        (&["matriz", "matrix"], r"\begin{pmatrix} a & b \\ c & d \end{pmatrix}"),
        (&["raíz cuadrada", "raiz cuadrada", "raíz", "raiz", "square root", "sqrt"], r"\sqrt{x}"),
        (&["fracción", "fraccion", "fraction", "quebrado"], r"\frac{a}{b}"),
    ])
});

pub(crate) fn named_formula(text: &str) -> Option<&'static str> {
    FORMULAS.first(text)
}

static HEADING_WORDS: Lazy<Lexicon<u8>> = Lazy::new(|| {
    Lexicon::new(&[
        (&["principal", "main", "primer nivel"], 1),
        (&["secundario", "secundaria", "secondary", "sección", "seccion", "section"], 2),
        (&["terciario", "terciaria", "tertiary", "subsección", "subseccion", "subsection"], 3),
        (&["cuaternario", "menor", "minor"], 4),
        (&["pequeño", "pequeno", "small"], 5),
        (&["detalle", "detail"], 6),
    ])
});

pub(crate) fn heading_word_level(text: &str) -> Option<u8> {
    HEADING_WORDS.earliest(text)
}

static CODE_LANGUAGES: Lazy<Lexicon<&'static str>> = Lazy::new(|| {
    Lexicon::new(&[
        (&["python", "py"], "python"),
        (&["javascript", "js"], "javascript"),
        (&["typescript", "ts"], "typescript"),
        (&["rust"], "rust"),
        (&["java"], "java"),
        (&["html"], "html"),
        (&["css"], "css"),
        (&["sql"], "sql"),
        (&["bash", "shell", "terminal"], "bash"),
        (&["json"], "json"),
        (&["ruby"], "ruby"),
        (&["php"], "php"),
        (&["cpp"], "cpp"),
    ])
});

pub(crate) fn code_language(text: &str) -> Option<&'static str> {
    CODE_LANGUAGES.earliest(text)
}
