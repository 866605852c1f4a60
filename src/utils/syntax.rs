use crate::ui::theme::Theme;
use ratatui::style::Color as TuiColor;
use ratatui::text::{Line, Span};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// None of the bundled syntect themes could be loaded.
    MissingTheme(String),
    /// syntect failed while scanning a line.
    Scan(String),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::MissingTheme(name) => write!(f, "syntax theme `{name}` unavailable"),
            HighlightError::Scan(reason) => write!(f, "syntax highlighting failed: {reason}"),
        }
    }
}

impl std::error::Error for HighlightError {}

/// Hook applied to every code block of a freshly rendered bot message.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, lang_hint: &str, code: &str)
        -> Result<Vec<Line<'static>>, HighlightError>;
}

// Simple FIFO cache (bounded) for highlighted blocks
// key = (lang_norm, hash)

fn hash_code(lang: &str, code: &str, theme_sig: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    theme_sig.hash(&mut hasher);
    hasher.finish()
}

struct SimpleCache {
    map: HashMap<(String, u64), Vec<Line<'static>>>,
    order: VecDeque<(String, u64)>,
    cap: usize,
}

impl SimpleCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }
    fn get(&self, k: &(String, u64)) -> Option<Vec<Line<'static>>> {
        self.map.get(k).cloned()
    }
    fn put(&mut self, k: (String, u64), v: Vec<Line<'static>>) {
        if !self.map.contains_key(&k) {
            self.order.push_back(k.clone());
        }
        self.map.insert(k, v);
        while self.map.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }
}

fn is_dark_background(c: &TuiColor) -> bool {
    match c {
        TuiColor::Rgb(r, g, b) => {
            let br = 0.2126 * (*r as f32) + 0.7152 * (*g as f32) + 0.0722 * (*b as f32);
            br < 128.0
        }
        TuiColor::Black => true,
        TuiColor::White => false,
        TuiColor::Gray | TuiColor::DarkGray => true,
        _ => true,
    }
}

fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" => "bash".into(),
        "js" | "javascript" | "jsx" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "c++" => "cpp".into(),
        "kotlin" | "kt" => "kotlin".into(),
        "html" | "xml" => "html".into(),
        other => other.into(),
    }
}

/// Pick a syntect theme that reads well on the UI background.
pub(crate) fn pick_syntect_theme_name(theme: &Theme) -> &'static str {
    if is_dark_background(&theme.background_color) {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

/// syntect-backed highlighter with a bounded cache of rendered blocks.
pub struct SyntectHighlighter {
    theme_name: &'static str,
    code_bg: Option<TuiColor>,
    cache: Mutex<SimpleCache>,
}

impl SyntectHighlighter {
    pub fn new(theme: &Theme) -> Self {
        Self {
            theme_name: pick_syntect_theme_name(theme),
            code_bg: theme.code_block_bg,
            cache: Mutex::new(SimpleCache::new(64)),
        }
    }

    fn theme_signature(&self) -> String {
        format!("{}|{:?}", self.theme_name, self.code_bg)
    }
}

fn syntax_set() -> &'static syntect::parsing::SyntaxSet {
    static SYNTAX_SET: OnceLock<syntect::parsing::SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(syntect::parsing::SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static syntect::highlighting::ThemeSet {
    static THEME_SET: OnceLock<syntect::highlighting::ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(syntect::highlighting::ThemeSet::load_defaults)
}

impl Highlighter for SyntectHighlighter {
    fn highlight(
        &self,
        lang_hint: &str,
        code: &str,
    ) -> Result<Vec<Line<'static>>, HighlightError> {
        let lang_norm = normalize_lang_hint(lang_hint);
        let key = (
            lang_norm.clone(),
            hash_code(&lang_norm, code, &self.theme_signature()),
        );
        if let Ok(cache) = self.cache.lock() {
            if let Some(lines) = cache.get(&key) {
                return Ok(lines);
            }
        }

        let ps = syntax_set();
        let ts = theme_set();
        let fallback_names = ["base16-ocean.light", "Solarized (light)", "base16-ocean.dark"];
        let syn_theme = ts
            .themes
            .get(self.theme_name)
            .or_else(|| fallback_names.iter().find_map(|name| ts.themes.get(*name)))
            .ok_or_else(|| HighlightError::MissingTheme(self.theme_name.to_string()))?;

        let syntax = ps
            .find_syntax_by_token(&lang_norm)
            .unwrap_or_else(|| ps.find_syntax_plain_text());

        let mut h = syntect::easy::HighlightLines::new(syntax, syn_theme);
        let mut out: Vec<Line<'static>> = Vec::new();
        for line in syntect::util::LinesWithEndings::from(code) {
            let ranges = h
                .highlight_line(line, ps)
                .map_err(|err| HighlightError::Scan(err.to_string()))?;
            let mut spans: Vec<Span<'static>> = Vec::new();
            for (style, text) in ranges {
                // strip trailing newline from the fragment before rendering in a Line
                let frag = text.strip_suffix('\n').unwrap_or(text);
                let fg = style.foreground;
                let mut st = ratatui::style::Style::default().fg(TuiColor::Rgb(fg.r, fg.g, fg.b));
                if let Some(bg) = self.code_bg {
                    st = st.bg(bg);
                }
                spans.push(Span::styled(frag.to_string(), st));
            }
            out.push(Line::from(spans));
        }

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, out.clone());
        }
        Ok(out)
    }
}
