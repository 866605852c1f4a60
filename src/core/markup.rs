//! Interpretation of server-supplied reply markup into renderable blocks.
//!
//! Bot markup is trusted structurally: tags decide paragraphs, line breaks,
//! lists, emphasis and code blocks. Text content is still stripped of
//! terminal control characters before it reaches the screen, so a reply can
//! never smuggle escape sequences into the terminal. User text never passes
//! through here; it is rendered literally.

use ratatui::text::Line;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};

use crate::core::copy::CopyControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Strong,
    Emphasis,
    Code,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    pub text: String,
    pub emphasis: Emphasis,
}

pub type InlineLine = Vec<Inline>;

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Raw language tag taken from a `language-*`, `lang-*` or `hljs <tag>` class.
    pub language: Option<String>,
    pub text: String,
    pub badge: Option<String>,
    pub copy: Option<CopyControl>,
    pub highlighted: Option<Vec<Line<'static>>>,
}

impl CodeBlock {
    pub fn new(language: Option<String>, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
            badge: None,
            copy: None,
            highlighted: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(Vec<InlineLine>),
    Code(CodeBlock),
}

/// Parse a markup fragment into text and code blocks.
pub fn parse_markup(markup: &str) -> Vec<Block> {
    let fragment = Html::parse_fragment(markup);
    let mut builder = BlockBuilder::default();
    builder.walk(fragment.root_element(), Emphasis::Plain);
    builder.finish()
}

/// Flatten markup to plain text, keeping line breaks.
pub fn plain_text(markup: &str) -> String {
    blocks_to_plain_text(&parse_markup(markup))
}

pub fn blocks_to_plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Text(lines) => lines
                .iter()
                .map(|line| line_text(line))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Code(code) => code.text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn line_text(line: &[Inline]) -> String {
    line.iter().map(|inline| inline.text.as_str()).collect()
}

/// Drop terminal control characters, keeping newlines and expanding tabs.
pub fn strip_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn declared_language(element: &Element) -> Option<String> {
    let prefixed = element
        .classes()
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .filter(|tag| !tag.is_empty());
    if let Some(tag) = prefixed {
        return Some(tag.to_string());
    }

    // highlight.js marks blocks as `hljs <lang>`.
    if element.classes().any(|class| class == "hljs") {
        return element
            .classes()
            .find(|class| *class != "hljs" && !class.starts_with("hljs-"))
            .map(str::to_string);
    }
    None
}

fn code_block_from(pre: ElementRef<'_>) -> CodeBlock {
    let code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "code");

    let language = code
        .and_then(|code| declared_language(code.value()))
        .or_else(|| declared_language(pre.value()));

    let raw: String = pre.text().collect();
    let text = strip_control_chars(raw.strip_suffix('\n').unwrap_or(&raw));
    CodeBlock::new(language, text)
}

fn is_block_element(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "blockquote"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "table"
            | "tr"
            | "header"
            | "footer"
    )
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    lines: Vec<InlineLine>,
    line: InlineLine,
    // None for bullet lists, Some(counter) for ordered lists
    lists: Vec<Option<usize>>,
}

impl BlockBuilder {
    fn walk(&mut self, parent: ElementRef<'_>, emphasis: Emphasis) {
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text, emphasis),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.walk_element(element, emphasis);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, node: ElementRef<'_>, emphasis: Emphasis) {
        let element = node.value();
        match element.name() {
            "br" => self.break_line(),
            "pre" => {
                self.end_paragraph();
                self.blocks.push(Block::Code(code_block_from(node)));
            }
            "script" | "style" | "template" | "head" => {}
            "strong" | "b" => self.walk(node, Emphasis::Strong),
            "em" | "i" => self.walk(node, Emphasis::Emphasis),
            "code" | "kbd" | "samp" => self.walk(node, Emphasis::Code),
            "a" => self.walk(node, Emphasis::Link),
            "ul" | "ol" => {
                self.soft_break();
                let counter = (element.name() == "ol").then_some(0);
                self.lists.push(counter);
                self.walk(node, emphasis);
                self.lists.pop();
                self.soft_break();
                if self.lists.is_empty() {
                    self.end_paragraph();
                }
            }
            "li" => {
                self.soft_break();
                let depth = self.lists.len().max(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        *n += 1;
                        format!("{n}. ")
                    }
                    _ => "• ".to_string(),
                };
                self.push_raw(format!("{}{marker}", "  ".repeat(depth - 1)));
                self.walk(node, emphasis);
                self.soft_break();
            }
            name if is_block_element(name) => {
                self.end_paragraph();
                self.walk(node, emphasis);
                self.end_paragraph();
            }
            _ => self.walk(node, emphasis),
        }
    }

    fn push_text(&mut self, raw: &str, emphasis: Emphasis) {
        let cleaned = strip_control_chars(raw);
        let mut collapsed = String::with_capacity(cleaned.len());
        let mut in_space = false;
        for ch in cleaned.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    collapsed.push(' ');
                }
                in_space = true;
            } else {
                collapsed.push(ch);
                in_space = false;
            }
        }

        let at_line_start = self
            .line
            .last()
            .map(|inline| inline.text.ends_with(' '))
            .unwrap_or(true);
        let text = if at_line_start {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if text.is_empty() {
            return;
        }

        match self.line.last_mut() {
            Some(last) if last.emphasis == emphasis => last.text.push_str(text),
            _ => self.line.push(Inline {
                text: text.to_string(),
                emphasis,
            }),
        }
    }

    fn push_raw(&mut self, text: String) {
        self.line.push(Inline {
            text,
            emphasis: Emphasis::Plain,
        });
    }

    fn break_line(&mut self) {
        let mut line = std::mem::take(&mut self.line);
        if let Some(last) = line.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            last.text.truncate(trimmed_len);
        }
        line.retain(|inline| !inline.text.is_empty());
        self.lines.push(line);
    }

    fn soft_break(&mut self) {
        if !self.line.is_empty() {
            self.break_line();
        }
    }

    fn end_paragraph(&mut self) {
        self.soft_break();
        while matches!(self.lines.last(), Some(line) if line.is_empty()) {
            self.lines.pop();
        }
        if !self.lines.is_empty() {
            self.blocks.push(Block::Text(std::mem::take(&mut self.lines)));
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.end_paragraph();
        self.blocks
    }
}
