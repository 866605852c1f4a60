//! Post-processing for code blocks inside rendered bot messages: a language
//! badge, a copy control, and the optional highlighting hook.

use tracing::warn;

use crate::core::copy::CopyControl;
use crate::core::document::{MessageBody, MessageNode};
use crate::utils::syntax::Highlighter;

/// Human-readable label for a declared language tag.
pub fn language_label(tag: &str) -> String {
    let label = match tag.trim().to_ascii_lowercase().as_str() {
        "py" | "python" => "Python",
        "js" | "javascript" | "jsx" => "JavaScript",
        "ts" | "typescript" | "tsx" => "TypeScript",
        "sh" | "bash" | "shell" | "zsh" => "Shell",
        "rs" | "rust" => "Rust",
        "go" | "golang" => "Go",
        "java" => "Java",
        "kt" | "kotlin" => "Kotlin",
        "c" => "C",
        "cpp" | "c++" | "cc" | "hpp" => "C++",
        "cs" | "csharp" => "C#",
        "rb" | "ruby" => "Ruby",
        "php" => "PHP",
        "swift" => "Swift",
        "html" => "HTML",
        "css" => "CSS",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "xml" => "XML",
        "sql" => "SQL",
        "md" | "markdown" => "Markdown",
        "plaintext" | "text" | "txt" => "Text",
        _ => return capitalize(tag.trim()),
    };
    label.to_string()
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Attach badges and copy controls to every code block of `node` that has
/// no copy control yet. Returns the number of blocks enhanced.
pub fn enhance(node: &mut MessageNode) -> usize {
    let mut enhanced = 0;
    for code in node.code_blocks_mut() {
        if code.copy.is_some() {
            continue;
        }
        if code.badge.is_none() {
            code.badge = code.language.as_deref().map(language_label);
        }
        code.copy = Some(CopyControl::new());
        enhanced += 1;
    }
    enhanced
}

/// Put a copy control next to a user message. No-op if one is present.
pub fn attach_message_copy(node: &mut MessageNode) -> bool {
    match &mut node.body {
        MessageBody::Text { copy, .. } if copy.is_none() => {
            *copy = Some(CopyControl::new());
            true
        }
        _ => false,
    }
}

/// Run the highlighter over every code block of `node`. Failures are logged
/// and leave the block on its plain rendering.
pub fn apply_highlighting(node: &mut MessageNode, highlighter: &dyn Highlighter) {
    for code in node.code_blocks_mut() {
        let lang = code.language.as_deref().unwrap_or("");
        match highlighter.highlight(lang, &code.text) {
            Ok(lines) => code.highlighted = Some(lines),
            Err(err) => {
                warn!(language = lang, error = %err, "code block highlighting failed");
                code.highlighted = None;
            }
        }
    }
}
