//! Turn text to display markup
//!
//! Escapes first so neither user nor agent text can inject structure, then
//! applies a fixed set of inline substitutions. Fenced blocks go before
//! inline spans so a backtick inside a fence is never taken for a span.

use regex::Regex;
use std::sync::OnceLock;

/// Tags the formatter can emit. Anything else in its output is escaped text.
#[cfg(test)]
pub const MARKUP_TAGS: &[&str] = &[
    "<strong>",
    "</strong>",
    "<pre>",
    "</pre>",
    "<code>",
    "</code>",
    "<br>",
];

fn bold_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex must compile"))
}

fn fence_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("fence regex must compile"))
}

fn inline_code_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"`(.*?)`").expect("inline code regex must compile"))
}

/// Escape markup-significant characters
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format raw turn text as markup. Total: every input produces output.
pub fn format_turn(text: &str) -> String {
    let escaped = escape(text);
    let bold = bold_regex().replace_all(&escaped, "<strong>${1}</strong>");
    let fenced = fence_regex().replace_all(&bold, "<pre><code>${1}</code></pre>");
    let inline = inline_code_regex().replace_all(&fenced, "<code>${1}</code>");
    inline.replace('\n', "<br>")
}
