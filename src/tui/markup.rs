//! Transcript markup to styled terminal lines
//!
//! Understands exactly the tags the formatter emits plus the entities its
//! escaping produces. Anything else is shown as text.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    BoldOn,
    BoldOff,
    BlockOn,
    BlockOff,
    CodeOn,
    CodeOff,
    Break,
    Char(char),
}

/// Longest literals first so block tags win over inline code tags
const TOKENS: &[(&str, Token)] = &[
    ("<pre><code>", Token::BlockOn),
    ("</code></pre>", Token::BlockOff),
    ("<strong>", Token::BoldOn),
    ("</strong>", Token::BoldOff),
    ("<code>", Token::CodeOn),
    ("</code>", Token::CodeOff),
    ("<br>", Token::Break),
    ("&amp;", Token::Char('&')),
    ("&lt;", Token::Char('<')),
    ("&gt;", Token::Char('>')),
    ("&quot;", Token::Char('"')),
    ("&#39;", Token::Char('\'')),
];

fn next_token(input: &str) -> Option<(Token, &str)> {
    TOKENS.iter().find_map(|(literal, token)| {
        input.strip_prefix(literal).map(|rest| (*token, rest))
    })
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    text: String,
    bold: bool,
    code: bool,
    block: bool,
}

impl LineBuilder {
    fn style(&self, base: Style) -> Style {
        let mut style = base;
        if self.block {
            style = style.fg(Color::Cyan);
        } else if self.code {
            style = style.fg(Color::Yellow);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }

    fn flush_span(&mut self, base: Style) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.spans.push(Span::styled(text, self.style(base)));
        }
    }

    fn break_line(&mut self, base: Style) {
        self.flush_span(base);
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn finish(mut self, base: Style) -> Vec<Line<'static>> {
        self.break_line(base);
        self.lines
    }
}

/// Render formatter markup as terminal lines, one per `<br>`
pub fn markup_lines(markup: &str, base: Style) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::default();
    let mut rest = markup;

    while !rest.is_empty() {
        if let Some((token, after)) = next_token(rest) {
            match token {
                Token::Char(c) => builder.text.push(c),
                Token::Break => builder.break_line(base),
                Token::BoldOn | Token::BoldOff => {
                    builder.flush_span(base);
                    builder.bold = token == Token::BoldOn;
                }
                Token::CodeOn | Token::CodeOff => {
                    builder.flush_span(base);
                    builder.code = token == Token::CodeOn;
                }
                Token::BlockOn | Token::BlockOff => {
                    builder.flush_span(base);
                    builder.block = token == Token::BlockOn;
                }
            }
            rest = after;
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            builder.text.push(c);
        }
        rest = chars.as_str();
    }

    builder.finish(base)
}
