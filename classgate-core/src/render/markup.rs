//! Constrained markup for the technical summary.
//!
//! The service writes summaries in a small markdown subset. Instead of
//! rewriting the text into HTML with substitutions, the text is parsed into
//! a tree of known node kinds and every piece of text is escaped on output,
//! so nothing in the summary can become live markup.
//!
//! Supported, line by line:
//! - `#` to `######` headings (a space must follow the hashes)
//! - `- item` list items
//! - `12. item` numbered items
//! - blank lines (line breaks)
//! - inline `**bold**` and `*italic*`
//!
//! Anything else is plain text. Unclosed delimiters stay literal.

use std::fmt::Write as _;

/// Inline run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
}

/// One line of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    ListItem(Vec<Inline>),
    NumberedItem { number: u32, content: Vec<Inline> },
    Line(Vec<Inline>),
    Blank,
}

/// Parsed summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    pub blocks: Vec<Block>,
}

impl MarkupDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            blocks: text.lines().map(parse_block).collect(),
        }
    }

    /// Renders to an HTML fragment. All text is escaped.
    ///
    /// Headings are demoted by two levels (`#` becomes `<h3>`, `##` becomes
    /// `<h4>`) because the summary sits inside a result card.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            let needs_break = i + 1 < self.blocks.len();
            match block {
                Block::Heading { level, content } => {
                    let tag = (level + 2).min(6);
                    let _ = write!(out, "<h{tag}>");
                    push_inlines_html(&mut out, content);
                    let _ = write!(out, "</h{tag}>");
                }
                Block::ListItem(content) => {
                    out.push_str("<li>");
                    push_inlines_html(&mut out, content);
                    out.push_str("</li>");
                }
                Block::NumberedItem { number, content } => {
                    let _ = write!(out, "<div class=\"numbered\">{number}. ");
                    push_inlines_html(&mut out, content);
                    out.push_str("</div>");
                }
                Block::Line(content) => {
                    push_inlines_html(&mut out, content);
                    if needs_break {
                        out.push_str("<br/>");
                    }
                }
                Block::Blank => {
                    if needs_break {
                        out.push_str("<br/>");
                    }
                }
            }
        }
        out
    }

    /// Renders to plain text for terminals and logs.
    pub fn to_plain_text(&self) -> String {
        let lines: Vec<String> = self
            .blocks
            .iter()
            .map(|block| match block {
                Block::Heading { content, .. } => plain(content).to_uppercase(),
                Block::ListItem(content) => format!("  • {}", plain(content)),
                Block::NumberedItem { number, content } => {
                    format!("{number}. {}", plain(content))
                }
                Block::Line(content) => plain(content),
                Block::Blank => String::new(),
            })
            .collect();
        lines.join("\n")
    }
}

fn parse_block(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Blank;
    }

    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        let rest = &trimmed[hashes..];
        if rest.starts_with(char::is_whitespace) {
            return Block::Heading {
                level: hashes as u8,
                content: parse_inlines(rest.trim()),
            };
        }
    }

    if let Some(rest) = trimmed.strip_prefix("- ") {
        return Block::ListItem(parse_inlines(rest.trim_start()));
    }

    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = trimmed[digits..].strip_prefix(". ") {
            if let Ok(number) = trimmed[..digits].parse::<u32>() {
                return Block::NumberedItem {
                    number,
                    content: parse_inlines(rest.trim_start()),
                };
            }
        }
    }

    Block::Line(parse_inlines(trimmed))
}

fn parse_inlines(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = closing(after, "**") {
                flush(&mut buf, &mut out);
                out.push(Inline::Strong(after[..end].to_string()));
                rest = &after[end + 2..];
            } else {
                buf.push_str("**");
                rest = after;
            }
            continue;
        }
        if let Some(after) = rest.strip_prefix('*') {
            if let Some(end) = closing(after, "*") {
                flush(&mut buf, &mut out);
                out.push(Inline::Emphasis(after[..end].to_string()));
                rest = &after[end + 1..];
                continue;
            }
        }

        buf.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    flush(&mut buf, &mut out);
    out
}

/// Position of the closing delimiter. An opener followed by whitespace is
/// literal, as is an empty span.
fn closing(after: &str, delimiter: &str) -> Option<usize> {
    if after.starts_with(char::is_whitespace) {
        return None;
    }
    after.find(delimiter).filter(|end| *end > 0)
}

fn flush(buf: &mut String, out: &mut Vec<Inline>) {
    if !buf.is_empty() {
        out.push(Inline::Text(std::mem::take(buf)));
    }
}

fn plain(content: &[Inline]) -> String {
    content
        .iter()
        .map(|inline| match inline {
            Inline::Text(t) | Inline::Strong(t) | Inline::Emphasis(t) => t.as_str(),
        })
        .collect()
}

fn push_inlines_html(out: &mut String, content: &[Inline]) {
    for inline in content {
        match inline {
            Inline::Text(t) => escape_html_into(out, t),
            Inline::Strong(t) => {
                out.push_str("<strong>");
                escape_html_into(out, t);
                out.push_str("</strong>");
            }
            Inline::Emphasis(t) => {
                out.push_str("<em>");
                escape_html_into(out, t);
                out.push_str("</em>");
            }
        }
    }
}

fn escape_html_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
