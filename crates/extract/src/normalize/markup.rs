//! Tag-stripping passes over raw HTML / inline XBRL.

use std::ops::Range;

use thiserror::Error;

use super::builder::TextBuilder;
use super::{clamp_range, entities};

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MarkupError {
    #[error("unterminated tag at byte {0}")]
    UnterminatedTag(usize),
    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),
    #[error("unclosed <{name}> element at byte {at}")]
    UnclosedElement { name: String, at: usize },
}

/// Elements whose entire content is dropped.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "head",
    "ix:header",
    "ix:hidden",
    "ix:references",
    "ix:resources",
    "xbrli:context",
    "xbrli:unit",
];

/// Elements that end a paragraph.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "tr", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "section", "article", "blockquote", "pre", "center", "body", "html", "dd", "dt", "dl",
    "caption", "page", "document", "text",
];

/// Elements that separate words without ending a paragraph.
const CELL_ELEMENTS: &[&str] = &["td", "th"];

#[derive(Debug, PartialEq, Eq)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    /// Byte offset just past `>`.
    end: usize,
}

/// Full pass: understands comments, raw-text elements and hidden XBRL blocks.
/// Fails on markup it cannot delimit, so the caller can degrade.
pub(crate) fn structural(
    raw: &str,
    range: Range<usize>,
    preserve_newlines: bool,
) -> Result<TextBuilder, MarkupError> {
    let range = clamp_range(raw, range);
    let mut out = TextBuilder::with_capacity(range.len() / 2);
    let bytes = raw.as_bytes();
    let mut pos = range.start;

    while pos < range.end {
        let rest = &raw[pos..range.end];
        match bytes[pos] {
            b'<' if rest.starts_with("<!--") => {
                let close = rest
                    .find("-->")
                    .ok_or(MarkupError::UnterminatedComment(pos))?;
                pos += close + 3;
            }
            b'<' if rest.starts_with("<!") || rest.starts_with("<?") => {
                let close = rest.find('>').ok_or(MarkupError::UnterminatedTag(pos))?;
                pos += close + 1;
            }
            b'<' if starts_tag(rest) => {
                let tag =
                    parse_tag(raw, pos, range.end).ok_or(MarkupError::UnterminatedTag(pos))?;
                let skipped = SKIPPED_ELEMENTS.contains(&tag.name.as_str());
                if !tag.closing && !tag.self_closing && skipped {
                    pos = skip_element(raw, &tag, range.end).ok_or_else(|| {
                        MarkupError::UnclosedElement {
                            name: tag.name.clone(),
                            at: pos,
                        }
                    })?;
                    out.paragraph_break(pos);
                    continue;
                }
                separate(&mut out, &tag.name, pos);
                pos = tag.end;
            }
            b'&' => match entities::decode(rest) {
                Some((reference, used)) => {
                    reference.push_into(&mut out, pos);
                    pos += used;
                }
                None => {
                    out.push('&', pos);
                    pos += 1;
                }
            },
            _ => {
                // `rest` is non-empty and starts on a char boundary.
                let c = rest.chars().next().unwrap_or(' ');
                if preserve_newlines && c == '\n' {
                    out.paragraph_break(pos);
                } else {
                    out.push_text_char(c, pos);
                }
                pos += c.len_utf8();
            }
        }
    }

    Ok(out)
}

/// Degraded pass: removes anything that looks like a closed `<...>` tag and
/// keeps the rest verbatim. Raw newlines become paragraph breaks.
pub(crate) fn permissive(raw: &str, range: Range<usize>) -> TextBuilder {
    let range = clamp_range(raw, range);
    let mut out = TextBuilder::with_capacity(range.len() / 2);
    let mut pos = range.start;

    while pos < range.end {
        let rest = &raw[pos..range.end];
        if rest.starts_with('<') {
            if let Some(close) = rest.find('>') {
                let name = tag_name(&rest[1..close]);
                separate(&mut out, &name, pos);
                pos += close + 1;
                continue;
            }
        }
        if rest.starts_with('&') {
            if let Some((reference, used)) = entities::decode(rest) {
                reference.push_into(&mut out, pos);
                pos += used;
                continue;
            }
        }
        let c = rest.chars().next().unwrap_or(' ');
        if c == '\n' {
            out.paragraph_break(pos);
        } else {
            out.push_text_char(c, pos);
        }
        pos += c.len_utf8();
    }

    out
}

fn separate(out: &mut TextBuilder, name: &str, pos: usize) {
    if BLOCK_ELEMENTS.contains(&name) {
        out.paragraph_break(pos);
    } else if CELL_ELEMENTS.contains(&name) {
        out.space(pos);
    }
}

/// `<` followed by a letter or `/letter` opens a tag; anything else is text.
fn starts_tag(rest: &str) -> bool {
    let b = rest.as_bytes();
    match b.get(1) {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some(b'/') => b.get(2).is_some_and(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// Parse the tag at `raw[start] == '<'`, honoring quoted attribute values.
fn parse_tag(raw: &str, start: usize, limit: usize) -> Option<Tag> {
    let bytes = raw.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = start + 1;
    while i < limit {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                let inner = &raw[start + 1..i];
                let closing = inner.starts_with('/');
                return Some(Tag {
                    name: tag_name(inner),
                    closing,
                    self_closing: inner.ends_with('/'),
                    end: i + 1,
                });
            }
            None => {}
        }
        i += 1;
    }
    None
}

/// Lowercased element name, including any namespace prefix.
fn tag_name(inner: &str) -> String {
    inner
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Find the end of the matching close tag for a skipped element.
fn skip_element(raw: &str, open: &Tag, limit: usize) -> Option<usize> {
    let needle = format!("</{}", open.name);
    let mut from = open.end;
    while from < limit {
        let found = find_ignore_ascii_case(&raw[from..limit], &needle)? + from;
        let after = found + needle.len();
        let boundary = raw.as_bytes().get(after).copied();
        if matches!(boundary, Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            let close = raw[after..limit].find('>')? + after;
            return Some(close + 1);
        }
        from = after;
    }
    None
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}
