//! Character reference decoding.
//!
//! Named references resolve against the full HTML5 table; numeric ones are
//! decoded here so the Windows-1252 range can be repaired.

use quick_xml::escape::resolve_html5_entity;

use super::builder::TextBuilder;

/// Longest reference we try to match, including `&` and `;`.
/// (`&CounterClockwiseContourIntegral;` is the longest HTML5 name.)
const MAX_ENTITY_LEN: usize = 40;

/// Text a reference stands for. A few HTML5 names expand to two code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reference {
    Char(char),
    Text(&'static str),
}

impl Reference {
    /// Append the decoded text, attributing every character to `raw_pos`.
    pub(crate) fn push_into(self, out: &mut TextBuilder, raw_pos: usize) {
        match self {
            Reference::Char(c) => out.push_text_char(c, raw_pos),
            Reference::Text(s) => s.chars().for_each(|c| out.push_text_char(c, raw_pos)),
        }
    }
}

/// Decode the character reference starting at `s[0] == '&'`.
///
/// Returns the decoded text and the number of bytes consumed, or `None`
/// when `s` does not start with a recognizable reference (the `&` is then
/// literal text).
pub(crate) fn decode(s: &str) -> Option<(Reference, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }
    let limit = bytes.len().min(MAX_ENTITY_LEN);
    let semi = bytes[1..limit].iter().position(|&b| b == b';')? + 1;
    let body = &s[1..semi];
    let consumed = semi + 1;

    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return Some((Reference::Char(numeric_char(code)), consumed));
    }

    resolve_html5_entity(body).map(|text| (Reference::Text(text), consumed))
}

/// Map a numeric reference, fixing the Windows-1252 range HTML authors lean on.
fn numeric_char(code: u32) -> char {
    let mapped = match code {
        0x80 => 0x20ac,
        0x91 => 0x2018,
        0x92 => 0x2019,
        0x93 => 0x201c,
        0x94 => 0x201d,
        0x95 => 0x2022,
        0x96 => 0x2013,
        0x97 => 0x2014,
        other => other,
    };
    char::from_u32(mapped).unwrap_or('\u{fffd}')
}
