//! Line-start scanner for `Item <number><letter?>` headers.

use filingdex_core::SectionType;

/// A possible section boundary found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub item: SectionType,
    /// Byte offset of the line start (first non-blank character).
    pub offset: usize,
    /// Byte offset just past the item label.
    pub label_end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Matching the letters of `item`; holds how many matched so far.
    Word(usize),
    /// After `item`, skipping separators before the number.
    Gap,
    /// Reading up to two digits.
    Number { value: u32, digits: usize },
    /// Digits done; an optional single letter may follow.
    Suffix { value: u32, letter: char },
}

const WORD: &[u8] = b"item";

/// Scan every line of `text` for an item header.
///
/// `title_window` bounds how far past the label the item's title keyword may
/// appear (it is often on the following line in tabular layouts).
pub(crate) fn scan(text: &str, title_window: usize) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let offset = line_start + indent;
        if let Some((item, label_len)) = match_label(&text[offset..line_start + line.len()]) {
            let label_end = offset + label_len;
            if has_title(text, label_end, title_window, item) {
                out.push(Candidate {
                    item,
                    offset,
                    label_end,
                });
            }
        }
        line_start += line.len();
    }
    out
}

/// Run the header state machine over the start of a line.
///
/// Returns the item and the byte length of the matched label.
fn match_label(line: &str) -> Option<(SectionType, usize)> {
    let mut state = State::Word(0);
    for (i, c) in line.char_indices() {
        state = match state {
            State::Word(n) => {
                if c.to_ascii_lowercase() as u32 != WORD[n] as u32 {
                    return None;
                }
                if n + 1 == WORD.len() {
                    State::Gap
                } else {
                    State::Word(n + 1)
                }
            }
            State::Gap => match c {
                ' ' | '\t' | '\u{a0}' => State::Gap,
                d if d.is_ascii_digit() => State::Number {
                    value: d as u32 - '0' as u32,
                    digits: 1,
                },
                _ => return None,
            },
            State::Number { value, digits } => match c {
                d if d.is_ascii_digit() && digits < 2 => State::Number {
                    value: value * 10 + (d as u32 - '0' as u32),
                    digits: digits + 1,
                },
                d if d.is_ascii_digit() => return None,
                l if l.is_ascii_alphabetic() => State::Suffix { value, letter: l },
                _ => return finish(value, None, line, i),
            },
            State::Suffix { value, letter } => {
                if c.is_alphanumeric() {
                    return None;
                }
                return finish(value, Some(letter), line, i);
            }
        };
    }
    match state {
        State::Number { value, .. } => finish(value, None, line, line.len()),
        State::Suffix { value, letter } => finish(value, Some(letter), line, line.len()),
        _ => None,
    }
}

/// Accept the label ending at `end` unless it is a dotted sub-item (`Item 2.02`).
fn finish(
    value: u32,
    letter: Option<char>,
    line: &str,
    end: usize,
) -> Option<(SectionType, usize)> {
    let rest = &line[end..];
    let mut chars = rest.chars();
    if chars.next() == Some('.') && chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    SectionType::from_item_label(value, letter).map(|t| (t, end))
}

fn has_title(text: &str, label_end: usize, window: usize, item: SectionType) -> bool {
    let tail = &text[label_end..];
    let end = tail
        .char_indices()
        .nth(window)
        .map_or(tail.len(), |(i, _)| i);
    let probe = tail[..end].to_lowercase();
    item.keywords().iter().any(|k| probe.contains(k))
}
