//! Output accumulator shared by the markup passes.

/// Sparse map from normalized byte offsets to raw byte offsets.
///
/// Stores an anchor only where the two texts stop advancing in lockstep
/// (a removed tag, a decoded entity, collapsed whitespace); offsets between
/// anchors are interpolated one-to-one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffsetMap {
    anchors: Vec<(usize, usize)>,
}

impl OffsetMap {
    pub fn raw_offset(&self, normalized: usize) -> usize {
        let idx = self.anchors.partition_point(|&(n, _)| n <= normalized);
        if idx == 0 {
            return normalized;
        }
        let (n, r) = self.anchors[idx - 1];
        r + (normalized - n)
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Space,
    Break,
}

/// Builds normalized text while collapsing whitespace.
///
/// Separators are deferred until the next visible character so the output
/// never starts or ends with whitespace and never holds two in a row.
#[derive(Debug, Default)]
pub(crate) struct TextBuilder {
    text: String,
    anchors: Vec<(usize, usize)>,
    pending: Option<(Pending, usize)>,
}

impl TextBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            text: String::with_capacity(cap),
            ..Default::default()
        }
    }

    /// Request a space before the next visible character.
    pub fn space(&mut self, raw_pos: usize) {
        if self.pending.is_none() {
            self.pending = Some((Pending::Space, raw_pos));
        }
    }

    /// Request a paragraph break before the next visible character.
    pub fn paragraph_break(&mut self, raw_pos: usize) {
        if !matches!(self.pending, Some((Pending::Break, _))) {
            self.pending = Some((Pending::Break, raw_pos));
        }
    }

    /// Append a visible (non-whitespace) character that came from `raw_pos`.
    pub fn push(&mut self, c: char, raw_pos: usize) {
        if let Some((kind, at)) = self.pending.take() {
            if !self.text.is_empty() {
                let sep = match kind {
                    Pending::Break => '\n',
                    Pending::Space => ' ',
                };
                self.emit(sep, at);
            }
        }
        self.emit(c, raw_pos);
    }

    /// Append a character, treating any whitespace as a collapsible space.
    pub fn push_text_char(&mut self, c: char, raw_pos: usize) {
        if c.is_whitespace() {
            self.space(raw_pos);
        } else if !is_invisible(c) {
            self.push(c, raw_pos);
        }
    }

    fn emit(&mut self, c: char, raw_pos: usize) {
        let norm_pos = self.text.len();
        let in_step = match self.anchors.last() {
            Some(&(n, r)) => r + (norm_pos - n) == raw_pos,
            None => norm_pos == raw_pos,
        };
        if !in_step {
            self.anchors.push((norm_pos, raw_pos));
        }
        self.text.push(c);
    }

    pub fn finish(self) -> (String, OffsetMap) {
        (self.text, OffsetMap { anchors: self.anchors })
    }
}

/// Zero-width characters that only add noise to extracted text.
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' | '\u{ad}')
}
