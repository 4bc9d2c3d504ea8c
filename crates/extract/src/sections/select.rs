//! Table-of-contents disambiguation.
//!
//! A report lists every item in its table of contents before the body
//! repeats them as real headers. Listing entries come in tight runs of
//! strictly increasing items; body headers are separated by prose.

use std::collections::BTreeMap;

use filingdex_core::config::SectionConfig;
use filingdex_core::SectionType;

use super::scanner::Candidate;

/// Choose one boundary per item type, returned in document order.
///
/// `candidates` must be sorted by offset.
pub(crate) fn select(
    candidates: &[Candidate],
    text_len: usize,
    cfg: &SectionConfig,
) -> Vec<Candidate> {
    let listing = listing_flags(candidates, cfg);

    let mut by_type: BTreeMap<SectionType, Vec<usize>> = BTreeMap::new();
    for (i, c) in candidates.iter().enumerate() {
        by_type.entry(c.item).or_default().push(i);
    }

    let mut chosen: Vec<Candidate> = by_type
        .values()
        .filter_map(|indices| {
            let body: Vec<usize> = indices.iter().copied().filter(|&i| !listing[i]).collect();
            if body.is_empty() {
                // Every occurrence looks like a listing entry; the body copy comes last.
                indices.last().copied()
            } else {
                // Longest following stretch; later occurrence on ties.
                body.into_iter()
                    .max_by_key(|&i| (span(candidates, &listing, i, text_len), i))
            }
        })
        .map(|i| candidates[i])
        .collect();

    chosen.sort_by_key(|c| c.offset);
    chosen
}

/// Distance to the next candidate that could start a section (or document end).
///
/// Listing entries never bound a body, so they are skipped.
fn span(candidates: &[Candidate], listing: &[bool], i: usize, text_len: usize) -> usize {
    let next = candidates[i + 1..]
        .iter()
        .zip(&listing[i + 1..])
        .find(|(_, is_listing)| !**is_listing)
        .map_or(text_len, |(c, _)| c.offset);
    next - candidates[i].offset
}

/// Flag candidates inside runs of at least `toc_min_run` headers whose items
/// strictly increase and whose gaps stay within `toc_max_gap` characters.
fn listing_flags(candidates: &[Candidate], cfg: &SectionConfig) -> Vec<bool> {
    let mut flags = vec![false; candidates.len()];
    let min_run = cfg.toc_min_run.max(2);
    let mut run_start = 0;

    for i in 1..=candidates.len() {
        let continues = i < candidates.len() && {
            let prev = &candidates[i - 1];
            let cur = &candidates[i];
            cur.item.ordinal() > prev.item.ordinal() && cur.offset - prev.offset <= cfg.toc_max_gap
        };
        if !continues {
            if i - run_start >= min_run {
                flags[run_start..i].iter_mut().for_each(|f| *f = true);
            }
            run_start = i;
        }
    }
    flags
}
