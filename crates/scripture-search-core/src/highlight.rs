//! Case-insensitive term matching and highlight rendering.
//!
//! Both the keyword containment test and the highlight spans come from
//! [`find_matches`], so a verse is a hit exactly when it gets at least one
//! highlight. Text and term are both folded with `str::to_lowercase`, so the
//! test agrees with `text.to_lowercase().contains(&term.to_lowercase())`
//! (final sigma included). Matches are mapped back to byte ranges of the
//! original text and keep their casing inside the marker.

use std::ops::Range;

use quick_xml::escape::escape;

pub const DEFAULT_OPEN: &str = r#"<span class="highlight">"#;
pub const DEFAULT_CLOSE: &str = "</span>";

/// Non-overlapping, leftmost case-insensitive matches of `term` in `text`.
pub fn find_matches(text: &str, term: &str) -> Vec<Range<usize>> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let folded = text.to_lowercase();
    let bounds = fold_bounds(text);

    let mut matches: Vec<Range<usize>> = Vec::new();
    for (at, found) in folded.match_indices(&needle) {
        let range = original_offset(&bounds, at, false)
            ..original_offset(&bounds, at + found.len(), true);
        if matches.last().map_or(true, |prev| prev.end <= range.start) {
            matches.push(range);
        }
    }
    matches
}

pub fn contains(text: &str, term: &str) -> bool {
    !find_matches(text, term).is_empty()
}

/// `(folded offset, original offset)` at every char boundary of `text`.
///
/// Each char lower-cases to the same byte length `str::to_lowercase` gives
/// it; the final-sigma rule only picks between two 2-byte forms.
fn fold_bounds(text: &str) -> Vec<(usize, usize)> {
    let mut bounds = Vec::with_capacity(text.len() + 1);
    let mut folded = 0;
    for (orig, ch) in text.char_indices() {
        bounds.push((folded, orig));
        folded += ch.to_lowercase().map(char::len_utf8).sum::<usize>();
    }
    bounds.push((folded, text.len()));
    bounds
}

/// Maps a folded offset back to `text`. An offset inside one char's
/// expansion snaps to that char's start, or its end when `round_up`.
fn original_offset(bounds: &[(usize, usize)], folded: usize, round_up: bool) -> usize {
    match bounds.binary_search_by_key(&folded, |&(f, _)| f) {
        Ok(i) => bounds[i].1,
        Err(i) if round_up => bounds[i.min(bounds.len() - 1)].1,
        Err(i) => bounds[i.saturating_sub(1)].1,
    }
}

/// Wraps matches in a pair of markers; every text segment is escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    open: String,
    close: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN, DEFAULT_CLOSE)
    }
}

impl Highlighter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn highlight(&self, text: &str, term: &str) -> String {
        let matches = find_matches(text, term);
        let mut out = String::with_capacity(text.len() + matches.len() * 32);
        let mut cursor = 0;
        for range in matches {
            out.push_str(&escape(&text[cursor..range.start]));
            out.push_str(&self.open);
            out.push_str(&escape(&text[range.clone()]));
            out.push_str(&self.close);
            cursor = range.end;
        }
        out.push_str(&escape(&text[cursor..]));
        out
    }
}
