//! Data types that flow out of the extractor and the query engine.
//!
//! All of them are transient: built fresh for one query, handed to the
//! presentation layer and dropped.

use std::fmt;

use serde::Serialize;

/// A structured `Book Chapter:Verse[-Verse]` reference.
///
/// `verse_start <= verse_end` always holds; a single-verse citation has both
/// bounds equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub document_id: String,
    pub display_name: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
}

impl Citation {
    /// Chapter in the decimal form the extractor compares against.
    pub fn chapter_label(&self) -> String {
        self.chapter.to_string()
    }

    pub fn contains_verse(&self, verse: u32) -> bool {
        (self.verse_start..=self.verse_end).contains(&verse)
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.verse_start == self.verse_end {
            write!(
                f,
                "{} {}:{}",
                self.display_name, self.chapter, self.verse_start
            )
        } else {
            write!(
                f,
                "{} {}:{}-{}",
                self.display_name, self.chapter, self.verse_start, self.verse_end
            )
        }
    }
}

/// One addressable verse pulled out of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseRecord {
    pub document_id: String,
    /// Chapter digits as written in the bold chapter marker.
    pub chapter: String,
    /// Verse digits as written before the `*` marker.
    pub verse: String,
    /// Tag-stripped line, verse marker included (`"3* and he said..."`).
    pub text: String,
    /// Zero-based index of the page container holding the verse.
    pub page_index: usize,
    /// The line exactly as it appears in the markup.
    pub raw_span: String,
}

impl VerseRecord {
    /// Numeric verse value, `None` if the digit run does not fit a `u32`.
    pub fn verse_number(&self) -> Option<u32> {
        self.verse.parse().ok()
    }
}

/// A keyword hit, in corpus order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub document_id: String,
    pub display_name: String,
    pub chapter: String,
    pub verse: String,
    pub page_index: usize,
    pub text: String,
    /// `text` escaped for markup, every match wrapped in the highlight marker.
    pub highlighted_text: String,
}
