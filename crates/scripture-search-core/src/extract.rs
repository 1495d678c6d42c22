//! Verse extractor: markup to an ordered list of [`VerseRecord`]s.
//!
//! Chapter context is tracked per page. Each page starts with no chapter; a
//! paragraph whose first qualifying `<b>` span reads like `"12"` or `"12."`
//! sets it for itself and the paragraphs after it on the same page. Verse
//! lines are emitted only while a chapter is known, and only for the target
//! chapter when one is given. Verses that appear on a page before its first
//! chapter marker are therefore never emitted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::{self, MarkupError, Page, Paragraph};
use crate::models::VerseRecord;

static CHAPTER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)[.\s]*$").expect("chapter pattern is valid"));

static VERSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\*").expect("verse pattern is valid"));

/// Extracts verses from one document, optionally confined to one chapter.
pub fn extract(
    document_id: &str,
    markup: &str,
    target_chapter: Option<&str>,
) -> Result<Vec<VerseRecord>, MarkupError> {
    let pages = markup::pages(markup)?;
    let mut records = Vec::new();
    for page in &pages {
        extract_page(document_id, page, target_chapter, &mut records);
    }
    Ok(records)
}

/// Folds one page's paragraphs, threading the current chapter through.
fn extract_page(
    document_id: &str,
    page: &Page<'_>,
    target_chapter: Option<&str>,
    out: &mut Vec<VerseRecord>,
) {
    page.paragraphs
        .iter()
        .fold(None::<&str>, |chapter, paragraph| {
            let chapter = chapter_marker(paragraph).or(chapter);
            let wanted = match (chapter, target_chapter) {
                (Some(current), Some(target)) => current == target,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if let (true, Some(current)) = (wanted, chapter) {
                push_verses(document_id, paragraph, current, page.index, out);
            }
            chapter
        });
}

/// Chapter digits of the first bold span that is only a number.
fn chapter_marker<'p>(paragraph: &'p Paragraph<'_>) -> Option<&'p str> {
    paragraph.bold.iter().find_map(|span| {
        CHAPTER_MARKER
            .captures(span.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

fn push_verses(
    document_id: &str,
    paragraph: &Paragraph<'_>,
    chapter: &str,
    page_index: usize,
    out: &mut Vec<VerseRecord>,
) {
    for raw in &paragraph.lines {
        let text = markup::strip_tags(raw);
        if text.is_empty() {
            continue;
        }
        let Some(verse) = VERSE_MARKER.captures(&text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let verse = verse.as_str().to_string();
        out.push(VerseRecord {
            document_id: document_id.to_string(),
            chapter: chapter.to_string(),
            verse,
            text,
            page_index,
            raw_span: raw.to_string(),
        });
    }
}
