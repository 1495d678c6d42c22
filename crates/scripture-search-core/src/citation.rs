//! Citation parser: `"<book> <chapter>:<verse>[-<verse>]"` to [`Citation`].
//!
//! A string that does not match the grammar, or that names a book the
//! registry does not know, is not an error. The caller falls back to a
//! keyword search over the whole input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Citation;
use crate::registry::BookRegistry;

static CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9,&\s]+?)\s+([0-9]+):([0-9]+)(?:-([0-9]+))?$")
        .expect("citation pattern is valid")
});

/// Parses `query` against `registry`. `None` means "not a citation".
pub fn parse(query: &str, registry: &BookRegistry) -> Option<Citation> {
    let caps = CITATION.captures(query.trim())?;

    let book_input = caps.get(1)?.as_str();
    let chapter: u32 = caps.get(2)?.as_str().parse().ok()?;
    let verse_start: u32 = caps.get(3)?.as_str().parse().ok()?;
    let verse_end: u32 = match caps.get(4) {
        Some(m) => m.as_str().parse().ok()?,
        None => verse_start,
    };

    let Some(book) = registry.resolve(book_input) else {
        tracing::warn!(book = %book_input.trim(), "book not found in registry");
        return None;
    };

    Some(Citation {
        document_id: book.id.clone(),
        display_name: book.name.clone(),
        chapter,
        verse_start: verse_start.min(verse_end),
        verse_end: verse_start.max(verse_end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BookRegistry {
        BookRegistry::builtin()
    }

    #[test]
    fn parses_range() {
        let c = parse("Mathiu 10:13-15", &registry()).unwrap();
        assert_eq!(c.document_id, "Mathiu.html");
        assert_eq!(c.display_name, "Mathiu");
        assert_eq!(c.chapter, 10);
        assert_eq!((c.verse_start, c.verse_end), (13, 15));
    }

    #[test]
    fn single_verse_sets_end_to_start() {
        let c = parse("mark 3:16", &registry()).unwrap();
        assert_eq!(c.document_id, "Mark.html");
        assert_eq!((c.verse_start, c.verse_end), (16, 16));
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        let c = parse("   Luke   2:1-3  ", &registry()).unwrap();
        assert_eq!(c.document_id, "Luk.html");
        assert_eq!(c.chapter, 2);
    }

    #[test]
    fn book_name_with_digits_and_punctuation() {
        let c = parse("John1,2&3 1:9", &registry()).unwrap();
        assert_eq!(c.document_id, "John1,2&3.html");
        assert_eq!(c.display_name, "John1,2&3");
    }

    #[test]
    fn reversed_range_is_swapped() {
        let c = parse("Mark 3:18-16", &registry()).unwrap();
        assert_eq!((c.verse_start, c.verse_end), (16, 18));
    }

    #[test]
    fn leading_zero_chapter_is_canonical() {
        let c = parse("Mark 03:5", &registry()).unwrap();
        assert_eq!(c.chapter_label(), "3");
    }

    #[test]
    fn unknown_book_is_not_a_citation() {
        assert!(parse("Genesis 1:1", &registry()).is_none());
        assert!(parse("123 4:5", &registry()).is_none());
    }

    #[test]
    fn grammar_failures_are_not_citations() {
        let r = registry();
        for input in [
            "love",
            "Mathiu 10",
            "Mathiu 10:",
            "Mathiu:10:13",
            "Mathiu 10:13-",
            "Mathiu 10:13-15 extra",
            "Mathiu10:13",
            "Mathiu 10:a",
            "",
        ] {
            assert!(parse(input, &r).is_none(), "{input:?} parsed");
        }
    }

    #[test]
    fn overflowing_numbers_are_not_citations() {
        assert!(parse("Mark 99999999999:1", &registry()).is_none());
    }

    #[test]
    fn end_never_before_start() {
        let r = registry();
        for input in ["Rom 1:1", "Rom 1:2-9", "Rom 1:9-2", "Titus 3:4-4"] {
            let c = parse(input, &r).unwrap();
            assert!(c.verse_end >= c.verse_start, "{input}");
        }
    }
}
