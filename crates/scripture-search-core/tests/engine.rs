//! End-to-end query tests against an in-memory corpus.

use std::sync::Arc;

use scripture_search_core::engine::{Query, QueryEngine, QueryError, QueryOutcome};
use scripture_search_core::highlight::Highlighter;
use scripture_search_core::loader::{CachedLoader, MemorySource};
use scripture_search_core::registry::{Book, BookRegistry};

const MATHIU: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Mathiu</title></head>
<body>
<div id="pages-container">
  <div class="page active">
    <p><b>10.</b><br>
    12* Verse twelve<br>
    13* Verse thirteen<br>
    14* Verse fourteen</p>
    <p>15* Verse fifteen<br>16* Verse sixteen</p>
  </div>
  <div class="page">
    <p><b>11</b><br>13* Other chapter thirteen</p>
  </div>
</div>
</body>
</html>"#;

fn page(body: &str) -> String {
    format!(r#"<html><body><div class="page">{body}</div></body></html>"#)
}

fn engine(source: MemorySource, books: Vec<Book>) -> QueryEngine<CachedLoader<MemorySource>> {
    let registry = Arc::new(BookRegistry::new(books).unwrap());
    QueryEngine::new(registry, CachedLoader::new(source))
}

#[tokio::test]
async fn citation_lookup_returns_requested_range() {
    let engine = engine(
        MemorySource::new().with_document("Mathiu.html", MATHIU),
        vec![Book::new("Mathiu.html", &["mathiu"])],
    );

    let outcome = engine.query("Mathiu 10:13-15").await.unwrap();
    let QueryOutcome::Passage { citation, verses } = outcome else {
        panic!("expected a passage");
    };
    assert_eq!(citation.to_string(), "Mathiu 10:13-15");
    let numbers: Vec<&str> = verses.iter().map(|v| v.verse.as_str()).collect();
    assert_eq!(numbers, vec!["13", "14", "15"]);
    assert!(verses.iter().all(|v| v.chapter == "10"));
    assert_eq!(verses[0].text, "13* Verse thirteen");
}

#[tokio::test]
async fn lookup_compares_verses_numerically() {
    let doc = page("<p><b>1</b><br>2* two<br>9* nine<br>10* ten<br>11* eleven</p>");
    let engine = engine(
        MemorySource::new().with_document("A.html", &doc),
        vec![Book::new("A.html", &["a"])],
    );
    let QueryOutcome::Passage { verses, .. } = engine.query("a 1:9-10").await.unwrap() else {
        panic!("expected a passage");
    };
    let numbers: Vec<&str> = verses.iter().map(|v| v.verse.as_str()).collect();
    assert_eq!(numbers, vec!["9", "10"]);
}

#[tokio::test]
async fn lookup_with_no_matching_verses_is_empty_not_error() {
    let engine = engine(
        MemorySource::new().with_document("Mathiu.html", MATHIU),
        vec![Book::new("Mathiu.html", &["mathiu"])],
    );
    let outcome = engine.query("mathiu 10:40-42").await.unwrap();
    assert!(matches!(outcome, QueryOutcome::Passage { ref verses, .. } if verses.is_empty()));
}

#[tokio::test]
async fn keyword_search_skips_documents_without_matches() {
    let first = page("<p><b>1</b><br>1* Faith and hope</p>");
    let second = page("<p><b>4</b><br>7* Beloved, let us LOVE one another<br>8* God is love</p>");
    let engine = engine(
        MemorySource::new()
            .with_document("First.html", &first)
            .with_document("Second.html", &second),
        vec![
            Book::new("First.html", &["first"]),
            Book::new("Second.html", &["second"]),
        ],
    );

    let QueryOutcome::Keyword { term, results } = engine.query("love").await.unwrap() else {
        panic!("expected keyword results");
    };
    assert_eq!(term, "love");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.document_id == "Second.html"));
    assert_eq!(results[0].display_name, "Second");
    assert_eq!(
        results[1].highlighted_text,
        r#"8* God is <span class="highlight">love</span>"#
    );
}

#[tokio::test]
async fn keyword_search_single_hit_in_second_document() {
    let first = page("<p><b>1</b><br>1* Faith and hope</p>");
    let second = page("<p><b>2</b><br>3* Love endures</p>");
    let engine = engine(
        MemorySource::new()
            .with_document("First.html", &first)
            .with_document("Second.html", &second),
        vec![
            Book::new("First.html", &["first"]),
            Book::new("Second.html", &["second"]),
        ],
    );
    let results = engine.search("love").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document_id, "Second.html");
}

#[tokio::test]
async fn keyword_results_follow_corpus_order() {
    let doc = |word: &str| page(&format!("<p><b>1</b><br>1* {word} light</p>"));
    let books = vec![
        Book::new("C.html", &[]),
        Book::new("A.html", &[]),
        Book::new("B.html", &[]),
    ];
    let engine = engine(
        MemorySource::new()
            .with_document("A.html", &doc("a"))
            .with_document("B.html", &doc("b"))
            .with_document("C.html", &doc("c")),
        books,
    )
    .with_max_concurrent_loads(3);

    let ids: Vec<String> = engine
        .search("LIGHT")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.document_id)
        .collect();
    assert_eq!(ids, vec!["C.html", "A.html", "B.html"]);
}

#[tokio::test]
async fn keyword_search_survives_failing_documents() {
    let good = page("<p><b>1</b><br>1* grace abounds</p>");
    let source = MemorySource::new()
        .with_document("Good.html", &good)
        .with_document("Broken.html", &good);
    source.fail("Broken.html", "timeout");
    let engine = engine(
        source,
        vec![
            Book::new("Missing.html", &[]),
            Book::new("Broken.html", &[]),
            Book::new("Good.html", &[]),
        ],
    );

    let results = engine.search("grace").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document_id, "Good.html");
}

#[tokio::test]
async fn keyword_search_reads_past_malformed_markup() {
    let good = |word: &str| page(&format!("<p><b>1</b><br>1* {word} mercy</p>"));
    let messy = page(
        "<p><b>2</b><br>1* mercy <3 and truth<br>2* x <! odd<br>3* y</p><p>4* mercy again</p>",
    ) + "<!-- never closed";
    let engine = engine(
        MemorySource::new()
            .with_document("A.html", &good("first"))
            .with_document("Messy.html", &messy)
            .with_document("B.html", &good("last")),
        vec![
            Book::new("A.html", &[]),
            Book::new("Messy.html", &[]),
            Book::new("B.html", &[]),
        ],
    );

    let hits: Vec<(String, String)> = engine
        .search("mercy")
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.document_id, r.verse))
        .collect();
    let expected = [
        ("A.html", "1"),
        ("Messy.html", "1"),
        ("Messy.html", "4"),
        ("B.html", "1"),
    ];
    assert_eq!(
        hits,
        expected
            .iter()
            .map(|(d, v)| (d.to_string(), v.to_string()))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn keyword_search_has_no_false_negatives() {
    let doc = page(
        "<p><b>1</b><br>1* Peace be with you<br>2* no match<br>3* PEACEMAKERS<br>4* un-peaceful</p>",
    );
    let engine = engine(
        MemorySource::new().with_document("A.html", &doc),
        vec![Book::new("A.html", &[])],
    );
    let results = engine.search("peace").await.unwrap();
    let verses: Vec<&str> = results.iter().map(|r| r.verse.as_str()).collect();
    assert_eq!(verses, vec!["1", "3", "4"]);
    for r in &results {
        assert!(r.text.to_lowercase().contains("peace"));
    }
}

#[tokio::test]
async fn unregistered_citation_becomes_keyword_query() {
    let doc = page("<p><b>1</b><br>1* see Genesis 1:1 for more</p>");
    let engine = engine(
        MemorySource::new().with_document("A.html", &doc),
        vec![Book::new("A.html", &["a"])],
    );
    let outcome = engine.query("Genesis 1:1").await.unwrap();
    let QueryOutcome::Keyword { term, results } = outcome else {
        panic!("expected fallback to keyword search");
    };
    assert_eq!(term, "Genesis 1:1");
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn custom_highlighter_escapes_term() {
    let doc = page("<p><b>1</b><br>1* a &lt;b&gt; tag</p>");
    let engine = engine(
        MemorySource::new().with_document("A.html", &doc),
        vec![Book::new("A.html", &[])],
    )
    .with_highlighter(Highlighter::new("[[", "]]"));
    let results = engine.search("<b>").await.unwrap();
    assert_eq!(results[0].text, "1* a <b> tag");
    assert_eq!(results[0].highlighted_text, "1* a [[&lt;b&gt;]] tag");
}

#[tokio::test]
async fn documents_are_loaded_once_across_queries() {
    let source = MemorySource::new().with_document("Mathiu.html", MATHIU);
    let engine = engine(source, vec![Book::new("Mathiu.html", &["mathiu"])]);

    engine.query("mathiu 10:12").await.unwrap();
    engine.query("verse").await.unwrap();
    engine.query("mathiu 11:13").await.unwrap();

    assert_eq!(engine.loader().source().fetch_count("Mathiu.html"), 1);
}

#[tokio::test]
async fn blank_input_is_rejected_before_loading() {
    let source = MemorySource::new().with_document("Mathiu.html", MATHIU);
    let engine = engine(source, vec![Book::new("Mathiu.html", &["mathiu"])]);

    let err = engine.query("   ").await.unwrap_err();
    assert!(matches!(err, QueryError::InvalidQuery(_)));
    assert_eq!(engine.loader().source().fetch_count("Mathiu.html"), 0);
}

#[tokio::test]
async fn transient_failure_on_cited_book_is_an_error() {
    let source = MemorySource::new().with_document("Mathiu.html", MATHIU);
    source.fail("Mathiu.html", "connection reset");
    let engine = engine(source, vec![Book::new("Mathiu.html", &["mathiu"])]);

    let err = engine.query("mathiu 10:13").await.unwrap_err();
    assert!(matches!(err, QueryError::Load(_)));
}

#[test]
fn parse_classifies_without_loading() {
    let registry = BookRegistry::builtin();
    assert!(matches!(
        Query::parse("Luke 2:1-7", &registry).unwrap(),
        Query::Citation(_)
    ));
    assert!(matches!(
        Query::parse("shepherds", &registry).unwrap(),
        Query::Keyword(_)
    ));
}
