//! `verse search`: runs one query and renders the outcome for the terminal or
//! as JSON.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

use scripture_search_core::engine::{QueryError, QueryOutcome};
use scripture_search_core::models::{Citation, SearchResult, VerseRecord};

use crate::config::{Config, SearchConfig};
use crate::corpus;

pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

/// Returns `false` when the query was rejected or failed; the caller maps that
/// to a non-zero exit status.
pub async fn run_search(config: &Config, query: &str, json: bool) -> Result<bool> {
    let engine = corpus::open(config)?;

    let outcome = match engine.query(query).await {
        Ok(outcome) => outcome,
        Err(QueryError::InvalidQuery(message)) => {
            eprintln!("{}", message);
            return Ok(false);
        }
        Err(e) => {
            tracing::error!(error = %e, query, "search failed");
            eprintln!("{}", SEARCH_FAILED_MESSAGE);
            return Ok(false);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&JsonOutcome::from(&outcome))?);
    } else {
        print!("{}", render_outcome(&outcome, &config.search));
    }
    Ok(true)
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonOutcome<'a> {
    Passage {
        citation: &'a Citation,
        reference: String,
        verses: &'a [VerseRecord],
    },
    BookNotFound {
        citation: &'a Citation,
    },
    Keyword {
        term: &'a str,
        results: &'a [SearchResult],
    },
}

impl<'a> From<&'a QueryOutcome> for JsonOutcome<'a> {
    fn from(outcome: &'a QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Passage { citation, verses } => JsonOutcome::Passage {
                citation,
                reference: citation.to_string(),
                verses,
            },
            QueryOutcome::BookNotFound { citation } => JsonOutcome::BookNotFound { citation },
            QueryOutcome::Keyword { term, results } => JsonOutcome::Keyword { term, results },
        }
    }
}

pub fn render_outcome(outcome: &QueryOutcome, search: &SearchConfig) -> String {
    let mut out = String::new();
    match outcome {
        QueryOutcome::BookNotFound { citation } => {
            let _ = writeln!(out, "Book \"{}\" not found", citation.display_name);
        }
        QueryOutcome::Passage { citation, verses } if verses.is_empty() => {
            let _ = writeln!(out, "No verses found for {}", citation);
        }
        QueryOutcome::Passage { citation, verses } => {
            let _ = writeln!(
                out,
                "Found {} {} for {}",
                verses.len(),
                plural(verses.len(), "verse"),
                citation
            );
            for v in verses {
                push_entry(
                    &mut out,
                    &citation.display_name,
                    &v.chapter,
                    &v.verse,
                    &v.text,
                    search.snippet_chars,
                );
            }
        }
        QueryOutcome::Keyword { term, results } if results.is_empty() => {
            let _ = writeln!(out, "No results found for \"{}\"", term);
        }
        QueryOutcome::Keyword { term, results } => {
            let _ = writeln!(
                out,
                "Found {} {} for \"{}\"",
                results.len(),
                plural(results.len(), "result"),
                term
            );
            for r in results {
                push_entry(
                    &mut out,
                    &r.display_name,
                    &r.chapter,
                    &r.verse,
                    &r.text,
                    search.snippet_chars,
                );
            }
        }
    }
    out
}

fn push_entry(out: &mut String, book: &str, chapter: &str, verse: &str, text: &str, max: usize) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{} {}:{}", book, chapter, verse);
    let _ = writeln!(out, "    Chapter {} · Verse {}", chapter, verse);
    let _ = writeln!(out, "    {}", snippet(text, max));
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// First `max` characters of `text`.
fn snippet(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
