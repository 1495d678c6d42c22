//! Query engine: citation lookup over one book, keyword search over all of
//! them.
//!
//! Every query is independent. The only state that outlives a query is the
//! loader's document cache.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::citation;
use crate::extract;
use crate::highlight::{self, Highlighter};
use crate::loader::{DocumentLoader, LoadError};
use crate::markup::{self, MarkupError};
use crate::models::{Citation, SearchResult, VerseRecord};
use crate::registry::BookRegistry;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query or Bible reference";

const DEFAULT_MAX_CONCURRENT_LOADS: usize = 4;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Blank input, rejected before any document is touched.
    #[error("{0}")]
    InvalidQuery(String),
    #[error("document not found: {0}")]
    DocumentNotFound(String),
    #[error(transparent)]
    Load(LoadError),
    #[error("failed to read {document}: {source}")]
    Markup {
        document: String,
        #[source]
        source: MarkupError,
    },
}

impl From<LoadError> for QueryError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(id) => QueryError::DocumentNotFound(id),
            other => QueryError::Load(other),
        }
    }
}

/// A validated query: either a citation or a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Citation(Citation),
    Keyword(String),
}

impl Query {
    /// Classifies raw user input. Blank input is an [`QueryError::InvalidQuery`].
    pub fn parse(input: &str, registry: &BookRegistry) -> Result<Self, QueryError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QueryError::InvalidQuery(EMPTY_QUERY_MESSAGE.to_string()));
        }
        Ok(match citation::parse(trimmed, registry) {
            Some(c) => Query::Citation(c),
            None => Query::Keyword(trimmed.to_string()),
        })
    }
}

/// What a query produced. Empty `verses` / `results` are valid outcomes.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Passage {
        citation: Citation,
        verses: Vec<VerseRecord>,
    },
    BookNotFound {
        citation: Citation,
    },
    Keyword {
        term: String,
        results: Vec<SearchResult>,
    },
}

impl QueryOutcome {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryOutcome::Passage { verses, .. } => verses.is_empty(),
            QueryOutcome::BookNotFound { .. } => true,
            QueryOutcome::Keyword { results, .. } => results.is_empty(),
        }
    }
}

/// A page container's markup, for showing a verse in context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub document_id: String,
    pub display_name: String,
    pub page_index: usize,
    pub paragraphs: Vec<PageParagraph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParagraph {
    /// Inner markup of the `<p>`.
    pub raw: String,
    /// Tag-stripped, non-empty lines.
    pub lines: Vec<String>,
}

pub struct QueryEngine<L> {
    registry: Arc<BookRegistry>,
    loader: L,
    highlighter: Highlighter,
    max_concurrent_loads: usize,
}

impl<L: DocumentLoader> QueryEngine<L> {
    pub fn new(registry: Arc<BookRegistry>, loader: L) -> Self {
        Self {
            registry,
            loader,
            highlighter: Highlighter::default(),
            max_concurrent_loads: DEFAULT_MAX_CONCURRENT_LOADS,
        }
    }

    pub fn with_highlighter(mut self, highlighter: Highlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Number of documents keyword search loads at once. Clamped to at least 1.
    pub fn with_max_concurrent_loads(mut self, n: usize) -> Self {
        self.max_concurrent_loads = n.max(1);
        self
    }

    pub fn registry(&self) -> &BookRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Parses and runs `input`: the single query entry point.
    pub async fn query(&self, input: &str) -> Result<QueryOutcome, QueryError> {
        let query = Query::parse(input, &self.registry)?;
        self.run(query).await
    }

    pub async fn run(&self, query: Query) -> Result<QueryOutcome, QueryError> {
        match query {
            Query::Citation(citation) => match self.lookup(&citation).await {
                Ok(verses) => Ok(QueryOutcome::Passage { citation, verses }),
                Err(QueryError::DocumentNotFound(id)) => {
                    tracing::warn!(document = %id, "cited book could not be loaded");
                    Ok(QueryOutcome::BookNotFound { citation })
                }
                Err(e) => Err(e),
            },
            Query::Keyword(term) => {
                let results = self.search(&term).await?;
                Ok(QueryOutcome::Keyword { term, results })
            }
        }
    }

    /// Verses of `citation`, in document order.
    pub async fn lookup(&self, citation: &Citation) -> Result<Vec<VerseRecord>, QueryError> {
        let markup = self.loader.load(&citation.document_id).await?;
        let chapter = citation.chapter_label();
        let verses = extract::extract(&citation.document_id, &markup, Some(&chapter))
            .map_err(|source| QueryError::Markup {
                document: citation.document_id.clone(),
                source,
            })?;

        Ok(verses
            .into_iter()
            .filter(|v| v.verse_number().is_some_and(|n| citation.contains_verse(n)))
            .collect())
    }

    /// Case-insensitive substring search over every book, in corpus order.
    ///
    /// A book that fails to load or parse is logged and skipped.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchResult>, QueryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(QueryError::InvalidQuery(EMPTY_QUERY_MESSAGE.to_string()));
        }

        let loads = stream::iter(self.registry.corpus())
            .map(|book| async move { (book, self.loader.load(&book.id).await) })
            .buffered(self.max_concurrent_loads)
            .collect::<Vec<_>>()
            .await;

        let mut results = Vec::new();
        for (book, loaded) in loads {
            let markup = match loaded {
                Ok(markup) => markup,
                Err(LoadError::NotFound(_)) => {
                    tracing::debug!(document = %book.id, "skipping missing document");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(document = %book.id, error = %e, "skipping document");
                    continue;
                }
            };
            let verses = match extract::extract(&book.id, &markup, None) {
                Ok(verses) => verses,
                Err(e) => {
                    tracing::warn!(document = %book.id, error = %e, "skipping unreadable document");
                    continue;
                }
            };

            results.extend(
                verses
                    .into_iter()
                    .filter(|v| highlight::contains(&v.text, term))
                    .map(|v| SearchResult {
                        highlighted_text: self.highlighter.highlight(&v.text, term),
                        document_id: v.document_id,
                        display_name: book.name.clone(),
                        chapter: v.chapter,
                        verse: v.verse,
                        page_index: v.page_index,
                        text: v.text,
                    }),
            );
        }

        tracing::debug!(term, hits = results.len(), "keyword search finished");
        Ok(results)
    }

    /// The page at `page_index` of a document, for context display.
    pub async fn page(
        &self,
        document_id: &str,
        page_index: usize,
    ) -> Result<Option<PageView>, QueryError> {
        let markup = self.loader.load(document_id).await?;
        let page = markup::page(&markup, page_index).map_err(|source| QueryError::Markup {
            document: document_id.to_string(),
            source,
        })?;

        let display_name = self
            .registry
            .book(document_id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| crate::registry::display_name_for(document_id));

        Ok(page.map(|page| PageView {
            document_id: document_id.to_string(),
            display_name,
            page_index: page.index,
            paragraphs: page
                .paragraphs
                .iter()
                .map(|p| PageParagraph {
                    raw: p.raw.to_string(),
                    lines: p.text_lines(),
                })
                .collect(),
        }))
    }
}
