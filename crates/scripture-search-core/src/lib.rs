//! # Scripture Search Core
//!
//! Pure indexing and query logic for a marked-up scripture corpus: the book
//! registry, the citation parser, the verse extractor, match highlighting, the
//! document loader contract and the query engine.
//!
//! This crate performs no filesystem or network I/O. Raw documents come in
//! through the [`loader::DocumentSource`] trait, implemented by the
//! application crate (filesystem, HTTP) and by [`loader::MemorySource`] for
//! tests.
//!
//! ## Data Flow
//!
//! ```text
//! query ──▶ Query::parse ──┬─▶ Citation ──▶ lookup ──▶ Vec<VerseRecord>
//!                          │
//!                          └─▶ keyword ───▶ search ──▶ Vec<SearchResult>
//!
//! lookup / search ──▶ DocumentLoader ──▶ markup::pages ──▶ extract::extract
//! ```

pub mod citation;
pub mod engine;
pub mod extract;
pub mod highlight;
pub mod loader;
pub mod markup;
pub mod models;
pub mod registry;
