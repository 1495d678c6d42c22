//! # Scripture Search
//!
//! Citation lookup and keyword search over a fixed corpus of marked-up
//! scripture documents, one per book.
//!
//! The pure pieces (book registry, citation parsing, verse extraction,
//! highlighting, the document cache and the query engine) live in
//! [`scripture_search_core`]. This crate adds what touches the outside world:
//! configuration, the filesystem and HTTP document sources, and the `verse`
//! command-line front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ FsSource /   │──▶│ CachedLoader │──▶│ QueryEngine  │
//! │ HttpSource   │   │  (OnceCell)  │   │ cite / search│
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!                                              ▼
//!                                        ┌──────────┐
//!                                        │   CLI    │
//!                                        │ (verse)  │
//!                                        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! verse search "Mathiu 10:13-15"
//! verse search "love" --json
//! verse page mathiu 3
//! verse books --check
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Engine construction from config |
//! | [`source_fs`] | Filesystem document source |
//! | [`source_http`] | HTTP document source |
//! | [`search`] | `verse search` and result rendering |
//! | [`page`] | `verse page` context view |
//! | [`books`] | `verse books` listing and health check |

pub mod books;
pub mod config;
pub mod corpus;
pub mod page;
pub mod search;
pub mod source_fs;
pub mod source_http;
