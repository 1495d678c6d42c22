//! Builds a [`QueryEngine`] from configuration.

use anyhow::{Context, Result};
use std::sync::Arc;

use scripture_search_core::engine::QueryEngine;
use scripture_search_core::highlight::Highlighter;
use scripture_search_core::loader::{CachedLoader, DocumentSource};

use crate::config::{Config, SourceKind};
use crate::source_fs::FsSource;
use crate::source_http::HttpSource;

pub type Engine = QueryEngine<CachedLoader<Box<dyn DocumentSource>>>;

pub fn open(config: &Config) -> Result<Engine> {
    let registry = Arc::new(config.registry()?);
    let source = source(config)?;

    Ok(QueryEngine::new(registry, CachedLoader::new(source))
        .with_highlighter(Highlighter::new(
            config.search.highlight_open.as_str(),
            config.search.highlight_close.as_str(),
        ))
        .with_max_concurrent_loads(config.search.max_concurrent_loads))
}

fn source(config: &Config) -> Result<Box<dyn DocumentSource>> {
    match config.corpus.source {
        SourceKind::Filesystem => {
            let root = config
                .corpus
                .root
                .clone()
                .context("corpus.root must be set when corpus.source is 'filesystem'")?;
            tracing::debug!(root = %root.display(), "using filesystem corpus");
            Ok(Box::new(FsSource::new(root)))
        }
        SourceKind::Http => {
            let base_url = config
                .corpus
                .base_url
                .as_deref()
                .context("corpus.base_url must be set when corpus.source is 'http'")?;
            tracing::debug!(base_url, "using http corpus");
            let source = HttpSource::new(base_url, config.corpus.timeout_secs)
                .context("Failed to build HTTP client")?;
            Ok(Box::new(source))
        }
    }
}
