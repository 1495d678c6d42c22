use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use scripture_search_core::highlight::{DEFAULT_CLOSE, DEFAULT_OPEN};
use scripture_search_core::registry::{display_name_for, Book, BookRegistry};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub books: Vec<BookConfig>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Filesystem,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_concurrent_loads")]
    pub max_concurrent_loads: usize,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    #[serde(default = "default_highlight_open")]
    pub highlight_open: String,
    #[serde(default = "default_highlight_close")]
    pub highlight_close: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: default_max_concurrent_loads(),
            snippet_chars: default_snippet_chars(),
            highlight_open: default_highlight_open(),
            highlight_close: default_highlight_close(),
        }
    }
}

fn default_max_concurrent_loads() -> usize {
    4
}
fn default_snippet_chars() -> usize {
    250
}
fn default_highlight_open() -> String {
    DEFAULT_OPEN.to_string()
}
fn default_highlight_close() -> String {
    DEFAULT_CLOSE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Config {
    /// Book registry from `[[books]]`, or the built-in table when none are
    /// configured.
    pub fn registry(&self) -> Result<BookRegistry> {
        if self.books.is_empty() {
            return Ok(BookRegistry::builtin());
        }
        let books = self
            .books
            .iter()
            .map(|b| Book {
                id: b.id.clone(),
                name: b
                    .name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| display_name_for(&b.id)),
                aliases: b.aliases.clone(),
            })
            .collect();
        BookRegistry::new(books).context("Invalid [[books]] table")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative corpus roots are resolved against the config file's directory
    if let Some(root) = config.corpus.root.as_mut() {
        if root.is_relative() {
            if let Some(dir) = path.parent() {
                *root = dir.join(&*root);
            }
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.corpus.source {
        SourceKind::Filesystem => {
            if config.corpus.root.is_none() {
                bail!("corpus.root must be set when corpus.source is 'filesystem'");
            }
        }
        SourceKind::Http => match config.corpus.base_url.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
            Some(url) => bail!("corpus.base_url must be an http(s) URL, got '{}'", url),
            None => bail!("corpus.base_url must be set when corpus.source is 'http'"),
        },
    }

    if config.corpus.timeout_secs == 0 {
        bail!("corpus.timeout_secs must be > 0");
    }
    if config.search.max_concurrent_loads == 0 {
        bail!("search.max_concurrent_loads must be >= 1");
    }
    if config.search.snippet_chars == 0 {
        bail!("search.snippet_chars must be >= 1");
    }
    if config.search.highlight_open.is_empty() || config.search.highlight_close.is_empty() {
        bail!("search.highlight_open and search.highlight_close must not be empty");
    }

    config.registry()?;
    Ok(())
}
