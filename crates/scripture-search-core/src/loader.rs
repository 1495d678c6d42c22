//! Document loading: the source trait, the write-once cache and an in-memory
//! source for tests.
//!
//! A [`DocumentSource`] knows how to fetch raw markup for an id (from disk,
//! over HTTP, from memory). [`CachedLoader`] wraps a source and keeps every
//! successful load for the life of the loader. Each id owns its own
//! `OnceCell`, so loads of different ids never wait on each other and
//! concurrent loads of the same id share one fetch. Failures leave the cell
//! empty and the next query tries again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("failed to load {id}: {message}")]
    Source { id: String, message: String },
}

impl LoadError {
    pub fn other(id: &str, err: impl std::fmt::Display) -> Self {
        LoadError::Source {
            id: id.to_string(),
            message: err.to_string(),
        }
    }
}

/// Where raw markup comes from. `Ok(None)` means the document does not exist.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Option<String>, LoadError>;
}

#[async_trait]
impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    async fn fetch(&self, id: &str) -> Result<Option<String>, LoadError> {
        (**self).fetch(id).await
    }
}

/// Loads raw markup by document id.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, id: &str) -> Result<Arc<str>, LoadError>;
}

#[async_trait]
impl<L: DocumentLoader + ?Sized> DocumentLoader for Arc<L> {
    async fn load(&self, id: &str) -> Result<Arc<str>, LoadError> {
        (**self).load(id).await
    }
}

/// Memoizing [`DocumentLoader`] over any [`DocumentSource`].
pub struct CachedLoader<S> {
    source: S,
    slots: Mutex<HashMap<String, Arc<OnceCell<Arc<str>>>>>,
}

impl<S: DocumentSource> CachedLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether `id` has been loaded successfully.
    pub fn is_cached(&self, id: &str) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.get(id).is_some_and(|slot| slot.initialized()))
            .unwrap_or(false)
    }

    fn slot(&self, id: &str) -> Arc<OnceCell<Arc<str>>> {
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.entry(id.to_string()).or_default().clone()
    }
}

#[async_trait]
impl<S: DocumentSource> DocumentLoader for CachedLoader<S> {
    async fn load(&self, id: &str) -> Result<Arc<str>, LoadError> {
        let slot = self.slot(id);
        let markup = slot
            .get_or_try_init(|| async {
                tracing::debug!(document = id, "loading document");
                match self.source.fetch(id).await {
                    Ok(Some(body)) => Ok(Arc::<str>::from(body)),
                    Ok(None) => Err(LoadError::NotFound(id.to_string())),
                    Err(e) => Err(e),
                }
            })
            .await?;
        Ok(Arc::clone(markup))
    }
}

/// In-memory [`DocumentSource`] for tests. Counts fetches per id.
#[derive(Default)]
pub struct MemorySource {
    docs: RwLock<HashMap<String, String>>,
    failing: RwLock<HashMap<String, String>>,
    fetches: RwLock<HashMap<String, Arc<AtomicUsize>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, id: &str, markup: &str) -> Self {
        self.insert(id, markup);
        self
    }

    pub fn insert(&self, id: &str, markup: &str) {
        if let Ok(mut docs) = self.docs.write() {
            docs.insert(id.to_string(), markup.to_string());
        }
    }

    /// Makes every fetch of `id` fail with a source error until cleared.
    pub fn fail(&self, id: &str, message: &str) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(id.to_string(), message.to_string());
        }
    }

    pub fn clear_failure(&self, id: &str) {
        if let Ok(mut failing) = self.failing.write() {
            failing.remove(id);
        }
    }

    pub fn fetch_count(&self, id: &str) -> usize {
        self.fetches
            .read()
            .ok()
            .and_then(|f| f.get(id).map(|c| c.load(Ordering::SeqCst)))
            .unwrap_or(0)
    }

    fn record_fetch(&self, id: &str) {
        if let Ok(mut fetches) = self.fetches.write() {
            fetches
                .entry(id.to_string())
                .or_default()
                .fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, id: &str) -> Result<Option<String>, LoadError> {
        self.record_fetch(id);
        let failure = self.failing.read().ok().and_then(|f| f.get(id).cloned());
        if let Some(message) = failure {
            return Err(LoadError::other(id, message));
        }
        Ok(self.docs.read().ok().and_then(|d| d.get(id).cloned()))
    }
}
