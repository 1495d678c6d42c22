//! Filesystem document source: one file per book under a corpus root.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use scripture_search_core::loader::{DocumentSource, LoadError};

pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<id>`, or `None` when the id would leave the root.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let relative = Path::new(id);
        let plain = relative.components().count() == 1
            && matches!(relative.components().next(), Some(Component::Normal(_)));
        plain.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl DocumentSource for FsSource {
    async fn fetch(&self, id: &str) -> Result<Option<String>, LoadError> {
        let Some(path) = self.path_for(id) else {
            tracing::warn!(document = id, "rejecting document id outside corpus root");
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoadError::other(id, format!("{}: {}", path.display(), e))),
        }
    }
}
