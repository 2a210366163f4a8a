//! Filesystem cache backend

use crate::{CacheEngine, CacheError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Stores every key as a file below a root directory
///
/// Keys use `/` as segment separator; intermediate directories are created
/// on demand.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its file, rejecting keys that escape the root
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Remove every entry below the root; returns the number of files removed
    pub async fn clear(&self) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    pending.push(entry.path());
                } else {
                    removed += 1;
                }
            }
        }

        tokio::fs::remove_dir_all(&self.root).await?;
        tokio::fs::create_dir_all(&self.root).await?;
        debug!("cleared {} cache entries under {:?}", removed, self.root);
        Ok(removed)
    }
}

#[async_trait]
impl CacheEngine for FileCache {
    async fn get(&self, key: &str) -> Result<String> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                trace!("cache read {:?}", path);
                Ok(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn has(&self, key: &str) -> Result<bool> {
        let path = self.key_path(key)?;
        Ok(tokio::fs::try_exists(&path).await? && path.is_file())
    }

    async fn set(&self, key: &str, content: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        trace!("cache write {:?} ({} bytes)", path, content.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
