//! Key-value cache and prompt/answer memoization
//!
//! [`CacheEngine`] is the storage contract. [`PromptCache`] derives
//! deterministic keys from the agent name, the call index and a hash of the
//! prompt, so an identical run replays from storage instead of the service.

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;
pub mod prompt;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use prompt::{content_hash, CacheKind, PromptCache};

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache key not found: {0}")]
    NotFound(String),

    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Storage contract shared by every cache backend
///
/// `get` on an absent key fails with [`CacheError::NotFound`]; a present key
/// holding an empty string returns `Ok(String::new())`.
#[async_trait]
pub trait CacheEngine: Send + Sync {
    async fn get(&self, key: &str) -> Result<String>;
    async fn has(&self, key: &str) -> Result<bool>;
    async fn set(&self, key: &str, content: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}
