//! Prompt/answer memoization on top of a [`CacheEngine`]

use crate::{CacheEngine, CacheError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Length of the hash segment in a cache key
pub const HASH_LENGTH: usize = 10;

/// Which side of a completion call a key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Prompt,
    Answer,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::Prompt => write!(f, "prompt"),
            CacheKind::Answer => write!(f, "answer"),
        }
    }
}

/// First [`HASH_LENGTH`] hex characters of the SHA-256 of `text`
pub fn content_hash(text: &str) -> String {
    let digest = hex::encode(Sha256::digest(text.as_bytes()));
    digest[..HASH_LENGTH].to_string()
}

/// Read-through/write-through cache of completion calls
///
/// Both keys of a call hash the prompt text, so the answer can be looked up
/// before the service is asked.
#[derive(Clone, Default)]
pub struct PromptCache {
    engine: Option<Arc<dyn CacheEngine>>,
}

impl PromptCache {
    pub fn new(engine: Arc<dyn CacheEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// A cache that never hits and never stores
    pub fn disabled() -> Self {
        Self { engine: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    /// `{agent}/{step}-{hash}-{kind}.txt`
    pub fn cache_key(agent_name: &str, step: usize, prompt: &str, kind: CacheKind) -> String {
        format!("{}/{}-{}-{}.txt", agent_name, step, content_hash(prompt), kind)
    }

    /// Cached answer for this call, if any
    ///
    /// Only the answer key counts; a stored prompt alone is a miss.
    pub async fn get(&self, agent_name: &str, step: usize, prompt: &str) -> Result<Option<String>> {
        let Some(engine) = &self.engine else {
            return Ok(None);
        };

        let key = Self::cache_key(agent_name, step, prompt, CacheKind::Answer);
        match engine.get(&key).await {
            Ok(answer) => {
                debug!("cache hit {}", key);
                Ok(Some(answer))
            }
            Err(CacheError::NotFound(_)) => {
                trace!("cache miss {}", key);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Store the prompt side only
    pub async fn save_prompt(&self, agent_name: &str, step: usize, prompt: &str) -> Result<()> {
        if let Some(engine) = &self.engine {
            let key = Self::cache_key(agent_name, step, prompt, CacheKind::Prompt);
            engine.set(&key, prompt).await?;
        }
        Ok(())
    }

    /// Store prompt then answer
    pub async fn save(&self, agent_name: &str, step: usize, prompt: &str, answer: &str) -> Result<()> {
        let Some(engine) = &self.engine else {
            return Ok(());
        };

        self.save_prompt(agent_name, step, prompt).await?;
        let key = Self::cache_key(agent_name, step, prompt, CacheKind::Answer);
        engine.set(&key, answer).await?;
        debug!("cached answer {}", key);
        Ok(())
    }
}

impl fmt::Debug for PromptCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptCache")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
