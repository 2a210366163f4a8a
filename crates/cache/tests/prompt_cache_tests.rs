//! Prompt cache tests
//!
//! Covers key determinism, read-through semantics and both storage backends.

use actionloop_cache::{CacheEngine, CacheError, CacheKind, FileCache, MemoryCache, PromptCache};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Key derivation
// ============================================================================

#[test]
fn test_identical_calls_share_keys() {
    let a = PromptCache::cache_key("agent", 2, "same prompt", CacheKind::Answer);
    let b = PromptCache::cache_key("agent", 2, "same prompt", CacheKind::Answer);
    assert_eq!(a, b);
}

#[test]
fn test_step_and_agent_separate_keys() {
    let base = PromptCache::cache_key("agent", 0, "same prompt", CacheKind::Answer);
    let other_step = PromptCache::cache_key("agent", 1, "same prompt", CacheKind::Answer);
    let other_agent = PromptCache::cache_key("other", 0, "same prompt", CacheKind::Answer);

    assert_ne!(base, other_step);
    assert_ne!(base, other_agent);
    assert_ne!(other_step, other_agent);
}

#[test]
fn test_prompt_and_answer_keys_differ_only_by_kind() {
    let prompt = PromptCache::cache_key("agent", 0, "text", CacheKind::Prompt);
    let answer = PromptCache::cache_key("agent", 0, "text", CacheKind::Answer);
    assert_eq!(
        prompt.trim_end_matches("prompt.txt"),
        answer.trim_end_matches("answer.txt")
    );
}

// ============================================================================
// Read-through / write-through
// ============================================================================

#[tokio::test]
async fn test_save_then_get() {
    let engine = Arc::new(MemoryCache::new());
    let cache = PromptCache::new(engine.clone());

    assert!(cache.get("agent", 0, "prompt").await.unwrap().is_none());

    cache.save("agent", 0, "prompt", "answer").await.unwrap();

    assert_eq!(
        cache.get("agent", 0, "prompt").await.unwrap().as_deref(),
        Some("answer")
    );
    assert_eq!(engine.len().await, 2);
}

#[tokio::test]
async fn test_get_misses_for_other_step_or_agent() {
    let cache = PromptCache::new(Arc::new(MemoryCache::new()));
    cache.save("agent", 0, "prompt", "answer").await.unwrap();

    assert!(cache.get("agent", 1, "prompt").await.unwrap().is_none());
    assert!(cache.get("other", 0, "prompt").await.unwrap().is_none());
}

#[tokio::test]
async fn test_prompt_key_alone_is_a_miss() {
    let engine = Arc::new(MemoryCache::new());
    let cache = PromptCache::new(engine.clone());

    cache.save_prompt("agent", 0, "prompt").await.unwrap();

    let prompt_key = PromptCache::cache_key("agent", 0, "prompt", CacheKind::Prompt);
    assert!(engine.has(&prompt_key).await.unwrap());
    assert!(cache.get("agent", 0, "prompt").await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_answer_is_a_hit() {
    let cache = PromptCache::new(Arc::new(MemoryCache::new()));
    cache.save("agent", 0, "prompt", "").await.unwrap();
    assert_eq!(cache.get("agent", 0, "prompt").await.unwrap().as_deref(), Some(""));
}

// ============================================================================
// Backends
// ============================================================================

#[tokio::test]
async fn test_memory_cache_not_found_vs_empty() {
    let cache = MemoryCache::new();
    cache.set("empty", "").await.unwrap();

    assert_eq!(cache.get("empty").await.unwrap(), "");
    assert!(matches!(cache.get("missing").await, Err(CacheError::NotFound(k)) if k == "missing"));
}

#[tokio::test]
async fn test_memory_cache_delete() {
    let cache = MemoryCache::new();
    cache.set("k", "v").await.unwrap();
    assert!(cache.has("k").await.unwrap());

    cache.delete("k").await.unwrap();
    assert!(!cache.has("k").await.unwrap());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_file_cache_roundtrip() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    assert!(!cache.has("agent/0-abc-answer.txt").await.unwrap());
    cache.set("agent/0-abc-answer.txt", "hello").await.unwrap();
    assert!(cache.has("agent/0-abc-answer.txt").await.unwrap());
    assert_eq!(cache.get("agent/0-abc-answer.txt").await.unwrap(), "hello");
}

#[tokio::test]
async fn test_file_cache_not_found_vs_empty() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    cache.set("empty.txt", "").await.unwrap();
    assert_eq!(cache.get("empty.txt").await.unwrap(), "");
    assert!(matches!(
        cache.get("missing.txt").await,
        Err(CacheError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_file_cache_delete_missing_is_noop() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    cache.delete("nothing/here.txt").await.unwrap();

    cache.set("x.txt", "1").await.unwrap();
    cache.delete("x.txt").await.unwrap();
    assert!(!cache.has("x.txt").await.unwrap());
}

#[tokio::test]
async fn test_file_cache_clear() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path().join("cache"));

    cache.set("a/0-x-prompt.txt", "p").await.unwrap();
    cache.set("a/0-x-answer.txt", "a").await.unwrap();
    cache.set("b/1-y-answer.txt", "a").await.unwrap();

    assert_eq!(cache.clear().await.unwrap(), 3);
    assert!(cache.root().exists());
    assert!(!cache.has("a/0-x-answer.txt").await.unwrap());
}

#[tokio::test]
async fn test_prompt_cache_on_files() {
    let temp = TempDir::new().unwrap();
    let cache = PromptCache::new(Arc::new(FileCache::new(temp.path())));

    cache.save("writer", 4, "the prompt", "the answer").await.unwrap();

    let answer_key = PromptCache::cache_key("writer", 4, "the prompt", CacheKind::Answer);
    let prompt_key = PromptCache::cache_key("writer", 4, "the prompt", CacheKind::Prompt);
    assert!(temp.path().join(&answer_key).exists());
    assert_eq!(
        std::fs::read_to_string(temp.path().join(&prompt_key)).unwrap(),
        "the prompt"
    );
    assert_eq!(
        cache.get("writer", 4, "the prompt").await.unwrap().as_deref(),
        Some("the answer")
    );
}
