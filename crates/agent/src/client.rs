//! Cached completion calls shared by every agent

use std::sync::Arc;
use tracing::{debug, trace};

use actionloop_bus::{AnswerEvent, EventBus, PromptEvent};
use actionloop_cache::{CacheKind, PromptCache};
use actionloop_config::Config;
use actionloop_provider::{CompletionOptions, Provider};

use crate::Result;

/// Per-agent run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Additional attempts after an unparsable answer
    pub tries: u32,
    /// Upper bound on loop iterations; `None` runs until done
    pub max_steps: Option<usize>,
    /// Characters kept from an action feedback message
    pub feedback_size_limit: usize,
    pub verbose: bool,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            max_tokens: None,
            tries: 1,
            max_steps: None,
            feedback_size_limit: 2000,
            verbose: true,
        }
    }
}

impl AgentOptions {
    pub fn from_config(config: &Config) -> Self {
        let agent = &config.agent;
        Self {
            model: Some(agent.model.clone()),
            temperature: Some(agent.temperature),
            max_tokens: Some(agent.max_tokens),
            tries: agent.tries,
            max_steps: Some(agent.max_steps as usize),
            feedback_size_limit: agent.feedback_size_limit,
            verbose: agent.verbose,
        }
    }

    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_feedback_size_limit(mut self, limit: usize) -> Self {
        self.feedback_size_limit = limit;
        self
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Collaborators handed to every agent at construction
#[derive(Clone)]
pub struct AgentContext {
    pub provider: Arc<dyn Provider>,
    pub cache: PromptCache,
    pub events: EventBus,
    pub options: AgentOptions,
}

impl AgentContext {
    /// Uncached, silent context with default options
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            cache: PromptCache::disabled(),
            events: EventBus::disabled(),
            options: AgentOptions::default(),
        }
    }

    pub fn with_cache(mut self, cache: PromptCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub answer: String,
    /// Call index used in the cache keys
    pub index: usize,
    pub cached: bool,
}

/// Completion service access for one named agent
///
/// Every call gets the next index, retries included, so an identical
/// re-run of the agent replays its whole call sequence from the cache.
pub struct CompletionClient {
    agent_name: String,
    context: AgentContext,
    calls: usize,
}

impl CompletionClient {
    pub fn new(agent_name: impl Into<String>, context: AgentContext) -> Self {
        Self {
            agent_name: agent_name.into(),
            context,
            calls: 0,
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn options(&self) -> &AgentOptions {
        &self.context.options
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Prompt and answer cache keys of a call
    pub fn keys(&self, index: usize, prompt: &str) -> (String, String) {
        (
            PromptCache::cache_key(&self.agent_name, index, prompt, CacheKind::Prompt),
            PromptCache::cache_key(&self.agent_name, index, prompt, CacheKind::Answer),
        )
    }

    pub async fn complete(&mut self, prompt: &str) -> Result<Completion> {
        let index = self.calls;
        self.calls += 1;

        let cache = &self.context.cache;
        if let Some(answer) = cache.get(&self.agent_name, index, prompt).await? {
            debug!("{}: using cached answer for call {}", self.agent_name, index);
            return Ok(Completion {
                answer,
                index,
                cached: true,
            });
        }

        let options = self.context.options.completion_options();
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.context.provider.default_model());
        let (prompt_key, answer_key) = self.keys(index, prompt);

        let prompt_event = PromptEvent::new(&self.agent_name, &model, prompt_key, prompt);
        self.context.events.prompt(prompt_event.clone());
        trace!("{}: prompt {}\n{}", self.agent_name, index, prompt);

        let answer = self.context.provider.call(prompt, &options).await?;
        trace!("{}: answer {}\n{}", self.agent_name, index, answer);

        self.context
            .events
            .answer(AnswerEvent::reply(&prompt_event, answer_key, &answer));
        cache.save(&self.agent_name, index, prompt, &answer).await?;

        Ok(Completion {
            answer,
            index,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_unbounded() {
        assert_eq!(AgentOptions::default().max_steps, None);
    }

    #[test]
    fn test_config_options_carry_step_cap() {
        let mut config = Config::default();
        config.agent.max_steps = 7;

        let options = AgentOptions::from_config(&config);
        assert_eq!(options.max_steps, Some(7));
        assert_eq!(options.tries, config.agent.tries);
    }
}
