//! Common test utilities for agent integration tests
#![allow(dead_code)]

use actionloop_agent::{
    ActionFeedback, AgentContext, AgentOptions, AnswerSpec, FnAction, Instruction,
    PromptTemplate,
};
use actionloop_provider::{CompletionOptions, Provider, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Completion service replaying canned answers in order
#[derive(Default)]
pub struct ScriptedProvider {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    options: Mutex<Vec<CompletionOptions>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(answers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<CompletionOptions> {
        self.options.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn call(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.options.lock().unwrap().push(options.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Api("script exhausted".to_string()))
    }

    fn default_model(&self) -> String {
        "scripted-model".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

type Route = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Completion service answering by prompt content, for concurrent agents
pub struct RoutedProvider {
    route: Route,
    prompts: Mutex<Vec<String>>,
}

impl RoutedProvider {
    pub fn new<F>(route: F) -> Arc<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            route: Box::new(route),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for RoutedProvider {
    async fn call(
        &self,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.route)(prompt)
            .ok_or_else(|| ProviderError::Api(format!("no route for prompt: {}", prompt)))
    }

    fn default_model(&self) -> String {
        "routed-model".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub fn context(provider: Arc<dyn Provider>, tries: u32) -> AgentContext {
    AgentContext::new(provider).with_options(AgentOptions::default().with_tries(tries))
}

pub fn template() -> PromptTemplate {
    PromptTemplate::new("Do the task.\n{instructions}\n{feedback_steps}")
}

/// `listFiles` stub answering with a fixed listing
pub fn list_files_stub() -> Instruction {
    Instruction::action(FnAction::new(
        AnswerSpec::new("listFiles", "list all files in a directory")
            .parameter("directory", "path of the directory to list"),
        |params| {
            ActionFeedback::success(format!(
                "Files in {}: a.txt",
                params.get("directory").cloned().unwrap_or_default()
            ))
        },
    ))
}

/// Action that always fails
pub fn failing_stub() -> Instruction {
    Instruction::action(FnAction::new(
        AnswerSpec::new("fail", "always fails"),
        |_| ActionFeedback::error("boom"),
    ))
}
