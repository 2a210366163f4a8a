//! Action-protocol agents
//!
//! A completion service is asked to answer with `<Action>` tags naming
//! registered operations. Answers are parsed back into invocations, the
//! matching operations run, and their feedback is fed into the next prompt
//! until the `done` action is seen in a step without errors.

use thiserror::Error;

pub mod action;
pub mod actions;
pub mod bsm;
pub mod client;
pub mod full_text;
pub mod looper;
pub mod one_shot;
pub mod parser;
pub mod registry;
pub mod template;

pub use action::{
    Action, ActionFeedback, ActionParameter, AnswerSpec, FeedbackType, FnAction, Format,
    Instruction, Parameters, TRUNCATION_MARKER,
};
pub use client::{AgentContext, AgentOptions, Completion, CompletionClient};
pub use full_text::AgentFullText;
pub use looper::{AgentLooper, RunState};
pub use one_shot::AgentOneShot;
pub use parser::{ParseError, ParsedInvocation};
pub use registry::InstructionRegistry;
pub use template::{PromptFormatter, PromptTemplate, TemplateError};

use actionloop_cache::CacheError;
use actionloop_provider::ProviderError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Parse(#[from] AgentParseError),

    #[error("completion failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("prompt template error: {0}")]
    Template(#[from] TemplateError),

    #[error("duplicate instruction: {0}")]
    DuplicateInstruction(String),

    #[error("{0} is not an action, only actions can be registered on a looping agent")]
    NotAnAction(String),

    #[error("max steps exceeded: {0}")]
    MaxSteps(usize),

    #[error("missing answer: {0}")]
    MissingAnswer(String),

    #[error("invalid answer: {0}")]
    InvalidAnswer(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Answer could not be parsed and no tries were left
///
/// Both keys point into the prompt cache so the exchange can be inspected.
#[derive(Error, Debug)]
#[error("{source} (prompt: {prompt_key}, answer: {answer_key})")]
pub struct AgentParseError {
    #[source]
    pub source: ParseError,
    pub prompt_key: String,
    pub answer_key: String,
}
