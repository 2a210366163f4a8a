//! Looping agent
//!
//! Formats a prompt with the step history, asks the completion service,
//! parses the answer and executes every action in it. The loop ends on a
//! step that contains `done` and no `error` feedback.

use tracing::{debug, info, warn};

use crate::action::Instruction;
use crate::actions::{DoneAction, DONE_ACTION_NAME};
use crate::client::{AgentContext, CompletionClient};
use crate::parser;
use crate::registry::{render_steps, InstructionRegistry};
use crate::template::PromptFormatter;
use crate::{AgentError, AgentParseError, Result};

/// Mutable state of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub step: usize,
    pub tries_remaining: u32,
    pub done: bool,
    pub error_in_step: bool,
}

pub struct AgentLooper {
    client: CompletionClient,
    registry: InstructionRegistry,
    formatter: Box<dyn PromptFormatter>,
    state: RunState,
    steps: Vec<Vec<String>>,
    actions_count: usize,
    actions_error_count: usize,
}

impl AgentLooper {
    /// Only actions are accepted; `done` is appended automatically
    pub fn new(
        name: impl Into<String>,
        context: AgentContext,
        formatter: impl PromptFormatter + 'static,
        instructions: Vec<Instruction>,
    ) -> Result<Self> {
        if let Some(answer) = instructions.iter().find(|i| !i.is_action()) {
            return Err(AgentError::NotAnAction(answer.name().to_string()));
        }

        let mut registry = InstructionRegistry::from_instructions(instructions)?;
        registry.register(Instruction::action(DoneAction))?;

        let tries = context.options.tries;
        Ok(Self {
            client: CompletionClient::new(name, context),
            registry,
            formatter: Box::new(formatter),
            state: RunState {
                tries_remaining: tries,
                ..RunState::default()
            },
            steps: Vec::new(),
            actions_count: 0,
            actions_error_count: 0,
        })
    }

    pub fn name(&self) -> &str {
        self.client.agent_name()
    }

    pub fn registry(&self) -> &InstructionRegistry {
        &self.registry
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Feedback lines of every finished step
    pub fn steps(&self) -> &[Vec<String>] {
        &self.steps
    }

    pub fn actions_count(&self) -> usize {
        self.actions_count
    }

    pub fn actions_error_count(&self) -> usize {
        self.actions_error_count
    }

    /// Completion calls made so far, retries included
    pub fn calls(&self) -> usize {
        self.client.calls()
    }

    pub async fn run(&mut self) -> Result<()> {
        let options = self.client.options().clone();
        self.state = RunState {
            tries_remaining: options.tries,
            ..RunState::default()
        };
        self.steps.clear();

        while !self.state.done {
            if let Some(max_steps) = options.max_steps {
                if self.state.step >= max_steps {
                    return Err(AgentError::MaxSteps(max_steps));
                }
            }

            if options.verbose {
                info!("{}: step {}", self.name(), self.state.step);
            }

            let prompt = self
                .formatter
                .format_prompt(&self.registry.describe(), &render_steps(&self.steps))?;
            let completion = self.client.complete(&prompt).await?;

            let invocations = match parser::parse(&completion.answer, &self.registry) {
                Ok(invocations) => invocations,
                Err(source) => {
                    if self.state.tries_remaining == 0 {
                        let (prompt_key, answer_key) = self.client.keys(completion.index, &prompt);
                        return Err(AgentParseError {
                            source,
                            prompt_key,
                            answer_key,
                        }
                        .into());
                    }

                    self.state.tries_remaining -= 1;
                    warn!(
                        "{}: {}, retrying ({} tries left)",
                        self.name(),
                        source,
                        self.state.tries_remaining
                    );
                    continue;
                }
            };

            self.state.error_in_step = false;
            let mut feedback_lines = Vec::new();

            for invocation in invocations.iter().filter(|i| i.name != DONE_ACTION_NAME) {
                let feedback = self
                    .registry
                    .execute(invocation, options.feedback_size_limit)
                    .await;
                feedback_lines.push(self.registry.describe_feedback(invocation, &feedback));

                if feedback.is_error() {
                    self.state.error_in_step = true;
                    self.actions_error_count += 1;
                } else {
                    self.actions_count += 1;
                }
                debug!(
                    "{}: {} -> {}",
                    self.name(),
                    invocation.name,
                    feedback.feedback_type
                );
            }

            self.steps.push(feedback_lines);

            let done_seen = invocations.iter().any(|i| i.name == DONE_ACTION_NAME);
            self.state.done = done_seen && !self.state.error_in_step;

            if options.verbose {
                info!("{}: step {} done", self.name(), self.state.step);
            }
            self.state.step += 1;
        }

        Ok(())
    }
}
